use std::path::Path;

use async_trait::async_trait;
use formsync_engine::errors::host_data_unavailable_error;
use formsync_engine::{Account, Form, Host, Record, SyncError};
use futures_util::stream::{self, LocalBoxStream, StreamExt};
use serde::Deserialize;

/// Host backed by a JSON export of one or more accounts.
///
/// ```json
/// {"accounts": [{"row_id": 1, "id": "…", "name": "…",
///                "forms": [{"id": "…", "row_id": 2, "name": "…", "elements": [], "disabled": false}],
///                "records": [{"id": "…", "form_id": "…", "form_values": {}}]}]}
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileHost {
    accounts: Vec<ExportedAccount>,
}

#[derive(Debug, Clone, Deserialize)]
struct Export {
    #[serde(default)]
    accounts: Vec<ExportedAccount>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExportedAccount {
    #[serde(flatten)]
    account: Account,
    #[serde(default)]
    forms: Vec<ExportedForm>,
    #[serde(default)]
    records: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExportedForm {
    #[serde(flatten)]
    form: Form,
    #[serde(default)]
    disabled: bool,
}

impl JsonFileHost {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|err| host_data_unavailable_error(&source, &err.to_string()))?;
        Self::from_json(&source, &text)
    }

    /// Parses an export held in memory; `source` names it in errors.
    pub fn from_json(source: &str, text: &str) -> Result<Self, SyncError> {
        let export: Export = serde_json::from_str(text)
            .map_err(|err| host_data_unavailable_error(source, &err.to_string()))?;
        tracing::debug!(source, accounts = export.accounts.len(), "loaded host export");
        Ok(Self {
            accounts: export.accounts,
        })
    }

    /// Any form of the account, disabled or not, by id.
    pub fn find_form(&self, account: &Account, form_id: &str) -> Option<&Form> {
        self.exported(account)?
            .forms
            .iter()
            .map(|exported| &exported.form)
            .find(|form| form.id == form_id)
    }

    fn exported(&self, account: &Account) -> Option<&ExportedAccount> {
        self.accounts
            .iter()
            .find(|exported| exported.account.row_id == account.row_id)
    }
}

#[async_trait(?Send)]
impl Host for JsonFileHost {
    /// Organizations are matched by name first, then by id.
    async fn fetch_account(&self, org: &str) -> Result<Option<Account>, SyncError> {
        Ok(self
            .accounts
            .iter()
            .find(|exported| exported.account.name == org)
            .or_else(|| self.accounts.iter().find(|exported| exported.account.id == org))
            .map(|exported| exported.account.clone()))
    }

    async fn find_active_forms(&self, account: &Account) -> Result<Vec<Form>, SyncError> {
        Ok(self
            .exported(account)
            .map(|exported| {
                exported
                    .forms
                    .iter()
                    .filter(|form| !form.disabled)
                    .map(|form| form.form.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn find_each_record<'a>(
        &'a self,
        account: &'a Account,
        form: &'a Form,
    ) -> LocalBoxStream<'a, Result<Record, SyncError>> {
        let records = self
            .exported(account)
            .map(|exported| exported.records.as_slice())
            .unwrap_or_default();
        stream::iter(records)
            .filter(move |record| futures_util::future::ready(record.form_id == form.id))
            .map(|record| Ok(record.clone()))
            .boxed_local()
    }
}
