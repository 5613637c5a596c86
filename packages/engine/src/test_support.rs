use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, LocalBoxStream, StreamExt};
use serde_json::json;

use crate::{
    Account, ErrorCode, Form, Host, QueryResult, Record, SqlDialect, SyncBackend, SyncError,
    Value,
};

/// Records every statement and tracks `CREATE TABLE` / `DROP TABLE` so catalog
/// queries answer like a real store would.
pub(crate) struct RecordingBackend {
    dialect: SqlDialect,
    calls: Arc<Mutex<Vec<String>>>,
    tables: Arc<Mutex<BTreeSet<String>>>,
    failures: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingBackend {
    pub(crate) fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            calls: Arc::new(Mutex::new(Vec::new())),
            tables: Arc::new(Mutex::new(BTreeSet::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A second handle onto the same recorded state.
    pub(crate) fn handle(&self) -> Self {
        Self {
            dialect: self.dialect,
            calls: Arc::clone(&self.calls),
            tables: Arc::clone(&self.tables),
            failures: Arc::clone(&self.failures),
        }
    }

    pub(crate) fn set_tables(&self, tables: &[&str]) {
        *self.tables.lock().expect("tables mutex poisoned") =
            tables.iter().map(|table| table.to_string()).collect();
    }

    pub(crate) fn tables(&self) -> Vec<String> {
        self.tables
            .lock()
            .expect("tables mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }

    pub(crate) fn fail_on(&self, needle: &str) {
        self.fail_on_with(needle, "forced failure");
    }

    pub(crate) fn fail_on_with(&self, needle: &str, message: &str) {
        self.failures
            .lock()
            .expect("failures mutex poisoned")
            .push((needle.to_string(), message.to_string()));
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(crate) fn count_containing(&self, needle: &str) -> usize {
        self.statements()
            .iter()
            .filter(|sql| sql.contains(needle))
            .count()
    }
}

#[async_trait(?Send)]
impl SyncBackend for RecordingBackend {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, SyncError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(sql.to_string());

        let failure = self
            .failures
            .lock()
            .expect("failures mutex poisoned")
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, message)| message.clone());
        if let Some(message) = failure {
            return Err(SyncError::new(
                ErrorCode::StatementFailed,
                "Fake backend failure",
                message,
            ));
        }

        if sql.contains("sqlite_master") || sql.contains("information_schema.tables") {
            return Ok(QueryResult {
                rows: self
                    .tables()
                    .into_iter()
                    .map(|name| vec![Value::Text(name)])
                    .collect(),
                columns: vec!["name".to_string()],
            });
        }

        let mut tables = self.tables.lock().expect("tables mutex poisoned");
        if let Some(rest) = sql.strip_prefix("CREATE TABLE ") {
            tables.insert(last_identifier(rest));
        } else if let Some(rest) = sql.strip_prefix("DROP TABLE IF EXISTS ") {
            tables.remove(&last_identifier(rest));
        }

        Ok(QueryResult::default())
    }
}

fn last_identifier(qualified: &str) -> String {
    let name = qualified.split_whitespace().next().unwrap_or_default();
    name.rsplit("\".\"")
        .next()
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Host with one account whose forms and records live in memory.
pub(crate) struct MemoryHost {
    pub(crate) account: Account,
    pub(crate) forms: Vec<Form>,
    pub(crate) records: Vec<Record>,
    streams: Mutex<usize>,
}

impl MemoryHost {
    pub(crate) fn new(account: Account, forms: Vec<Form>, records: Vec<Record>) -> Self {
        Self {
            account,
            forms,
            records,
            streams: Mutex::new(0),
        }
    }

    pub(crate) fn streams_opened(&self) -> usize {
        *self.streams.lock().expect("streams mutex poisoned")
    }
}

#[async_trait(?Send)]
impl Host for MemoryHost {
    async fn fetch_account(&self, org: &str) -> Result<Option<Account>, SyncError> {
        Ok((org == self.account.name || org == self.account.id).then(|| self.account.clone()))
    }

    async fn find_active_forms(&self, _account: &Account) -> Result<Vec<Form>, SyncError> {
        Ok(self.forms.clone())
    }

    fn find_each_record<'a>(
        &'a self,
        _account: &'a Account,
        form: &'a Form,
    ) -> LocalBoxStream<'a, Result<Record, SyncError>> {
        *self.streams.lock().expect("streams mutex poisoned") += 1;
        stream::iter(
            self.records
                .iter()
                .filter(move |record| record.form_id == form.id)
                .cloned()
                .map(Ok),
        )
        .boxed_local()
    }
}

pub(crate) fn account() -> Account {
    Account {
        row_id: 1,
        id: "acct-1".to_string(),
        name: "Acme".to_string(),
    }
}

/// `Sites`: one text field and a `visits` repeatable with a numeric field.
pub(crate) fn sites_form() -> Form {
    serde_json::from_value(json!({
        "id": "form-1",
        "row_id": 2,
        "name": "Sites",
        "elements": [
            {"key": "a", "type": "TextField", "data_name": "site_name"},
            {"key": "r", "type": "Repeatable", "data_name": "visits", "elements": [
                {"key": "b", "type": "NumericField", "data_name": "count"}
            ]}
        ]
    }))
    .expect("form fixture should deserialize")
}

pub(crate) fn site_record(id: &str, visits: usize) -> Record {
    let items = (0..visits)
        .map(|index| json!({"id": format!("{id}-v{index}"), "form_values": {"b": index}}))
        .collect::<Vec<_>>();
    let mut record = Record::new(id, "form-1");
    record.form_values = json!({"a": format!("site {id}"), "r": items})
        .as_object()
        .cloned()
        .expect("object");
    record
}
