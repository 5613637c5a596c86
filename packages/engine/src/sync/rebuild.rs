use futures_util::StreamExt;
use serde::Serialize;

use crate::error_classification::is_missing_relation_error;
use crate::errors;
use crate::schema::FormLayout;
use crate::{Account, Form, Host, SyncError};

use super::SyncOrchestrator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSyncSummary {
    pub form_id: String,
    pub form_name: String,
    pub tables: usize,
    pub records: usize,
}

/// What `sync_account` rebuilt, one entry per active form in host order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub account: Account,
    pub forms: Vec<FormSyncSummary>,
}

impl SyncReport {
    pub fn total_records(&self) -> usize {
        self.forms.iter().map(|form| form.records).sum()
    }
}

impl SyncOrchestrator {
    /// Drops and recreates every table of `form`, then re-materializes all of
    /// its records from the host.
    ///
    /// `progress` receives the running count every `progress_interval`
    /// records and once more with the final total, which is also returned.
    pub async fn rebuild_form(
        &mut self,
        host: &dyn Host,
        account: &Account,
        form: &Form,
        progress: &mut dyn FnMut(usize),
    ) -> Result<usize, SyncError> {
        tracing::info!(form = %form.name, account = account.row_id, "rebuilding form");

        self.recreate_form_tables(account, form).await?;
        self.refresh_cache().await?;

        let mut records = host.find_each_record(account, form);
        let mut total = 0usize;
        while let Some(record) = records.next().await {
            let record = record?;
            self.materialize_record(account, form, &record).await?;
            total += 1;
            if total % self.progress_interval == 0 {
                progress(total);
            }
        }
        progress(total);

        tracing::info!(form = %form.name, records = total, "rebuilt form");
        Ok(total)
    }

    async fn recreate_form_tables(&mut self, account: &Account, form: &Form) -> Result<(), SyncError> {
        let current = form.version()?;

        if let Err(err) = self.update_form(account, form, Some(&current), None).await {
            if is_missing_relation_error(&err) {
                tracing::debug!(form = %form.name, error = %err, "nothing to drop before rebuild");
            } else {
                tracing::warn!(
                    form = %form.name,
                    error = %err,
                    statement = err.statement.as_deref().unwrap_or_default(),
                    "dropping form tables before rebuild failed; continuing"
                );
            }
        }

        self.update_form(account, form, None, Some(&current)).await
    }

    /// Rebuilds every active form of the organization `org`.
    ///
    /// Unknown organizations fail with `AccountNotFound` before any statement runs.
    pub async fn sync_account(
        &mut self,
        host: &dyn Host,
        org: &str,
        progress: &mut dyn FnMut(&Form, usize),
    ) -> Result<SyncReport, SyncError> {
        let account = host
            .fetch_account(org)
            .await?
            .ok_or_else(|| errors::account_not_found_error(org))?;
        let forms = host.find_active_forms(&account).await?;
        tracing::info!(account = %account.name, forms = forms.len(), "syncing account");

        let mut summaries = Vec::with_capacity(forms.len());
        for form in &forms {
            let records = self
                .rebuild_form(host, &account, form, &mut |count| progress(form, count))
                .await?;
            let tables = FormLayout::from_form(self.target.dialect, &account, form)?
                .tables()
                .len();
            summaries.push(FormSyncSummary {
                form_id: form.id.clone(),
                form_name: form.name.clone(),
                tables,
                records,
            });
        }

        Ok(SyncReport {
            account,
            forms: summaries,
        })
    }
}
