//! Event-driven orchestration of schema and record synchronization.

mod cache;
mod events;
mod friendly_views;
mod rebuild;
mod store;

pub use cache::TableCache;
pub use events::SyncEvent;
pub use friendly_views::BestEffort;
pub use rebuild::{FormSyncSummary, SyncReport};

use crate::naming;
use crate::record_values::{delete_for_record_statements, update_for_record_statements};
use crate::schema::{generate_schema_statements, FormLayout};
use crate::{
    Account, Form, FormIdentity, FormVersion, Host, Record, SqlTarget, SyncBackend, SyncError,
};

use store::run_statements;

pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Schema holding generated tables and views; the dialect default when unset.
    pub schema: Option<String>,
    pub progress_interval: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            schema: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Applies host lifecycle events to the store, one batch at a time.
pub struct SyncOrchestrator {
    backend: Box<dyn SyncBackend + Send + Sync>,
    target: SqlTarget,
    progress_interval: usize,
    cache: TableCache,
}

impl SyncOrchestrator {
    pub fn new(backend: Box<dyn SyncBackend + Send + Sync>, config: SyncConfig) -> Self {
        let dialect = backend.dialect();
        let target = match config.schema {
            Some(schema) => SqlTarget::new(dialect, schema),
            None => SqlTarget::with_default_schema(dialect),
        };

        Self {
            backend,
            target,
            progress_interval: config.progress_interval.max(1),
            cache: TableCache::new(),
        }
    }

    pub fn target(&self) -> &SqlTarget {
        &self.target
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn backend(&self) -> &dyn SyncBackend {
        self.backend.as_ref()
    }

    /// Loads the table cache. Call once before handling events.
    pub async fn activate(&mut self) -> Result<(), SyncError> {
        self.refresh_cache().await?;
        tracing::info!(
            schema = %self.target.schema,
            tables = self.cache.len(),
            "sync orchestrator activated"
        );
        Ok(())
    }

    pub async fn handle_event(&mut self, host: &dyn Host, event: SyncEvent) -> Result<(), SyncError> {
        tracing::debug!(event = event.name(), form = %event.form().name, "handling event");

        match event {
            SyncEvent::FormSaved {
                account,
                form,
                old_form,
                new_form,
            } => {
                self.update_form(&account, &form, old_form.as_ref(), new_form.as_ref())
                    .await
            }
            SyncEvent::RecordSaved {
                account,
                form,
                record,
            } => self.update_record(host, &account, &form, &record, false).await,
            SyncEvent::RecordDeleted {
                account,
                form,
                record,
            } => self.delete_record(&account, &form, &record).await,
        }
    }

    /// Moves the generated schema of `form` from `old` to `new`.
    ///
    /// When the root table is missing the change is applied as a full create,
    /// whatever `old` says.
    pub async fn update_form(
        &mut self,
        account: &Account,
        form: &Form,
        old: Option<&FormVersion>,
        new: Option<&FormVersion>,
    ) -> Result<(), SyncError> {
        let previous = old;
        let old = if new.is_some() && !self.root_table_exists(account, form)? {
            None
        } else {
            old
        };

        let statements = generate_schema_statements(&self.target, account, old, new)?;
        let new_layout = new
            .map(|version| FormLayout::build(self.target.dialect, account, version))
            .transpose()?;

        let previous_form = previous.and_then(|version| match version.to_form() {
            Ok(form) => Some(form),
            Err(err) => {
                tracing::debug!(error = %err, "previous form version unreadable; skipping its views");
                None
            }
        });
        let mut view_forms = vec![form];
        view_forms.extend(previous_form.as_ref());
        for (view, outcome) in self.drop_friendly_views(&view_forms).await {
            outcome.log("drop", &view);
        }

        let applied = run_statements(self.backend.as_ref(), &statements).await;
        let refreshed = self.refresh_cache().await;
        applied?;
        refreshed?;

        if let (Some(version), Some(layout)) = (new, new_layout.as_ref()) {
            for (view, outcome) in self.create_friendly_views(layout, &version.name).await {
                outcome.log("create", &view);
            }
        }

        tracing::debug!(form = %form.name, statements = statements.len(), "updated form schema");
        Ok(())
    }

    /// Writes `record` into the generated tables.
    ///
    /// Unless `skip_table_check` is set, a missing root table first triggers
    /// one full rebuild of the form.
    pub async fn update_record(
        &mut self,
        host: &dyn Host,
        account: &Account,
        form: &Form,
        record: &Record,
        skip_table_check: bool,
    ) -> Result<(), SyncError> {
        if !skip_table_check && !self.root_table_exists(account, form)? {
            tracing::info!(form = %form.name, record = %record.id, "root table missing; rebuilding form");
            self.rebuild_form(host, account, form, &mut |_| {}).await?;
        }

        self.materialize_record(account, form, record).await
    }

    pub async fn delete_record(
        &self,
        account: &Account,
        form: &Form,
        record: &Record,
    ) -> Result<(), SyncError> {
        let statements = delete_for_record_statements(&self.target, account, form, record)?;
        run_statements(self.backend.as_ref(), &statements).await
    }

    pub fn root_table_exists(
        &self,
        account: &Account,
        form: &dyn FormIdentity,
    ) -> Result<bool, SyncError> {
        let root = naming::table_name::<&str>(self.target.dialect, account, Some(form), &[])?;
        Ok(self.cache.contains(&root))
    }

    pub async fn refresh_cache(&mut self) -> Result<(), SyncError> {
        self.cache.refresh(self.backend.as_ref(), &self.target).await
    }

    async fn materialize_record(
        &self,
        account: &Account,
        form: &Form,
        record: &Record,
    ) -> Result<(), SyncError> {
        let statements = update_for_record_statements(&self.target, account, form, record)?;
        run_statements(self.backend.as_ref(), &statements).await
    }
}
