use std::collections::BTreeSet;

use crate::naming;
use crate::schema::{create_friendly_view_sql, drop_friendly_view_sql, FormLayout};
use crate::{Form, SyncError};

use super::store::run_statement;
use super::SyncOrchestrator;

/// Outcome of a step whose failure must not abort the surrounding sync.
#[derive(Debug, Clone, PartialEq)]
pub enum BestEffort {
    Applied,
    Skipped(&'static str),
    Failed(SyncError),
}

impl BestEffort {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub(crate) fn log(&self, action: &str, view: &str) {
        match self {
            Self::Applied => tracing::debug!(view, "{action} friendly view"),
            Self::Skipped(reason) => {
                tracing::debug!(view, reason = *reason, "skipped {action} of friendly view")
            }
            Self::Failed(err) => {
                tracing::warn!(view, error = %err, "could not {action} friendly view")
            }
        }
    }
}

/// Friendly view names for the root table and every repeatable of `form`.
pub(crate) fn friendly_view_names(form: &Form) -> Vec<String> {
    std::iter::once(naming::friendly_view_name(&form.name, None))
        .chain(
            form.repeatables()
                .into_iter()
                .map(|repeatable| naming::friendly_view_name(&form.name, Some(&repeatable.data_name))),
        )
        .collect()
}

impl SyncOrchestrator {
    pub async fn drop_friendly_view(&self, view_name: &str) -> BestEffort {
        let sql = drop_friendly_view_sql(&self.target, view_name);
        match run_statement(self.backend.as_ref(), &sql).await {
            Ok(_) => BestEffort::Applied,
            Err(err) => BestEffort::Failed(err),
        }
    }

    pub async fn create_friendly_view(&self, view_name: &str, table_name: &str) -> BestEffort {
        if !self.cache.contains(table_name) {
            return BestEffort::Skipped("source table does not exist");
        }
        let sql = create_friendly_view_sql(&self.target, view_name, table_name);
        match run_statement(self.backend.as_ref(), &sql).await {
            Ok(_) => BestEffort::Applied,
            Err(err) => BestEffort::Failed(err),
        }
    }

    /// Drops the friendly views of every form in `forms`, each name once.
    /// Returns the outcome per view name; nothing is logged here.
    pub(crate) async fn drop_friendly_views(&self, forms: &[&Form]) -> Vec<(String, BestEffort)> {
        let names = forms
            .iter()
            .flat_map(|form| friendly_view_names(form))
            .collect::<BTreeSet<_>>();

        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let outcome = self.drop_friendly_view(&name).await;
            outcomes.push((name, outcome));
        }
        outcomes
    }

    pub(crate) async fn create_friendly_views(
        &self,
        layout: &FormLayout,
        form_name: &str,
    ) -> Vec<(String, BestEffort)> {
        let mut outcomes = Vec::new();
        for table in layout.tables() {
            let view_name = naming::friendly_view_name(form_name, table.data_name.as_deref());
            let outcome = self.create_friendly_view(&view_name, &table.name).await;
            outcomes.push((view_name, outcome));
        }
        outcomes
    }
}
