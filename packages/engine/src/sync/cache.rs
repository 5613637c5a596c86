use std::collections::BTreeSet;

use crate::{SqlTarget, SyncBackend, SyncError, Value};

use super::store::run_statement;

/// Names of the base tables present in the target schema, as of the last refresh.
///
/// The cache is never updated optimistically: it only changes through
/// [`TableCache::refresh`], which re-reads the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCache {
    tables: BTreeSet<String>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    pub async fn refresh(
        &mut self,
        backend: &dyn SyncBackend,
        target: &SqlTarget,
    ) -> Result<(), SyncError> {
        let result = run_statement(backend, &target.list_tables_sql()).await?;
        self.tables = result
            .rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(Value::as_text)
            .map(str::to_string)
            .collect();
        tracing::debug!(tables = self.tables.len(), schema = %target.schema, "refreshed table cache");
        Ok(())
    }
}
