use async_trait::async_trait;

use crate::{QueryResult, SqlDialect, SyncError};

/// Store driver the engine issues its statements through.
///
/// Implementations execute exactly one SQL text per call and report failures
/// as [`SyncError`]s; the engine itself takes care of ordering, NUL stripping
/// and attaching the offending statement.
#[async_trait(?Send)]
pub trait SyncBackend: Send + Sync {
    fn dialect(&self) -> SqlDialect;

    async fn execute(&self, sql: &str) -> Result<QueryResult, SyncError>;
}
