use crate::errors::{self, ErrorCode};
use crate::sql_text::strip_nul;
use crate::{QueryResult, SyncBackend, SyncError};

/// Runs one statement against the store.
///
/// NUL bytes are removed before the driver sees the text. Driver failures
/// come back as `StatementFailed` carrying the statement that was sent.
pub(crate) async fn run_statement(
    backend: &dyn SyncBackend,
    sql: &str,
) -> Result<QueryResult, SyncError> {
    let sql = strip_nul(sql);
    tracing::debug!(statement = %sql, "executing statement");

    backend.execute(&sql).await.map_err(|err| match err.code {
        ErrorCode::BackendUnavailable => err,
        ErrorCode::StatementFailed if err.statement.is_some() => err,
        _ => errors::statement_failed_error(&sql, &err.description),
    })
}

/// Runs statements one at a time in order, stopping at the first failure.
pub(crate) async fn run_statements(
    backend: &dyn SyncBackend,
    statements: &[String],
) -> Result<(), SyncError> {
    for statement in statements {
        run_statement(backend, statement).await?;
    }
    Ok(())
}
