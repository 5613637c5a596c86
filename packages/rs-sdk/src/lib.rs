mod backend;
mod host;

pub use backend::postgres::{create_postgres_database, PostgresBackend};
pub use backend::sqlite::SqliteBackend;
pub use host::JsonFileHost;

pub use formsync_engine::errors;
pub use formsync_engine::{
    Account, ErrorCode, Form, FormSyncSummary, FormVersion, Host, QueryResult, Record, SqlDialect,
    SyncBackend, SyncConfig, SyncError, SyncEvent, SyncOrchestrator, SyncReport, Value,
};
pub use sqlx::postgres::PgConnectOptions;
