mod backend;
mod dialect;
mod error;
mod error_classification;
pub mod errors;
mod form;
mod host;
pub mod naming;
pub mod record_values;
pub mod schema;
mod sql_text;
pub mod sync;
mod types;

#[cfg(test)]
mod test_support;

pub use backend::SyncBackend;
pub use dialect::{ColumnType, SqlDialect, SqlTarget};
pub use error::SyncError;
pub use errors::ErrorCode;
pub use form::{
    Account, Element, ElementKind, FieldType, Form, FormIdentity, FormVersion, Record,
    RepeatableItem,
};
pub use host::Host;
pub use record_values::{delete_for_record_statements, update_for_record_statements};
pub use schema::generate_schema_statements;
pub use sync::{
    BestEffort, FormSyncSummary, SyncConfig, SyncEvent, SyncOrchestrator, SyncReport, TableCache,
};
pub use types::{QueryResult, Value};
