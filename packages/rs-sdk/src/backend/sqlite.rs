use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use formsync_engine::errors::{backend_unavailable_error, statement_failed_error};
use formsync_engine::{QueryResult, SqlDialect, SyncBackend, SyncError, Value};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};

pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|err| {
            backend_unavailable_error(&format!("cannot open sqlite database {}: {err}", path.display()))
        })?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self, SyncError> {
        let conn = Connection::open_in_memory()
            .map_err(|err| backend_unavailable_error(&err.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, SyncError> {
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(|err| backend_unavailable_error(&err.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait(?Send)]
impl SyncBackend for SqliteBackend {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, SyncError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| backend_unavailable_error("sqlite mutex poisoned"))?;
        let failed = |err: rusqlite::Error| statement_failed_error(sql, &err.to_string());

        let mut stmt = match conn.prepare(sql) {
            Ok(stmt) => stmt,
            Err(rusqlite::Error::MultipleStatement) => {
                conn.execute_batch(sql).map_err(failed)?;
                return Ok(QueryResult::default());
            }
            Err(err) => return Err(failed(err)),
        };

        let columns = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        let mut rows = stmt.query([]).map_err(failed)?;
        let mut result_rows = Vec::new();
        while let Some(row) = rows.next().map_err(failed)? {
            result_rows.push(map_row(row).map_err(failed)?);
        }

        Ok(QueryResult {
            rows: result_rows,
            columns,
        })
    }
}

fn map_row(row: &Row<'_>) -> Result<Vec<Value>, rusqlite::Error> {
    let mut values = Vec::new();
    for idx in 0..row.as_ref().column_count() {
        values.push(match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(value) => Value::Integer(value),
            ValueRef::Real(value) => Value::Real(value),
            ValueRef::Text(value) => Value::Text(String::from_utf8_lossy(value).to_string()),
            ValueRef::Blob(value) => Value::Blob(value.to_vec()),
        });
    }
    Ok(values)
}
