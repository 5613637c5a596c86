#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use formsync_engine::{
    Account, ErrorCode, Form, Host, QueryResult, Record, SqlDialect, SyncBackend, SyncError, Value,
};
use futures_util::stream::{self, LocalBoxStream, StreamExt};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::json;

/// In-memory SQLite store shared between the orchestrator and the test body.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    statements: Arc<Mutex<Vec<String>>>,
}

impl SqliteStore {
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().expect("in-memory sqlite should open");
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .expect("foreign keys should enable");
        Self {
            conn: Arc::new(Mutex::new(conn)),
            statements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn boxed(&self) -> Box<dyn SyncBackend + Send + Sync> {
        Box::new(self.clone())
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().expect("statements mutex poisoned").clone()
    }

    pub fn clear_statements(&self) {
        self.statements.lock().expect("statements mutex poisoned").clear();
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
            .expect("count query should succeed")
    }

    pub fn columns(&self, table: &str) -> Vec<(String, String)> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info(\"{table}\")"))
            .expect("table_info should prepare");
        stmt.query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
            .expect("table_info should run")
            .collect::<Result<Vec<_>, _>>()
            .expect("table_info rows")
    }

    pub fn objects(&self, kind: &str) -> Vec<String> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")
            .expect("catalog query should prepare");
        stmt.query_map([kind], |row| row.get::<_, String>(0))
            .expect("catalog query should run")
            .collect::<Result<Vec<_>, _>>()
            .expect("catalog rows")
    }

    pub fn texts(&self, sql: &str) -> Vec<Option<String>> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn.prepare(sql).expect("query should prepare");
        stmt.query_map([], |row| row.get::<_, Option<String>>(0))
            .expect("query should run")
            .collect::<Result<Vec<_>, _>>()
            .expect("rows")
    }
}

#[async_trait(?Send)]
impl SyncBackend for SqliteStore {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, SyncError> {
        self.statements
            .lock()
            .expect("statements mutex poisoned")
            .push(sql.to_string());

        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let failed = |err: rusqlite::Error| {
            SyncError::new(ErrorCode::StatementFailed, "SQLite error", err.to_string())
        };
        let mut stmt = conn.prepare(sql).map_err(failed)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let column_count = columns.len();
        let mut rows = stmt.query([]).map_err(failed)?;
        let mut result_rows = Vec::new();
        while let Some(row) = rows.next().map_err(failed)? {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                values.push(match row.get_ref(index).map_err(failed)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(value) => Value::Integer(value),
                    ValueRef::Real(value) => Value::Real(value),
                    ValueRef::Text(value) => Value::Text(String::from_utf8_lossy(value).to_string()),
                    ValueRef::Blob(value) => Value::Blob(value.to_vec()),
                });
            }
            result_rows.push(values);
        }

        Ok(QueryResult {
            rows: result_rows,
            columns,
        })
    }
}

/// Single-account host that counts how often record streams are opened.
pub struct MemoryHost {
    pub account: Account,
    pub forms: Vec<Form>,
    pub records: Mutex<Vec<Record>>,
    streams: Mutex<usize>,
}

impl MemoryHost {
    pub fn new(forms: Vec<Form>, records: Vec<Record>) -> Self {
        Self {
            account: account(),
            forms,
            records: Mutex::new(records),
            streams: Mutex::new(0),
        }
    }

    pub fn streams_opened(&self) -> usize {
        *self.streams.lock().expect("streams mutex poisoned")
    }
}

#[async_trait(?Send)]
impl Host for MemoryHost {
    async fn fetch_account(&self, org: &str) -> Result<Option<Account>, SyncError> {
        Ok((org == self.account.name).then(|| self.account.clone()))
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
        let records = self
            .records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .filter(|record| record.form_id == form.id)
            .cloned()
            .collect::<Vec<_>>();
        stream::iter(records.into_iter().map(Ok)).boxed_local()
    }
}

pub fn account() -> Account {
    Account {
        row_id: 7,
        id: "acct-7".to_string(),
        name: "Acme".to_string(),
    }
}

pub fn form_from(elements: serde_json::Value) -> Form {
    serde_json::from_value(json!({
        "id": "form-1",
        "row_id": 3,
        "name": "Inspections",
        "elements": elements,
    }))
    .expect("form fixture should deserialize")
}

/// `Inspections`: a site name, a numeric score and `visits` with nested `photos`.
pub fn inspections_form() -> Form {
    form_from(json!([
        {"key": "a", "type": "TextField", "data_name": "site_name"},
        {"key": "b", "type": "NumericField", "data_name": "score"},
        {"key": "r", "type": "Repeatable", "data_name": "visits", "elements": [
            {"key": "c", "type": "DateField", "data_name": "visited_on"},
            {"key": "p", "type": "Repeatable", "data_name": "photos", "elements": [
                {"key": "d", "type": "TextField", "data_name": "caption"}
            ]}
        ]}
    ]))
}

pub fn inspection(id: &str, visits: usize) -> Record {
    let items = (0..visits)
        .map(|index| {
            json!({
                "id": format!("{id}-v{index}"),
                "form_values": {
                    "c": "2024-05-01",
                    "p": [{"id": format!("{id}-v{index}-p0"), "form_values": {"d": "front"}}]
                }
            })
        })
        .collect::<Vec<_>>();

    let mut record = Record::new(id, "form-1");
    record.status = Some("done".to_string());
    record.created_at = Some("2024-05-01T08:00:00+02:00".to_string());
    record.form_values = json!({"a": format!("site {id}"), "b": 4.5, "r": items})
        .as_object()
        .cloned()
        .expect("object");
    record
}
