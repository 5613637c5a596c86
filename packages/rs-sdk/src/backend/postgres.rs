use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use formsync_engine::errors::{backend_unavailable_error, statement_failed_error};
use formsync_engine::{QueryResult, SqlDialect, SyncBackend, SyncError, Value};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// PostgreSQL store driven through a single-connection sqlx pool.
///
/// Statements are sent with the simple query protocol, so they may carry
/// inline literals but never bind parameters.
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub async fn connect(url: &str) -> Result<Self, SyncError> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|err| backend_unavailable_error(&format!("invalid postgres url: {err}")))?;
        Self::connect_with(options).await
    }

    pub async fn connect_with(options: PgConnectOptions) -> Result<Self, SyncError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|err| backend_unavailable_error(&format!("cannot connect to postgres: {err}")))?;
        Ok(Self { pool })
    }
}

#[async_trait(?Send)]
impl SyncBackend for PostgresBackend {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, SyncError> {
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| statement_failed_error(sql, &describe_error(&err)))?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| statement_failed_error(sql, &err.to_string()))?;

        Ok(QueryResult { rows, columns })
    }
}

/// Creates database `name` on the server described by `options` unless it exists.
///
/// Connects to the `postgres` maintenance database to do so. Returns whether
/// the database was created.
pub async fn create_postgres_database(
    options: &PgConnectOptions,
    name: &str,
) -> Result<bool, SyncError> {
    let maintenance = PostgresBackend::connect_with(options.clone().database("postgres")).await?;
    let literal = format!("'{}'", name.replace('\'', "''"));

    let existing = maintenance
        .execute(&format!("SELECT 1 FROM pg_database WHERE datname = {literal}"))
        .await?;
    if !existing.rows.is_empty() {
        tracing::info!(database = name, "database already exists");
        return Ok(false);
    }

    let sql = format!("CREATE DATABASE \"{}\"", name.replace('"', "\"\""));
    tracing::info!(statement = %sql, "creating database");
    maintenance.execute(&sql).await?;
    Ok(true)
}

/// Database errors keep the server message, which the missing-relation
/// classification relies on.
fn describe_error(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => match db.code() {
            Some(code) => format!("{} (SQLSTATE {code})", db.message()),
            None => db.message().to_string(),
        },
        other => other.to_string(),
    }
}

fn map_row(row: &PgRow) -> Result<Vec<Value>, sqlx::Error> {
    let mut values = Vec::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        if row.try_get_raw(idx)?.is_null() {
            values.push(Value::Null);
            continue;
        }

        let value = match column.type_info().name() {
            "BOOL" => Value::Boolean(row.try_get(idx)?),
            "INT2" => Value::Integer(i64::from(row.try_get::<i16, _>(idx)?)),
            "INT4" => Value::Integer(i64::from(row.try_get::<i32, _>(idx)?)),
            "INT8" => Value::Integer(row.try_get(idx)?),
            "FLOAT4" => Value::Real(f64::from(row.try_get::<f32, _>(idx)?)),
            "FLOAT8" => Value::Real(row.try_get(idx)?),
            "BYTEA" => Value::Blob(row.try_get(idx)?),
            "DATE" => Value::Text(row.try_get::<NaiveDate, _>(idx)?.format("%Y-%m-%d").to_string()),
            "TIME" => Value::Text(row.try_get::<NaiveTime, _>(idx)?.format("%H:%M:%S").to_string()),
            "TIMESTAMP" => Value::Text(
                row.try_get::<NaiveDateTime, _>(idx)?
                    .format("%Y-%m-%dT%H:%M:%S%.f")
                    .to_string(),
            ),
            "TIMESTAMPTZ" => Value::Text(
                row.try_get::<DateTime<Utc>, _>(idx)?
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ),
            _ => Value::Text(row.try_get_unchecked::<String, _>(idx)?),
        };
        values.push(value);
    }
    Ok(values)
}
