use crate::sql_text::{quote_ident, quote_literal};
use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDialect {
    Sqlite,
    Postgres,
}

/// Storage class of a generated column, independent of the dialect spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Integer,
    Double,
    Date,
    Timestamp,
}

impl SqlDialect {
    /// SQLite has no hard limit; 128 keeps generated names portable.
    pub const fn max_identifier_len(self) -> usize {
        match self {
            Self::Sqlite => 128,
            Self::Postgres => 63,
        }
    }

    pub const fn default_schema(self) -> &'static str {
        match self {
            Self::Sqlite => "main",
            Self::Postgres => "public",
        }
    }

    pub const fn column_type(self, column_type: ColumnType) -> &'static str {
        match (self, column_type) {
            (_, ColumnType::Text) => "TEXT",
            (Self::Sqlite, ColumnType::Integer) => "INTEGER",
            (Self::Postgres, ColumnType::Integer) => "BIGINT",
            (Self::Sqlite, ColumnType::Double) => "REAL",
            (Self::Postgres, ColumnType::Double) => "DOUBLE PRECISION",
            (Self::Sqlite, ColumnType::Date) => "TEXT",
            (Self::Postgres, ColumnType::Date) => "DATE",
            (Self::Sqlite, ColumnType::Timestamp) => "TEXT",
            (Self::Postgres, ColumnType::Timestamp) => "TIMESTAMP WITH TIME ZONE",
        }
    }
}

/// A dialect plus the schema every generated object lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTarget {
    pub dialect: SqlDialect,
    pub schema: String,
}

impl SqlTarget {
    pub fn new(dialect: SqlDialect, schema: impl Into<String>) -> Self {
        Self {
            dialect,
            schema: schema.into(),
        }
    }

    pub fn with_default_schema(dialect: SqlDialect) -> Self {
        Self::new(dialect, dialect.default_schema())
    }

    pub fn qualify(&self, name: &str) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(name))
    }

    /// Catalog query listing the base tables of the target schema as a single `name` column.
    pub fn list_tables_sql(&self) -> String {
        match self.dialect {
            SqlDialect::Sqlite => format!(
                "SELECT name FROM {schema}.sqlite_master WHERE type = 'table'",
                schema = quote_ident(&self.schema),
            ),
            SqlDialect::Postgres => format!(
                "SELECT CAST(table_name AS TEXT) AS name \
                 FROM information_schema.tables \
                 WHERE table_schema = {schema} AND table_type = 'BASE TABLE'",
                schema = quote_literal(&self.schema),
            ),
        }
    }

    /// SQLite wants the index name qualified and the table bare; Postgres the reverse.
    pub fn create_index_sql(&self, index: &str, table: &str, column: &str) -> String {
        match self.dialect {
            SqlDialect::Sqlite => format!(
                "CREATE INDEX {index} ON {table} ({column})",
                index = self.qualify(index),
                table = quote_ident(table),
                column = quote_ident(column),
            ),
            SqlDialect::Postgres => format!(
                "CREATE INDEX {index} ON {table} ({column})",
                index = quote_ident(index),
                table = self.qualify(table),
                column = quote_ident(column),
            ),
        }
    }

    /// SQLite foreign key clauses cannot name a schema.
    pub fn references_sql(&self, table: &str, column: &str) -> String {
        let table = match self.dialect {
            SqlDialect::Sqlite => quote_ident(table),
            SqlDialect::Postgres => self.qualify(table),
        };
        format!("REFERENCES {table} ({})", quote_ident(column))
    }

    pub fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Boolean(value) => {
                let text = match (self.dialect, *value) {
                    (SqlDialect::Sqlite, true) => "1",
                    (SqlDialect::Sqlite, false) => "0",
                    (SqlDialect::Postgres, true) => "TRUE",
                    (SqlDialect::Postgres, false) => "FALSE",
                };
                text.to_string()
            }
            Value::Integer(value) => value.to_string(),
            Value::Real(value) if value.is_finite() => value.to_string(),
            Value::Real(_) => "NULL".to_string(),
            Value::Text(value) => quote_literal(value),
            Value::Blob(bytes) => {
                let hex = bytes.iter().map(|byte| format!("{byte:02x}")).collect::<String>();
                match self.dialect {
                    SqlDialect::Sqlite => format!("X'{hex}'"),
                    SqlDialect::Postgres => format!("'\\x{hex}'::bytea"),
                }
            }
        }
    }
}
