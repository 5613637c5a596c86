use clap::{Args, ValueHint};
use std::path::PathBuf;

/// Where the generated tables live: a SQLite file or a Postgres server.
#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// Path to a SQLite database file.
    #[arg(
        long,
        global = true,
        value_hint = ValueHint::FilePath,
        conflicts_with_all = ["database_url", "pg_host", "pg_port", "pg_user", "pg_password", "pg_database"]
    )]
    pub sqlite: Option<PathBuf>,

    /// Postgres connection string, e.g. postgres://user@localhost/forms.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[arg(long, global = true)]
    pub pg_host: Option<String>,

    #[arg(long, global = true)]
    pub pg_port: Option<u16>,

    #[arg(long, global = true)]
    pub pg_user: Option<String>,

    #[arg(long, global = true)]
    pub pg_password: Option<String>,

    #[arg(long, global = true)]
    pub pg_database: Option<String>,
}

impl StoreArgs {
    pub(crate) fn has_pg_parts(&self) -> bool {
        self.pg_host.is_some()
            || self.pg_port.is_some()
            || self.pg_user.is_some()
            || self.pg_password.is_some()
            || self.pg_database.is_some()
    }
}
