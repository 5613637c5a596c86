use crate::cli::store::StoreArgs;
use crate::error::CliError;
use formsync_rs_sdk::{
    create_postgres_database, PgConnectOptions, PostgresBackend, SqliteBackend, SyncBackend,
};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum StoreTarget {
    Sqlite(PathBuf),
    Postgres(PgConnectOptions),
}

impl StoreTarget {
    pub fn describe(&self) -> String {
        match self {
            Self::Sqlite(path) => format!("sqlite database {}", path.display()),
            Self::Postgres(options) => format!(
                "postgres database {} on {}:{}",
                options.get_database().unwrap_or("(default)"),
                options.get_host(),
                options.get_port()
            ),
        }
    }
}

/// Picks the store from the global flags. Separate `--pg-*` flags start from
/// libpq defaults (`PGHOST`, `PGUSER`, ...) and override them one by one.
pub fn resolve_store(args: &StoreArgs) -> Result<StoreTarget, CliError> {
    if let Some(path) = &args.sqlite {
        return Ok(StoreTarget::Sqlite(path.clone()));
    }

    let mut options = match &args.database_url {
        Some(url) => PgConnectOptions::from_str(url)
            .map_err(|err| CliError::msg(format!("invalid --database-url: {err}")))?,
        None if args.has_pg_parts() => PgConnectOptions::new(),
        None => {
            return Err(CliError::InvalidArgs(
                "pass --sqlite <path>, --database-url <url> or --pg-* connection flags",
            ))
        }
    };

    if let Some(host) = &args.pg_host {
        options = options.host(host);
    }
    if let Some(port) = args.pg_port {
        options = options.port(port);
    }
    if let Some(user) = &args.pg_user {
        options = options.username(user);
    }
    if let Some(password) = &args.pg_password {
        options = options.password(password);
    }
    if let Some(database) = &args.pg_database {
        options = options.database(database);
    }

    Ok(StoreTarget::Postgres(options))
}

pub async fn open_backend(
    target: &StoreTarget,
) -> Result<Box<dyn SyncBackend + Send + Sync>, CliError> {
    match target {
        StoreTarget::Sqlite(path) => {
            let backend = SqliteBackend::open(path).map_err(|err| {
                CliError::sync(format!("failed to open {}", target.describe()), err)
            })?;
            Ok(Box::new(backend))
        }
        StoreTarget::Postgres(options) => {
            let backend = PostgresBackend::connect_with(options.clone())
                .await
                .map_err(|err| {
                    CliError::sync(format!("failed to connect to {}", target.describe()), err)
                })?;
            Ok(Box::new(backend))
        }
    }
}

/// Creates the target database. Returns `false` when it already existed.
pub async fn setup_database(target: &StoreTarget) -> Result<bool, CliError> {
    match target {
        StoreTarget::Sqlite(path) => {
            let existed = path.exists();
            SqliteBackend::open(path).map_err(|err| {
                CliError::sync(format!("failed to create {}", target.describe()), err)
            })?;
            Ok(!existed)
        }
        StoreTarget::Postgres(options) => {
            let name = options
                .get_database()
                .ok_or(CliError::InvalidArgs(
                    "--setup needs a database name (--pg-database or a name in --database-url)",
                ))?
                .to_string();
            create_postgres_database(options, &name)
                .await
                .map_err(|err| CliError::sync(format!("failed to create database {name}"), err))
        }
    }
}
