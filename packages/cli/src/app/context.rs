use formsync_rs_sdk::SyncConfig;

use crate::cli::root::Cli;
use crate::db::{self, StoreTarget};
use crate::error::CliError;

/// Global settings every command runs with.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub store: StoreTarget,
    pub schema: Option<String>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Ok(Self {
            store: db::resolve_store(&cli.store)?,
            schema: cli.schema.clone(),
        })
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            schema: self.schema.clone(),
            ..SyncConfig::default()
        }
    }
}
