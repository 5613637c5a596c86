use super::store::StoreArgs;
use super::sync::{ReplayArgs, SyncArgs};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "formsync")]
#[command(about = "Mirror form records into relational tables")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Schema that holds the generated tables and views.
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Log every executed statement.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild every active form of an organization from a host export.
    Sync(SyncArgs),
    /// Apply a log of form and record events to the store.
    Replay(ReplayArgs),
}
