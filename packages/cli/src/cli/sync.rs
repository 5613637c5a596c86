use clap::{Args, ValueHint};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Organization name or id.
    #[arg(long, required_unless_present = "setup")]
    pub org: Option<String>,

    /// JSON export of accounts, forms and records.
    #[arg(long, required_unless_present = "setup", value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Create the target database and exit.
    #[arg(long)]
    pub setup: bool,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Organization name or id.
    #[arg(long)]
    pub org: String,

    /// JSON export used to resolve forms and rebuild missing tables.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub data: PathBuf,

    /// JSON Lines event log, or `-` for stdin.
    #[arg(long, default_value = "-")]
    pub events: String,
}
