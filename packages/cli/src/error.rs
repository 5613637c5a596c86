use std::fmt::{Display, Formatter};

use formsync_rs_sdk::SyncError;

#[derive(Debug)]
pub enum CliError {
    InvalidArgs(&'static str),
    Message(String),
    Io {
        context: &'static str,
        source: std::io::Error,
    },
    Sync {
        context: String,
        source: SyncError,
    },
}

impl CliError {
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn sync(context: impl Into<String>, source: SyncError) -> Self {
        Self::Sync {
            context: context.into(),
            source,
        }
    }

    /// The statement the store rejected, when that is what failed.
    pub fn statement(&self) -> Option<&str> {
        match self {
            Self::Sync { source, .. } => source.statement.as_deref(),
            _ => None,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgs(message) => write!(f, "invalid arguments: {message}"),
            Self::Message(message) => write!(f, "{message}"),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Sync { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Sync { source, .. } => Some(source),
            _ => None,
        }
    }
}
