use crate::errors::ErrorCode;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncError {
    pub code: ErrorCode,
    pub title: String,
    pub description: String,
    /// The statement the store rejected, for `StatementFailed`.
    pub statement: Option<String>,
}

impl SyncError {
    pub fn new(code: ErrorCode, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code,
            title: title.into(),
            description: description.into(),
            statement: None,
        }
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

impl std::error::Error for SyncError {}
