use crate::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidNameInput,
    UnsupportedFieldType,
    StatementFailed,
    AccountNotFound,
    InvalidFormDefinition,
    InvalidRecordValue,
    BackendUnavailable,
    HostDataUnavailable,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidNameInput => "FORMSYNC_ERROR_INVALID_NAME_INPUT",
            Self::UnsupportedFieldType => "FORMSYNC_ERROR_UNSUPPORTED_FIELD_TYPE",
            Self::StatementFailed => "FORMSYNC_ERROR_STATEMENT_FAILED",
            Self::AccountNotFound => "FORMSYNC_ERROR_ACCOUNT_NOT_FOUND",
            Self::InvalidFormDefinition => "FORMSYNC_ERROR_INVALID_FORM_DEFINITION",
            Self::InvalidRecordValue => "FORMSYNC_ERROR_INVALID_RECORD_VALUE",
            Self::BackendUnavailable => "FORMSYNC_ERROR_BACKEND_UNAVAILABLE",
            Self::HostDataUnavailable => "FORMSYNC_ERROR_HOST_DATA_UNAVAILABLE",
        }
    }

    pub const fn all() -> &'static [Self] {
        &[
            Self::InvalidNameInput,
            Self::UnsupportedFieldType,
            Self::StatementFailed,
            Self::AccountNotFound,
            Self::InvalidFormDefinition,
            Self::InvalidRecordValue,
            Self::BackendUnavailable,
            Self::HostDataUnavailable,
        ]
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn build_error(code: ErrorCode, title: &str, description: &str) -> SyncError {
    SyncError::new(code, title, description)
}

pub fn invalid_name_input_error(detail: &str) -> SyncError {
    build_error(
        ErrorCode::InvalidNameInput,
        "Invalid name input",
        &format!("cannot derive a table name: {detail}"),
    )
}

pub fn unsupported_field_type_error(element_type: &str, data_name: &str) -> SyncError {
    build_error(
        ErrorCode::UnsupportedFieldType,
        "Unsupported field type",
        &format!("element `{data_name}` has type `{element_type}`, which has no column mapping"),
    )
}

pub fn statement_failed_error(statement: &str, cause: &str) -> SyncError {
    build_error(ErrorCode::StatementFailed, "Statement failed", cause).with_statement(statement)
}

pub fn account_not_found_error(org: &str) -> SyncError {
    build_error(
        ErrorCode::AccountNotFound,
        "Account not found",
        &format!("unable to find account `{org}`"),
    )
}

pub fn invalid_form_definition_error(form_name: &str, detail: &str) -> SyncError {
    build_error(
        ErrorCode::InvalidFormDefinition,
        "Invalid form definition",
        &format!("form `{form_name}`: {detail}"),
    )
}

pub fn invalid_record_value_error(record_id: &str, data_name: &str, detail: &str) -> SyncError {
    build_error(
        ErrorCode::InvalidRecordValue,
        "Invalid record value",
        &format!("record `{record_id}` field `{data_name}`: {detail}"),
    )
}

pub fn backend_unavailable_error(detail: &str) -> SyncError {
    build_error(ErrorCode::BackendUnavailable, "Backend unavailable", detail)
}

pub fn host_data_unavailable_error(source: &str, detail: &str) -> SyncError {
    build_error(
        ErrorCode::HostDataUnavailable,
        "Host data unavailable",
        &format!("cannot load `{source}`: {detail}"),
    )
}
