//! Deterministic identifiers for generated tables, views, columns and indexes.
//!
//! Table names have the shape `account_<account row>_form_<form row>[_<key>...]`
//! where each trailing segment is a repeatable key along the nesting path.
//! Keys are restricted to ASCII alphanumerics, so the `_` separator can always
//! be split back into the original inputs. SQLite folds identifier case, so
//! keys are lowercased in every derived name and a form may not hold two keys
//! that differ only in case (see [`key_identity`]). Names that would exceed the
//! dialect's identifier limit are shortened to a prefix plus a BLAKE3 digest
//! of the full name.

use crate::errors;
use crate::{Account, FormIdentity, SqlDialect, SyncError};

const DIGEST_HEX_LEN: usize = 16;
const VIEW_FULL_SUFFIX: &str = "_view_full";

pub fn table_name<S: AsRef<str>>(
    dialect: SqlDialect,
    account: &Account,
    form: Option<&dyn FormIdentity>,
    repeatable_path: &[S],
) -> Result<String, SyncError> {
    let form = form.ok_or_else(|| errors::invalid_name_input_error("form is missing"))?;

    if account.row_id <= 0 {
        return Err(errors::invalid_name_input_error(&format!(
            "account row id must be positive, got {}",
            account.row_id
        )));
    }
    let form_row_id = form.form_row_id();
    if form_row_id <= 0 {
        return Err(errors::invalid_name_input_error(&format!(
            "form row id must be positive, got {form_row_id}"
        )));
    }

    let mut name = format!("account_{}_form_{}", account.row_id, form_row_id);
    for segment in repeatable_path {
        let segment = segment.as_ref();
        validate_key(segment)?;
        name.push('_');
        name.push_str(&key_identity(segment));
    }

    // Leaves room for the `_view_full` suffix so a table's view is always
    // literally `<table>_view_full`.
    let table_limit = dialect.max_identifier_len() - VIEW_FULL_SUFFIX.len();
    Ok(shorten(name, table_limit))
}

pub fn view_full_name(dialect: SqlDialect, table_name: &str) -> String {
    fit_identifier(dialect, format!("{table_name}{VIEW_FULL_SUFFIX}"))
}

pub fn index_name(dialect: SqlDialect, table_name: &str, column: &str) -> String {
    fit_identifier(dialect, format!("{table_name}_{column}_idx"))
}

/// Field columns are keyed by element key so renaming a field never touches the table.
pub fn column_name(key: &str) -> String {
    format!("f{}", key_identity(key))
}

/// The form of `key` used in identifiers. Two keys with the same identity
/// would name the same table or column.
pub fn key_identity(key: &str) -> String {
    key.to_ascii_lowercase()
}

pub fn friendly_view_name(form_name: &str, repeatable_data_name: Option<&str>) -> String {
    match repeatable_data_name {
        Some(data_name) => format!("{form_name} - {data_name}"),
        None => form_name.to_string(),
    }
}

pub(crate) fn validate_key(key: &str) -> Result<(), SyncError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(errors::invalid_name_input_error(&format!(
            "element key `{key}` must be non-empty ASCII alphanumeric"
        )));
    }
    Ok(())
}

fn fit_identifier(dialect: SqlDialect, name: String) -> String {
    shorten(name, dialect.max_identifier_len())
}

fn shorten(name: String, max_len: usize) -> String {
    if name.len() <= max_len {
        return name;
    }

    let digest = blake3::hash(name.as_bytes()).to_hex();
    let prefix_len = max_len - DIGEST_HEX_LEN - 1;
    format!("{}_{}", &name[..prefix_len], &digest.as_str()[..DIGEST_HEX_LEN])
}
