use std::borrow::Cow;

pub(crate) fn escape_sql_string(input: &str) -> String {
    input.replace('\'', "''")
}

pub(crate) fn quote_ident(value: &str) -> String {
    let escaped = value.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

/// Drivers reject embedded NUL bytes, and host data occasionally carries them.
pub(crate) fn strip_nul(sql: &str) -> Cow<'_, str> {
    if sql.contains('\0') {
        Cow::Owned(sql.replace('\0', ""))
    } else {
        Cow::Borrowed(sql)
    }
}
