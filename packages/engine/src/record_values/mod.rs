//! Statements that materialize a record (and its repeatable items) into the
//! generated tables.

mod values;

use serde_json::{Map, Value as JsonValue};

use crate::errors;
use crate::schema::{FormLayout, TableLayout};
use crate::sql_text::quote_ident;
use crate::{Account, Form, Record, RepeatableItem, SqlTarget, SyncError, Value};

use values::{field_value, timestamp_value};

/// Upserts the root row, clears every child table for the record and
/// re-inserts the repeatable items, parents before their nested items.
pub fn update_for_record_statements(
    target: &SqlTarget,
    account: &Account,
    form: &Form,
    record: &Record,
) -> Result<Vec<String>, SyncError> {
    let layout = FormLayout::from_form(target.dialect, account, form)?;

    let mut statements = vec![upsert_root_sql(target, &layout.root, record)?];
    statements.extend(
        layout
            .tables()
            .into_iter()
            .rev()
            .filter(|table| !table.is_root())
            .map(|table| delete_rows_sql(target, &table.name, &record.id)),
    );

    for child in &layout.root.children {
        push_item_inserts(target, child, record, None, &record.form_values, &mut statements)?;
    }

    Ok(statements)
}

/// Removes the record from every table of the form, nested children first.
pub fn delete_for_record_statements(
    target: &SqlTarget,
    account: &Account,
    form: &Form,
    record: &Record,
) -> Result<Vec<String>, SyncError> {
    let layout = FormLayout::from_form(target.dialect, account, form)?;

    Ok(layout
        .tables()
        .into_iter()
        .rev()
        .map(|table| delete_rows_sql(target, &table.name, &record.id))
        .collect())
}

fn upsert_root_sql(
    target: &SqlTarget,
    root: &TableLayout,
    record: &Record,
) -> Result<String, SyncError> {
    let mut row: Vec<(&str, Value)> = vec![
        ("record_id", Value::Text(record.id.clone())),
        ("status", record.status.clone().map_or(Value::Null, Value::Text)),
        ("version", record.version.map_or(Value::Null, Value::Integer)),
        (
            "created_at",
            timestamp_value(record.created_at.as_deref(), &record.id, "created_at")?,
        ),
        (
            "updated_at",
            timestamp_value(record.updated_at.as_deref(), &record.id, "updated_at")?,
        ),
        ("latitude", record.latitude.map_or(Value::Null, Value::Real)),
        ("longitude", record.longitude.map_or(Value::Null, Value::Real)),
    ];
    push_field_values(root, &record.form_values, &record.id, &mut row)?;

    let updates = row
        .iter()
        .skip(1)
        .map(|(column, _)| format!("{col} = excluded.{col}", col = quote_ident(column)))
        .collect::<Vec<_>>();

    Ok(format!(
        "{insert} ON CONFLICT (\"record_id\") DO UPDATE SET {updates}",
        insert = insert_sql(target, &root.name, &row),
        updates = updates.join(", "),
    ))
}

fn push_item_inserts(
    target: &SqlTarget,
    table: &TableLayout,
    record: &Record,
    parent_id: Option<&str>,
    values: &Map<String, JsonValue>,
    statements: &mut Vec<String>,
) -> Result<(), SyncError> {
    let data_name = table.data_name.as_deref().unwrap_or_default();
    let raw_items = match table.key().and_then(|key| values.get(key)) {
        None | Some(JsonValue::Null) => return Ok(()),
        Some(JsonValue::Array(items)) => items,
        Some(_) => {
            return Err(errors::invalid_record_value_error(
                &record.id,
                data_name,
                "expected an array of repeatable items",
            ))
        }
    };

    for (index, raw_item) in raw_items.iter().enumerate() {
        let item: RepeatableItem = serde_json::from_value(raw_item.clone()).map_err(|err| {
            errors::invalid_record_value_error(
                &record.id,
                data_name,
                &format!("item {index} is not a repeatable item: {err}"),
            )
        })?;

        statements.push(insert_item_sql(target, table, record, parent_id, index, &item)?);

        for child in &table.children {
            push_item_inserts(target, child, record, Some(&item.id), &item.form_values, statements)?;
        }
    }

    Ok(())
}

fn insert_item_sql(
    target: &SqlTarget,
    table: &TableLayout,
    record: &Record,
    parent_id: Option<&str>,
    index: usize,
    item: &RepeatableItem,
) -> Result<String, SyncError> {
    let mut row: Vec<(&str, Value)> = vec![
        ("child_id", Value::Text(item.id.clone())),
        ("record_id", Value::Text(record.id.clone())),
        (
            "parent_id",
            parent_id.map_or(Value::Null, |id| Value::Text(id.to_string())),
        ),
        ("item_index", Value::Integer(index as i64)),
        (
            "created_at",
            timestamp_value(item.created_at.as_deref(), &record.id, "created_at")?,
        ),
        (
            "updated_at",
            timestamp_value(item.updated_at.as_deref(), &record.id, "updated_at")?,
        ),
    ];
    push_field_values(table, &item.form_values, &record.id, &mut row)?;

    Ok(insert_sql(target, &table.name, &row))
}

fn push_field_values<'t>(
    table: &'t TableLayout,
    values: &Map<String, JsonValue>,
    record_id: &str,
    row: &mut Vec<(&'t str, Value)>,
) -> Result<(), SyncError> {
    for column in &table.columns {
        let value = field_value(column, values.get(&column.key), record_id)?;
        row.push((column.name.as_str(), value));
    }
    Ok(())
}

fn insert_sql(target: &SqlTarget, table: &str, row: &[(&str, Value)]) -> String {
    let columns = row
        .iter()
        .map(|(column, _)| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let values = row
        .iter()
        .map(|(_, value)| target.literal(value))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({columns}) VALUES ({values})",
        table = target.qualify(table),
    )
}

fn delete_rows_sql(target: &SqlTarget, table: &str, record_id: &str) -> String {
    format!(
        "DELETE FROM {table} WHERE \"record_id\" = {id}",
        table = target.qualify(table),
        id = target.literal(&Value::Text(record_id.to_string())),
    )
}
