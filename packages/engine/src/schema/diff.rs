use std::collections::HashMap;

use crate::naming;
use crate::sql_text::quote_ident;
use crate::{Account, ColumnType, FormVersion, SqlTarget, SyncError};

use super::layout::{FormLayout, TableLayout};
use super::views::{create_view_full_sql, drop_view_full_sql, view_full_projection};

/// Ordered DDL migrating the generated schema from `old` to `new`.
///
/// `None` on either side means "no such version": `(None, Some)` creates
/// everything, `(Some, None)` drops everything. The statements must be run
/// strictly in the returned order:
///
/// 1. `_view_full` drops for every removed or changed table,
/// 2. drops of removed tables, nested children first,
/// 3. creates of added tables and column changes of kept tables, parents first,
/// 4. `_view_full` creates for every added or changed table.
///
/// A column whose type changes is dropped and re-added rather than altered.
pub fn generate_schema_statements(
    target: &SqlTarget,
    account: &Account,
    old: Option<&FormVersion>,
    new: Option<&FormVersion>,
) -> Result<Vec<String>, SyncError> {
    let old_layout = old
        .map(|version| FormLayout::build(target.dialect, account, version))
        .transpose()?;
    let new_layout = new
        .map(|version| FormLayout::build(target.dialect, account, version))
        .transpose()?;

    let old_tables = old_layout.as_ref().map(FormLayout::tables).unwrap_or_default();
    let new_tables = new_layout.as_ref().map(FormLayout::tables).unwrap_or_default();
    let old_by_name = index_by_name(&old_tables);
    let new_by_name = index_by_name(&new_tables);
    let root_name = new_layout.as_ref().map(|layout| layout.root.name.as_str());

    let mut view_drops = Vec::new();
    let mut table_drops = Vec::new();
    let mut table_changes = Vec::new();
    let mut view_creates = Vec::new();

    for table in &old_tables {
        let keep = match new_by_name.get(table.name.as_str()) {
            Some(new_table) => !table_changed(table, new_table),
            None => false,
        };
        if !keep {
            view_drops.push(drop_view_full_sql(target, &table.name));
        }
    }

    for table in old_tables.iter().rev() {
        if !new_by_name.contains_key(table.name.as_str()) {
            table_drops.push(drop_table_sql(target, &table.name));
        }
    }

    for table in &new_tables {
        match old_by_name.get(table.name.as_str()) {
            None => {
                let root_name = root_name.unwrap_or(table.name.as_str());
                table_changes.extend(create_table_statements(target, table, root_name));
                view_creates.push(create_view_full_sql(target, table));
            }
            Some(old_table) if table_changed(old_table, table) => {
                table_changes.extend(alter_table_statements(target, old_table, table));
                view_creates.push(create_view_full_sql(target, table));
            }
            Some(_) => {}
        }
    }

    let mut statements = view_drops;
    statements.extend(table_drops);
    statements.extend(table_changes);
    statements.extend(view_creates);
    Ok(statements)
}

fn index_by_name<'a>(tables: &[&'a TableLayout]) -> HashMap<&'a str, &'a TableLayout> {
    tables
        .iter()
        .map(|table| (table.name.as_str(), *table))
        .collect()
}

fn table_changed(old: &TableLayout, new: &TableLayout) -> bool {
    old.column_types() != new.column_types()
        || view_full_projection(old) != view_full_projection(new)
}

fn create_table_statements(target: &SqlTarget, table: &TableLayout, root_name: &str) -> Vec<String> {
    let dialect = target.dialect;
    let mut definitions = Vec::new();

    if table.is_root() {
        definitions.push(format!("{} TEXT NOT NULL PRIMARY KEY", quote_ident("record_id")));
    } else {
        definitions.push(format!("{} TEXT NOT NULL PRIMARY KEY", quote_ident("child_id")));
        definitions.push(format!(
            "{} TEXT NOT NULL {}",
            quote_ident("record_id"),
            target.references_sql(root_name, "record_id")
        ));
        match table.parent.as_deref().filter(|parent| *parent != root_name) {
            Some(parent) => definitions.push(format!(
                "{} TEXT {}",
                quote_ident("parent_id"),
                target.references_sql(parent, "child_id")
            )),
            None => definitions.push(format!("{} TEXT", quote_ident("parent_id"))),
        }
        definitions.push(format!(
            "{} {} NOT NULL",
            quote_ident("item_index"),
            dialect.column_type(ColumnType::Integer)
        ));
    }

    let keyed = ["record_id", "child_id", "parent_id", "item_index"];
    for (name, column_type) in table.system_columns() {
        if !keyed.contains(name) {
            definitions.push(format!(
                "{} {}",
                quote_ident(name),
                dialect.column_type(*column_type)
            ));
        }
    }
    for column in &table.columns {
        definitions.push(format!(
            "{} {}",
            quote_ident(&column.name),
            dialect.column_type(column.column_type())
        ));
    }

    let mut statements = vec![format!(
        "CREATE TABLE {table} ({definitions})",
        table = target.qualify(&table.name),
        definitions = definitions.join(", "),
    )];

    if !table.is_root() {
        for column in ["record_id", "parent_id"] {
            statements.push(target.create_index_sql(
                &naming::index_name(dialect, &table.name, column),
                &table.name,
                column,
            ));
        }
    }

    statements
}

fn alter_table_statements(target: &SqlTarget, old: &TableLayout, new: &TableLayout) -> Vec<String> {
    let old_columns = old.column_types();
    let new_columns = new.column_types();
    let table = target.qualify(&new.name);
    let mut statements = Vec::new();

    for column in &old.columns {
        if new_columns.get(column.name.as_str()) != Some(&column.column_type()) {
            statements.push(format!(
                "ALTER TABLE {table} DROP COLUMN {column}",
                column = quote_ident(&column.name),
            ));
        }
    }

    for column in &new.columns {
        if old_columns.get(column.name.as_str()) != Some(&column.column_type()) {
            statements.push(format!(
                "ALTER TABLE {table} ADD COLUMN {column} {column_type}",
                column = quote_ident(&column.name),
                column_type = target.dialect.column_type(column.column_type()),
            ));
        }
    }

    statements
}

fn drop_table_sql(target: &SqlTarget, table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", target.qualify(table_name))
}
