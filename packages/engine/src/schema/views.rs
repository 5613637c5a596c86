use std::collections::HashSet;

use crate::naming;
use crate::sql_text::quote_ident;
use crate::SqlTarget;

use super::layout::TableLayout;

/// `(column, alias)` pairs projected by a table's `_view_full`.
///
/// Field columns are exposed under their data name. When that clashes with a
/// system column or an earlier alias the column name is used instead.
pub fn view_full_projection(table: &TableLayout) -> Vec<(String, String)> {
    let mut used = HashSet::new();
    let mut projection = Vec::new();

    for (name, _) in table.system_columns() {
        used.insert(name.to_lowercase());
        projection.push((name.to_string(), name.to_string()));
    }

    for column in &table.columns {
        let candidates = [column.data_name.clone(), column.name.clone()];
        let alias = candidates
            .into_iter()
            .filter(|candidate| !candidate.is_empty())
            .find(|candidate| !used.contains(&candidate.to_lowercase()))
            .unwrap_or_else(|| format!("{}_{}", column.name, projection.len()));
        used.insert(alias.to_lowercase());
        projection.push((column.name.clone(), alias));
    }

    projection
}

pub fn create_view_full_sql(target: &SqlTarget, table: &TableLayout) -> String {
    let columns = view_full_projection(table)
        .into_iter()
        .map(|(column, alias)| {
            if column == alias {
                quote_ident(&column)
            } else {
                format!("{} AS {}", quote_ident(&column), quote_ident(&alias))
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE VIEW {view} AS SELECT {columns} FROM {table}",
        view = target.qualify(&naming::view_full_name(target.dialect, &table.name)),
        columns = columns,
        table = target.qualify(&table.name),
    )
}

pub fn drop_view_full_sql(target: &SqlTarget, table_name: &str) -> String {
    format!(
        "DROP VIEW IF EXISTS {view}",
        view = target.qualify(&naming::view_full_name(target.dialect, table_name)),
    )
}

pub fn create_friendly_view_sql(target: &SqlTarget, view_name: &str, table_name: &str) -> String {
    format!(
        "CREATE VIEW {view} AS SELECT * FROM {source}",
        view = target.qualify(view_name),
        source = target.qualify(&naming::view_full_name(target.dialect, table_name)),
    )
}

pub fn drop_friendly_view_sql(target: &SqlTarget, view_name: &str) -> String {
    format!("DROP VIEW IF EXISTS {view}", view = target.qualify(view_name))
}
