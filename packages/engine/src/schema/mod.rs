mod diff;
mod layout;
mod views;

pub use diff::generate_schema_statements;
pub use layout::{ColumnLayout, FormLayout, TableLayout};
pub use views::{
    create_friendly_view_sql, create_view_full_sql, drop_friendly_view_sql, drop_view_full_sql,
    view_full_projection,
};
