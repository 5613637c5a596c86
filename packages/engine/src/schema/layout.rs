use std::collections::{BTreeMap, HashSet};

use crate::errors;
use crate::naming;
use crate::{
    Account, ColumnType, Element, ElementKind, FieldType, Form, FormIdentity, FormVersion,
    SqlDialect, SyncError,
};

pub(crate) const ROOT_SYSTEM_COLUMNS: &[(&str, ColumnType)] = &[
    ("record_id", ColumnType::Text),
    ("status", ColumnType::Text),
    ("version", ColumnType::Integer),
    ("created_at", ColumnType::Timestamp),
    ("updated_at", ColumnType::Timestamp),
    ("latitude", ColumnType::Double),
    ("longitude", ColumnType::Double),
];

pub(crate) const CHILD_SYSTEM_COLUMNS: &[(&str, ColumnType)] = &[
    ("child_id", ColumnType::Text),
    ("record_id", ColumnType::Text),
    ("parent_id", ColumnType::Text),
    ("item_index", ColumnType::Integer),
    ("created_at", ColumnType::Timestamp),
    ("updated_at", ColumnType::Timestamp),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub name: String,
    pub key: String,
    pub data_name: String,
    pub field_type: FieldType,
}

impl ColumnLayout {
    pub fn column_type(&self) -> ColumnType {
        self.field_type.column_type()
    }
}

/// One generated table: the form root or a repeatable, with its nested repeatables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub name: String,
    /// Repeatable keys from the root down to this table; empty for the root.
    pub path: Vec<String>,
    pub data_name: Option<String>,
    pub parent: Option<String>,
    pub columns: Vec<ColumnLayout>,
    pub children: Vec<TableLayout>,
}

impl TableLayout {
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn key(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn system_columns(&self) -> &'static [(&'static str, ColumnType)] {
        if self.is_root() {
            ROOT_SYSTEM_COLUMNS
        } else {
            CHILD_SYSTEM_COLUMNS
        }
    }

    pub(crate) fn column_types(&self) -> BTreeMap<&str, ColumnType> {
        self.columns
            .iter()
            .map(|column| (column.name.as_str(), column.column_type()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormLayout {
    pub root: TableLayout,
}

impl FormLayout {
    pub fn build(
        dialect: SqlDialect,
        account: &Account,
        version: &FormVersion,
    ) -> Result<Self, SyncError> {
        let elements = version.parse_elements()?;
        Self::from_parts(dialect, account, version, &version.name, &elements)
    }

    pub fn from_form(dialect: SqlDialect, account: &Account, form: &Form) -> Result<Self, SyncError> {
        Self::from_parts(dialect, account, form, &form.name, &form.elements)
    }

    fn from_parts(
        dialect: SqlDialect,
        account: &Account,
        form: &dyn FormIdentity,
        form_name: &str,
        elements: &[Element],
    ) -> Result<Self, SyncError> {
        let builder = LayoutBuilder {
            dialect,
            account,
            form,
            form_name,
        };
        let mut seen_keys = HashSet::new();
        let root = builder.build_table(Vec::new(), None, None, elements, &mut seen_keys)?;
        Ok(Self { root })
    }

    /// All tables, every parent before its children.
    pub fn tables(&self) -> Vec<&TableLayout> {
        let mut tables = Vec::new();
        push_preorder(&self.root, &mut tables);
        tables
    }

    pub fn find(&self, name: &str) -> Option<&TableLayout> {
        self.tables().into_iter().find(|table| table.name == name)
    }
}

fn push_preorder<'a>(table: &'a TableLayout, out: &mut Vec<&'a TableLayout>) {
    out.push(table);
    for child in &table.children {
        push_preorder(child, out);
    }
}

struct LayoutBuilder<'a> {
    dialect: SqlDialect,
    account: &'a Account,
    form: &'a dyn FormIdentity,
    form_name: &'a str,
}

impl LayoutBuilder<'_> {
    fn build_table(
        &self,
        path: Vec<String>,
        data_name: Option<String>,
        parent: Option<String>,
        elements: &[Element],
        seen_keys: &mut HashSet<String>,
    ) -> Result<TableLayout, SyncError> {
        let name = naming::table_name(self.dialect, self.account, Some(self.form), &path)?;
        let mut columns = Vec::new();
        let mut nested = Vec::new();
        self.collect(elements, &mut columns, &mut nested, seen_keys)?;

        let mut table = TableLayout {
            name,
            path,
            data_name,
            parent,
            columns,
            children: Vec::new(),
        };

        for repeatable in nested {
            let mut child_path = table.path.clone();
            child_path.push(repeatable.key.clone());
            let child = self.build_table(
                child_path,
                Some(repeatable.data_name.clone()),
                Some(table.name.clone()),
                &repeatable.elements,
                seen_keys,
            )?;
            table.children.push(child);
        }

        Ok(table)
    }

    /// Sections are flattened into the enclosing table; repeatables are deferred.
    fn collect<'e>(
        &self,
        elements: &'e [Element],
        columns: &mut Vec<ColumnLayout>,
        nested: &mut Vec<&'e Element>,
        seen_keys: &mut HashSet<String>,
    ) -> Result<(), SyncError> {
        for element in elements {
            naming::validate_key(&element.key)?;
            if !seen_keys.insert(naming::key_identity(&element.key)) {
                return Err(errors::invalid_form_definition_error(
                    self.form_name,
                    &format!(
                        "element key `{}` is used more than once (keys are compared ignoring case)",
                        element.key
                    ),
                ));
            }

            match element.kind() {
                ElementKind::Field(field_type) => columns.push(ColumnLayout {
                    name: naming::column_name(&element.key),
                    key: element.key.clone(),
                    data_name: element.data_name.clone(),
                    field_type,
                }),
                ElementKind::Section => self.collect(&element.elements, columns, nested, seen_keys)?,
                ElementKind::Repeatable => nested.push(element),
                ElementKind::Label => {}
                ElementKind::Unsupported => {
                    return Err(errors::unsupported_field_type_error(
                        &element.element_type,
                        &element.data_name,
                    ))
                }
            }
        }
        Ok(())
    }
}
