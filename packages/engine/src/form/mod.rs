mod record;

pub use record::{Record, RepeatableItem};

use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{ColumnType, SyncError};

/// Tenant boundary. `row_id` namespaces every generated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub row_id: i64,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: String,
    pub row_id: i64,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Snapshot of a form at one point in time, with the element tree kept serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormVersion {
    pub id: String,
    pub row_id: i64,
    pub name: String,
    pub elements: String,
}

/// Anything that identifies a form well enough to name its tables.
pub trait FormIdentity {
    fn form_row_id(&self) -> i64;
}

impl FormIdentity for Form {
    fn form_row_id(&self) -> i64 {
        self.row_id
    }
}

impl FormIdentity for FormVersion {
    fn form_row_id(&self) -> i64 {
        self.row_id
    }
}

impl Form {
    /// Snapshot of this definition with its elements serialized as JSON.
    pub fn version(&self) -> Result<FormVersion, SyncError> {
        let elements = serde_json::to_string(&self.elements).map_err(|err| {
            errors::invalid_form_definition_error(
                &self.name,
                &format!("elements cannot be serialized: {err}"),
            )
        })?;
        Ok(FormVersion {
            id: self.id.clone(),
            row_id: self.row_id,
            name: self.name.clone(),
            elements,
        })
    }

    /// Every repeatable in the tree, parents before their nested repeatables.
    pub fn repeatables(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_repeatables(&self.elements, &mut found);
        found
    }
}

impl FormVersion {
    pub fn parse_elements(&self) -> Result<Vec<Element>, SyncError> {
        serde_json::from_str(&self.elements).map_err(|err| {
            errors::invalid_form_definition_error(
                &self.name,
                &format!("elements are not valid JSON: {err}"),
            )
        })
    }

    pub fn to_form(&self) -> Result<Form, SyncError> {
        Ok(Form {
            id: self.id.clone(),
            row_id: self.row_id,
            name: self.name.clone(),
            elements: self.parse_elements()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub key: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub data_name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Field(FieldType),
    Section,
    Repeatable,
    Label,
    Unsupported,
}

/// How a field's value is serialized; several host element types share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Choice,
    Address,
    Media,
    Number,
    Date,
    Time,
}

impl FieldType {
    pub const fn column_type(self) -> ColumnType {
        match self {
            Self::Text | Self::Choice | Self::Address | Self::Media | Self::Time => {
                ColumnType::Text
            }
            Self::Number => ColumnType::Double,
            Self::Date => ColumnType::Date,
        }
    }
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self.element_type.as_str() {
            "Section" => ElementKind::Section,
            "Repeatable" => ElementKind::Repeatable,
            "Label" => ElementKind::Label,
            "TextField" | "YesNoField" | "BarcodeField" | "HyperlinkField" | "CalculatedField"
            | "HiddenField" => ElementKind::Field(FieldType::Text),
            "ChoiceField" | "ClassificationField" => ElementKind::Field(FieldType::Choice),
            "AddressField" => ElementKind::Field(FieldType::Address),
            "PhotoField" | "VideoField" | "AudioField" | "SignatureField" | "RecordLinkField"
            | "AttachmentField" => ElementKind::Field(FieldType::Media),
            "NumericField" => ElementKind::Field(FieldType::Number),
            "DateTimeField" | "DateField" => ElementKind::Field(FieldType::Date),
            "TimeField" => ElementKind::Field(FieldType::Time),
            _ => ElementKind::Unsupported,
        }
    }

    pub fn is_repeatable(&self) -> bool {
        self.kind() == ElementKind::Repeatable
    }
}

fn collect_repeatables<'a>(elements: &'a [Element], found: &mut Vec<&'a Element>) {
    for element in elements {
        match element.kind() {
            ElementKind::Repeatable => {
                found.push(element);
                collect_repeatables(&element.elements, found);
            }
            ElementKind::Section => collect_repeatables(&element.elements, found),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ElementKind, FieldType, Form};
    use crate::ErrorCode;

    fn inspection_form() -> Form {
        serde_json::from_value(json!({
            "id": "form-1",
            "row_id": 7,
            "name": "Inspections",
            "elements": [
                {"key": "a1", "type": "TextField", "data_name": "site"},
                {"key": "s1", "type": "Section", "data_name": "details", "elements": [
                    {"key": "r1", "type": "Repeatable", "data_name": "defects", "elements": [
                        {"key": "b2", "type": "NumericField", "data_name": "severity"},
                        {"key": "r2", "type": "Repeatable", "data_name": "photos", "elements": []}
                    ]}
                ]}
            ]
        }))
        .expect("form fixture should deserialize")
    }

    #[test]
    fn classifies_element_types() {
        let form = inspection_form();

        assert_eq!(form.elements[0].kind(), ElementKind::Field(FieldType::Text));
        assert_eq!(form.elements[1].kind(), ElementKind::Section);
        assert!(form.elements[1].elements[0].is_repeatable());
    }

    #[test]
    fn repeatables_are_listed_parent_first_through_sections() {
        let form = inspection_form();
        let keys = form
            .repeatables()
            .into_iter()
            .map(|element| element.key.as_str())
            .collect::<Vec<_>>();

        assert_eq!(keys, vec!["r1", "r2"]);
    }

    #[test]
    fn version_snapshot_round_trips_the_element_tree() {
        let form = inspection_form();
        let version = form.version().expect("version");

        assert_eq!(version.row_id, 7);
        assert_eq!(version.to_form().expect("version should parse"), form);
    }

    #[test]
    fn malformed_version_elements_are_rejected() {
        let mut version = inspection_form().version().expect("version");
        version.elements = "{not json".to_string();

        let err = version.parse_elements().expect_err("should fail");
        assert_eq!(err.code, ErrorCode::InvalidFormDefinition);
        assert!(err.description.contains("Inspections"), "{err:?}");
    }
}
