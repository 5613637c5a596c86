use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One data instance of a form. `form_values` is keyed by element key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub form_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub form_values: Map<String, JsonValue>,
}

/// One entry of a repeatable group inside `form_values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatableItem {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub form_values: Map<String, JsonValue>,
}

impl Record {
    pub fn new(id: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            form_id: form_id.into(),
            status: None,
            version: None,
            created_at: None,
            updated_at: None,
            latitude: None,
            longitude: None,
            form_values: Map::new(),
        }
    }
}
