use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::errors;
use crate::schema::ColumnLayout;
use crate::{FieldType, SyncError, Value};

const ADDRESS_PARTS: &[&str] = &[
    "sub_thoroughfare",
    "thoroughfare",
    "suite",
    "locality",
    "sub_admin_area",
    "admin_area",
    "postal_code",
    "country",
];

pub(crate) fn field_value(
    column: &ColumnLayout,
    raw: Option<&JsonValue>,
    record_id: &str,
) -> Result<Value, SyncError> {
    let raw = match raw {
        None | Some(JsonValue::Null) => return Ok(Value::Null),
        Some(raw) => raw,
    };

    let converted = match column.field_type {
        FieldType::Text => text_value(raw),
        FieldType::Choice => choice_value(raw),
        FieldType::Address => address_value(raw),
        FieldType::Media => media_value(raw),
        FieldType::Number => number_value(raw),
        FieldType::Date => date_value(raw),
        FieldType::Time => time_value(raw),
    };

    converted
        .map_err(|detail| errors::invalid_record_value_error(record_id, &column.data_name, &detail))
}

/// Normalizes an RFC 3339 timestamp to UTC.
pub(crate) fn timestamp_value(
    raw: Option<&str>,
    record_id: &str,
    field: &str,
) -> Result<Value, SyncError> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(Value::Null);
    };

    DateTime::parse_from_rfc3339(raw.trim())
        .map(|parsed| {
            Value::Text(
                parsed
                    .with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )
        })
        .map_err(|err| {
            errors::invalid_record_value_error(
                record_id,
                field,
                &format!("`{raw}` is not an RFC 3339 timestamp: {err}"),
            )
        })
}

fn text_value(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::String(text) => Ok(Value::Text(text.clone())),
        JsonValue::Number(number) => Ok(Value::Text(number.to_string())),
        JsonValue::Bool(flag) => Ok(Value::Text(flag.to_string())),
        other => Err(format!("expected a text value, got {}", json_kind(other))),
    }
}

fn choice_value(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::String(code) => Ok(Value::Text(code.clone())),
        JsonValue::Array(codes) => joined(string_items(codes)?),
        JsonValue::Object(choice) => {
            let mut codes = Vec::new();
            for field in ["choice_values", "other_values"] {
                match choice.get(field) {
                    None | Some(JsonValue::Null) => {}
                    Some(JsonValue::Array(values)) => codes.extend(string_items(values)?),
                    Some(other) => {
                        return Err(format!("`{field}` must be an array, got {}", json_kind(other)))
                    }
                }
            }
            joined(codes)
        }
        other => Err(format!("expected a choice value, got {}", json_kind(other))),
    }
}

fn address_value(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::String(text) => Ok(Value::Text(text.clone())),
        JsonValue::Object(parts) => {
            let text = ADDRESS_PARTS
                .iter()
                .filter_map(|part| parts.get(*part).and_then(JsonValue::as_str))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::Text(text))
            }
        }
        other => Err(format!("expected an address, got {}", json_kind(other))),
    }
}

/// Photos, videos, signatures and record links are stored as their ids.
fn media_value(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::String(id) => Ok(Value::Text(id.clone())),
        JsonValue::Object(item) => joined(media_id(item).into_iter().collect()),
        JsonValue::Array(items) => {
            let mut ids = Vec::new();
            for item in items {
                match item {
                    JsonValue::Object(item) => ids.extend(media_id(item)),
                    JsonValue::String(id) => ids.push(id.clone()),
                    other => {
                        return Err(format!("expected media items, got {}", json_kind(other)))
                    }
                }
            }
            joined(ids)
        }
        other => Err(format!("expected media items, got {}", json_kind(other))),
    }
}

fn media_id(item: &Map<String, JsonValue>) -> Option<String> {
    item.iter()
        .filter(|(key, _)| key.ends_with("_id"))
        .find_map(|(_, value)| value.as_str().map(str::to_string))
}

fn number_value(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::Number(number) => number
            .as_f64()
            .map(Value::Real)
            .ok_or_else(|| format!("`{number}` is not representable as a number")),
        JsonValue::String(text) if text.trim().is_empty() => Ok(Value::Null),
        JsonValue::String(text) => match text.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(Value::Real(number)),
            _ => Err(format!("`{text}` is not a number")),
        },
        other => Err(format!("expected a number, got {}", json_kind(other))),
    }
}

fn date_value(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::String(text) if text.trim().is_empty() => Ok(Value::Null),
        JsonValue::String(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(|date| Value::Text(date.format("%Y-%m-%d").to_string()))
            .map_err(|err| format!("`{text}` is not a YYYY-MM-DD date: {err}")),
        other => Err(format!("expected a date, got {}", json_kind(other))),
    }
}

fn time_value(raw: &JsonValue) -> Result<Value, String> {
    match raw {
        JsonValue::String(text) if text.trim().is_empty() => Ok(Value::Null),
        JsonValue::String(text) => NaiveTime::parse_from_str(text.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(text.trim(), "%H:%M:%S"))
            .map(|time| Value::Text(time.format("%H:%M").to_string()))
            .map_err(|err| format!("`{text}` is not an HH:MM time: {err}")),
        other => Err(format!("expected a time, got {}", json_kind(other))),
    }
}

fn string_items(values: &[JsonValue]) -> Result<Vec<String>, String> {
    values
        .iter()
        .map(|value| match value {
            JsonValue::String(text) => Ok(text.clone()),
            JsonValue::Number(number) => Ok(number.to_string()),
            other => Err(format!("expected text items, got {}", json_kind(other))),
        })
        .collect()
}

fn joined(values: Vec<String>) -> Result<Value, String> {
    if values.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Text(values.join(",")))
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
