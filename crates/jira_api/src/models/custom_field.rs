//! Custom-field extraction from a raw `GET /issue/{id}` payload.
//!
//! Every `customfield_*` entry is flattened to text. Composite values are
//! printed the way Go's `%v` verb prints decoded JSON (`[a b]`, `map[k:v]`,
//! `<nil>`), which is the format downstream consumers such as the sprint
//! descriptor parser were written against.

use serde_json::{Map, Value};
use std::collections::HashMap;

pub const CUSTOM_FIELD_PREFIX: &str = "customfield";

pub type CustomFields = HashMap<String, String>;

/// Collects the textual form of every custom field found under `fields`.
pub fn extract_custom_fields(issue: &Value) -> CustomFields {
    let Some(fields) = issue.get("fields").and_then(Value::as_object) else {
        return CustomFields::new();
    };
    fields
        .iter()
        .filter(|(key, _)| key.starts_with(CUSTOM_FIELD_PREFIX))
        .map(|(key, value)| (key.clone(), render_field_value(value)))
        .collect()
}

pub fn render_field_value(value: &Value) -> String {
    match value {
        Value::Null => "<nil>".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => render_number(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => {
            let inner = items
                .iter()
                .map(render_field_value)
                .collect::<Vec<_>>()
                .join(" ");
            format!("[{inner}]")
        }
        Value::Object(map) => render_map(map),
    }
}

fn render_number(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    match number.as_f64() {
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

fn render_map(map: &Map<String, Value>) -> String {
    let mut keys = map.keys().collect::<Vec<_>>();
    keys.sort();
    let inner = keys
        .into_iter()
        .map(|key| format!("{key}:{}", render_field_value(&map[key])))
        .collect::<Vec<_>>()
        .join(" ");
    format!("map[{inner}]")
}
