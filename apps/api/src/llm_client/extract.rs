//! Tolerant JSON extraction from free-form model output.

use serde_json::{Map, Value};
use tracing::debug;

/// Decodes the first brace-delimited JSON object found in `text`.
///
/// The candidate runs from the first `{` to the last `}`, so commentary or code
/// fences around the object are ignored. Missing braces, malformed JSON and
/// non-object values all yield an empty map.
pub fn extract_json_object(text: &str) -> Map<String, Value> {
    let Some(start) = text.find('{') else {
        return Map::new();
    };
    let Some(end) = text.rfind('}') else {
        return Map::new();
    };
    if end < start {
        return Map::new();
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            debug!("Model output held no decodable JSON object: {e}");
            Map::new()
        }
    }
}

/// Reads `key` as a list of non-blank strings. Non-string items are dropped;
/// a missing or non-array value is an empty list.
pub fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
