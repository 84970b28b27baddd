//! Response normalizer.
//!
//! Expected wire format: `{ "suggestions": [ entry, ... ] }` where each entry
//! is either a bare string or an object with `value` and optional `data` /
//! `unrestricted_value`. A bare top-level array is accepted as well.
//!
//! Order is preserved exactly; nothing is sorted, deduplicated or filtered
//! except entries of an unknown shape, which are dropped one by one.

use crate::suggestion::Suggestion;
use serde_json::Value;

/// Normalize a raw response body into suggestions.
///
/// With `allow_free_text`, a trailing `unrestricted` entry carrying `query` is
/// appended when no source value equals the query.
pub fn normalize(raw: &Value, query: &str, allow_free_text: bool) -> Vec<Suggestion> {
    let entries = match raw {
        Value::Object(obj) => match obj.get("suggestions") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => &[],
        },
        Value::Array(entries) => entries.as_slice(),
        _ => &[],
    };

    let mut suggestions = normalize_entries(entries);

    if allow_free_text && !query.is_empty() && !suggestions.iter().any(|s| s.value == query) {
        suggestions.push(Suggestion::free_text(query));
    }
    suggestions
}

/// Normalize a slice of raw entries, skipping malformed ones.
pub fn normalize_entries(entries: &[Value]) -> Vec<Suggestion> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let suggestion = normalize_entry(entry);
            if suggestion.is_none() {
                tracing::warn!(index, entry = %entry, "dropping malformed suggestion entry");
            }
            suggestion
        })
        .collect()
}

fn normalize_entry(entry: &Value) -> Option<Suggestion> {
    match entry {
        Value::String(value) => Some(Suggestion::new(value.as_str(), Value::Null)),
        Value::Object(obj) => {
            let value = obj.get("value")?.as_str()?;
            let data = obj.get("data").cloned().unwrap_or(Value::Null);
            let mut suggestion = Suggestion::new(value, data);
            if let Some(full) = obj.get("unrestricted_value").and_then(Value::as_str) {
                suggestion.unrestricted_value = full.to_string();
            }
            Some(suggestion)
        }
        _ => None,
    }
}
