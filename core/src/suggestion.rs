//! Suggestion types.
//!
//! This module provides:
//! - `Suggestion`: A normalized suggestion record
//! - `SuggestionList`: Ordered suggestions with the current selection

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single normalized suggestion.
///
/// `data` is the opaque payload from the source (`Null` when absent).
/// `unrestricted_value` is the full form of `value` as reported by the source,
/// falling back to `value` itself. `unrestricted` marks an entry synthesized
/// from free text the source did not recognize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: String,
    pub unrestricted_value: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unrestricted: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Suggestion {
    pub fn new<T: Into<String>>(value: T, data: Value) -> Self {
        let value = value.into();
        Suggestion {
            unrestricted_value: value.clone(),
            value,
            data,
            unrestricted: false,
        }
    }

    /// Entry built from user-entered text the source did not return.
    pub fn free_text<T: Into<String>>(value: T) -> Self {
        Suggestion {
            unrestricted: true,
            ..Suggestion::new(value, Value::Null)
        }
    }
}

/// Ordered suggestions plus the selected index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionList {
    suggestions: Vec<Suggestion>,
    selected: Option<usize>,
}

impl SuggestionList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the suggestions, resetting the selection.
    pub fn set_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
        self.selected = None;
    }

    /// Get all suggestions.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn get(&self, index: usize) -> Option<&Suggestion> {
        self.suggestions.get(index)
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Index of the selected suggestion, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Select a suggestion by index.
    /// Returns the selected suggestion if the index is valid.
    pub fn select(&mut self, index: usize) -> Option<&Suggestion> {
        if index < self.suggestions.len() {
            self.selected = Some(index);
            self.suggestions.get(index)
        } else {
            None
        }
    }

    /// Clear the list.
    pub fn clear(&mut self) {
        self.suggestions.clear();
        self.selected = None;
    }
}
