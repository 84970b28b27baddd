//! Query state owned by the controller.

use crate::suggestion::{Suggestion, SuggestionList};

/// Where the controller is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No pending timer, no authoritative request
    #[default]
    Idle,
    /// Debounce timer armed for the latest input
    Debouncing,
    /// Latest input extends a known-empty root; no request was sent
    Suppressed,
    /// Request sent for the live text, waiting for its completion
    AwaitingResponse,
    /// Suggestions for the live text are visible
    Displaying,
    /// Engine disposed; every call is rejected
    Disposed,
}

/// Observable query state: live value, visibility and suggestions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    /// Live field value
    pub current_value: String,

    /// Whether the suggestion list should be shown
    pub visible: bool,

    /// Suggestions for `current_value` plus the selection
    pub suggestions: SuggestionList,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        self.suggestions.suggestions()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.suggestions.selected_index()
    }

    /// Drop suggestions and hide, keeping the live value.
    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.visible = false;
    }

    /// Replace suggestions; visible iff there is at least one.
    pub fn set_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.visible = !suggestions.is_empty();
        self.suggestions.set_suggestions(suggestions);
    }

    /// Reset everything, including the live value.
    pub fn clear(&mut self) {
        self.current_value.clear();
        self.clear_suggestions();
    }
}
