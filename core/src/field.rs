//! Host input field model.
//!
//! The controller keeps its own copy of the attached field's value; this is
//! the "live" text every response is checked against.

/// Text of the attached input field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputField {
    text: String,
}

impl InputField {
    /// Create a new empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the field text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole value.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }
}
