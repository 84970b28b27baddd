//! Render context for the external renderer.
//!
//! The `RenderContext` struct is a plain data container. After every call into
//! the controller the renderer reads these fields to draw (or hide) the
//! dropdown; it holds no decision logic of its own.

use crate::session::QueryState;
use crate::suggestion::Suggestion;
use std::sync::atomic::{AtomicU64, Ordering};

/// CSS class of the suggestions container.
pub const CONTAINER_CLASS: &str = "suggestions-suggestions";

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Rendering target owned by one engine instance.
///
/// Passed to `before_render` so hooks can decorate the surface before the
/// suggestions are drawn into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub class: &'static str,
}

impl Container {
    /// Allocate a container with a process-unique id.
    pub fn allocate() -> Self {
        let n = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("suggestions-container-{n}"),
            class: CONTAINER_CLASS,
        }
    }
}

/// Everything the renderer needs for one frame.
///
/// # Fields
///
/// - `visible`: whether the dropdown is shown
/// - `suggestions`: ordered list to draw
/// - `selected_index`: highlighted entry, if any
/// - `hint`: text above the list (only while visible)
/// - `current_value`: live field value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    pub visible: bool,
    pub suggestions: Vec<Suggestion>,
    pub selected_index: Option<usize>,
    pub hint: Option<String>,
    pub current_value: String,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from query state. Empty hints count as disabled.
    pub fn sync_from(&mut self, state: &QueryState, hint: Option<&str>) {
        self.visible = state.visible;
        self.suggestions = state.suggestions().to_vec();
        self.selected_index = state.selected_index();
        self.current_value = state.current_value.clone();
        self.hint = if state.visible {
            hint.filter(|h| !h.is_empty()).map(str::to_string)
        } else {
            None
        };
    }

    pub fn clear(&mut self) {
        self.visible = false;
        self.suggestions.clear();
        self.selected_index = None;
        self.hint = None;
        self.current_value.clear();
    }
}
