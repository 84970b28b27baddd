//! Bounds codec.
//!
//! A bounds spec restricts the granularity of suggestions, e.g. `"city-street"`
//! asks for results between the city and street levels. Accepted forms:
//!
//! - `"A-B"` - from A to B
//! - `"A-"`  - from A, open upper bound
//! - `"-B"`  - up to B, open lower bound
//! - `"A"`   - exactly A (from = to = A)
//!
//! Anything else (empty, several hyphens, inner whitespace) yields no bounds.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

static BOUNDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\s-]*)(-([^\s-]*))?$").expect("valid bounds regex"));

/// Request field carrying the lower bound.
pub const FROM_BOUND: &str = "from_bound";
/// Request field carrying the upper bound.
pub const TO_BOUND: &str = "to_bound";

/// Parsed `from`/`to` bounds. A `None` side is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundSpec {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl BoundSpec {
    /// Parse a bounds spec. Returns `None` when the spec is empty or malformed.
    pub fn parse(spec: &str) -> Option<Self> {
        let caps = BOUNDS_RE.captures(spec.trim())?;
        let left = caps.get(1).map(|m| m.as_str()).unwrap_or("");

        let bounds = if caps.get(2).is_some() {
            let right = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            BoundSpec {
                from: non_empty(left),
                to: non_empty(right),
            }
        } else {
            BoundSpec {
                from: non_empty(left),
                to: non_empty(left),
            }
        };

        if bounds.is_open() {
            None
        } else {
            Some(bounds)
        }
    }

    /// True when neither side is set.
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Write `from_bound`/`to_bound` into request params.
    ///
    /// An open side omits its field entirely.
    pub fn apply_to(&self, params: &mut Map<String, Value>) {
        if let Some(from) = &self.from {
            params.insert(FROM_BOUND.to_string(), json!({ "value": from }));
        }
        if let Some(to) = &self.to {
            params.insert(TO_BOUND.to_string(), json!({ "value": to }));
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
