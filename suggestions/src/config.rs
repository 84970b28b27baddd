//! Front-end configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use suggestions_core::Options;

/// HTTP front-end configuration that extends the engine `Options`.
///
/// This configuration includes:
/// - All engine options from `suggestions_core::Options` (flattened via serde)
/// - Transport settings (timeout, user agent)
///
/// # Example
///
/// ```rust
/// use suggestions::SuggestionsConfig;
///
/// let config = SuggestionsConfig::from_toml_str(r#"
///     service_url = "https://example.com/suggest"
///     type = "ADDRESS"
///     timeout_ms = 1500
/// "#).unwrap();
/// assert_eq!(config.base().kind, "ADDRESS");
/// assert_eq!(config.timeout_ms, 1500);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    /// Engine options (service url, type, params, bounds, ...)
    #[serde(flatten)]
    pub base: Options,

    /// Per-request timeout
    pub timeout_ms: u64,

    /// `User-Agent` sent by the HTTP client
    pub user_agent: String,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            base: Options::default(),
            timeout_ms: 3000,
            user_agent: format!("suggestions/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SuggestionsConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Convert into the engine options for `Controller::new()`
    pub fn into_base(self) -> Options {
        self.base
    }

    /// Get a reference to the engine options
    pub fn base(&self) -> &Options {
        &self.base
    }

    /// Get a mutable reference to the engine options
    pub fn base_mut(&mut self) -> &mut Options {
        &mut self.base
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
