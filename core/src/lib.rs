//! suggestions-core
//!
//! Suggestion query engine shared by front ends (the HTTP client in
//! `suggestions`, or any host that owns a text field and a transport).
//!
//! The engine is sans-IO: it decides when to query, what to send and how to
//! reconcile responses, while the host performs the actual network calls and
//! rendering.
//!
//! Public API:
//! - `Controller` - The query state machine driven by value-change events
//! - `RequestDescriptor` - Serializable request built per query
//! - `BoundSpec` - Parsed `from`/`to` bounds
//! - `BadQueryCache` - Prefix set of queries known to return nothing
//! - `Suggestion` - Normalized suggestion record
//! - `Options` - Configuration and callbacks
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub mod bounds;
pub use bounds::BoundSpec;

pub mod request;
pub use request::{Method, Params, RequestDescriptor, ENGINE_VERSION, VERSION_HEADER};

pub mod trie;
pub use trie::PrefixTrie;

pub mod bad_query;
pub use bad_query::BadQueryCache;

pub mod suggestion;
pub use suggestion::{Suggestion, SuggestionList};

pub mod normalize;

pub mod field;
pub use field::InputField;

pub mod session;
pub use session::{Phase, QueryState};

pub mod context;
pub use context::{Container, RenderContext};

pub mod debounce;
pub use debounce::Debouncer;

pub mod transport;
pub use transport::{Dispatched, QueuedTransport, Ticket, Transport, TransportError};

pub mod error;
pub use error::EngineError;

pub mod controller;
pub use controller::{Completion, Controller, SuggestionsObserver};

/// Hint shown above the list when no custom hint is configured.
pub const DEFAULT_HINT: &str = "Select an option or continue typing";

/// Callback slot stored inside `Options`.
///
/// Engines are single-threaded, so hooks are reference counted with `Rc`
/// and cloned together with the options that carry them.
pub struct Hook<F: ?Sized>(pub Rc<F>);

impl<F: ?Sized> Hook<F> {
    pub fn get(&self) -> &F {
        &self.0
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        Hook(Rc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

pub type SelectHook = Hook<dyn Fn(&Suggestion)>;
pub type BeforeRenderHook = Hook<dyn Fn(&Container)>;
pub type SearchStartHook = Hook<dyn Fn(&RequestDescriptor)>;
pub type SearchCompleteHook = Hook<dyn Fn(&str, &[Suggestion])>;
pub type SearchErrorHook = Hook<dyn Fn(&str, &TransportError)>;

/// Engine configuration.
///
/// Plain data fields round-trip through TOML; callable fields are skipped by
/// serde and installed with the builder methods (`on_select`, `before_render`,
/// ...). Changing options on a live controller only affects future requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
    /// Endpoint the requests are sent to
    pub service_url: String,

    /// Lookup/category type sent with every request (e.g. "NAME", "ADDRESS")
    #[serde(rename = "type")]
    pub kind: String,

    /// Body key carrying the query text
    pub param_name: String,

    /// Extra request parameters: a static map or a per-request provider
    pub params: Params,

    /// Range spec such as "city-street", "city-" or "city"
    pub bounds: Option<String>,

    /// Caller-supplied headers; engine-owned headers win on collision
    pub headers: BTreeMap<String, String>,

    /// Hint displayed above the suggestions, `None` disables it
    pub hint: Option<String>,

    /// Suppress requests for queries extending a root that returned nothing
    pub prevent_bad_queries: bool,

    /// Minimum query length (in chars) that triggers a request
    pub min_chars: usize,

    /// Debounce delay; 0 dispatches synchronously on value change
    pub defer_request_by_ms: u64,

    /// POST sends a JSON body, GET a url-encoded query string
    pub method: Method,

    /// Maximum number of suggestions requested from the source
    pub count: usize,

    // Response cache
    /// Disable the request -> suggestions cache
    pub no_cache: bool,
    /// Maximum number of cached responses
    pub max_cache_size: usize,

    /// Append a free-text entry flagged `unrestricted` when the typed query
    /// matches none of the source values
    pub allow_free_text: bool,

    #[serde(skip)]
    pub on_select: Option<SelectHook>,
    #[serde(skip)]
    pub before_render: Option<BeforeRenderHook>,
    #[serde(skip)]
    pub on_search_start: Option<SearchStartHook>,
    #[serde(skip)]
    pub on_search_complete: Option<SearchCompleteHook>,
    #[serde(skip)]
    pub on_search_error: Option<SearchErrorHook>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            kind: String::new(),
            param_name: "query".to_string(),
            params: Params::default(),
            bounds: None,
            headers: BTreeMap::new(),
            hint: Some(DEFAULT_HINT.to_string()),
            prevent_bad_queries: false,
            min_chars: 1,
            defer_request_by_ms: 0,
            method: Method::Post,
            count: 10,
            no_cache: false,
            max_cache_size: 100,
            allow_free_text: false,
            on_select: None,
            before_render: None,
            on_search_start: None,
            on_search_complete: None,
            on_search_error: None,
        }
    }
}

impl Options {
    /// Options for a service URL and lookup type, everything else defaulted.
    pub fn new(service_url: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Load options from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: Options = toml::from_str(&content)?;
        Ok(options)
    }

    /// Save options to a TOML file. Callables are not persisted.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load options from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize options to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ========== Builder-style setters for callable fields ==========

    /// Use a provider evaluated on every request instead of static params.
    pub fn params_fn(
        mut self,
        provider: impl Fn() -> serde_json::Map<String, serde_json::Value> + 'static,
    ) -> Self {
        self.params = Params::Provider(Rc::new(provider));
        self
    }

    pub fn on_select(mut self, f: impl Fn(&Suggestion) + 'static) -> Self {
        self.on_select = Some(Hook(Rc::new(f)));
        self
    }

    pub fn before_render(mut self, f: impl Fn(&Container) + 'static) -> Self {
        self.before_render = Some(Hook(Rc::new(f)));
        self
    }

    pub fn on_search_start(mut self, f: impl Fn(&RequestDescriptor) + 'static) -> Self {
        self.on_search_start = Some(Hook(Rc::new(f)));
        self
    }

    pub fn on_search_complete(mut self, f: impl Fn(&str, &[Suggestion]) + 'static) -> Self {
        self.on_search_complete = Some(Hook(Rc::new(f)));
        self
    }

    pub fn on_search_error(mut self, f: impl Fn(&str, &TransportError) + 'static) -> Self {
        self.on_search_error = Some(Hook(Rc::new(f)));
        self
    }

    /// Debounce delay as a `Duration`.
    pub fn defer_request_by(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.defer_request_by_ms)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    ///
    /// Queries are normalized before they are sent and before they are
    /// compared against the bad-query roots.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.param_name, "query");
        assert_eq!(options.min_chars, 1);
        assert_eq!(options.hint.as_deref(), Some(DEFAULT_HINT));
        assert!(!options.prevent_bad_queries);
        assert_eq!(options.method, Method::Post);
    }

    #[test]
    fn test_options_from_toml() {
        let options = Options::from_toml_str(
            r#"
            service_url = "https://example.com/suggest"
            type = "ADDRESS"
            param_name = "q"
            bounds = "city-street"
            prevent_bad_queries = true
            defer_request_by_ms = 150

            [params]
            locale = "en"

            [headers]
            Authorization = "Token abc"
            "#,
        )
        .unwrap();

        assert_eq!(options.service_url, "https://example.com/suggest");
        assert_eq!(options.kind, "ADDRESS");
        assert_eq!(options.param_name, "q");
        assert_eq!(options.bounds.as_deref(), Some("city-street"));
        assert!(options.prevent_bad_queries);
        assert_eq!(options.defer_request_by_ms, 150);
        assert_eq!(options.headers["Authorization"], "Token abc");
        match &options.params {
            Params::Static(map) => assert_eq!(map["locale"], "en"),
            Params::Provider(_) => panic!("expected static params"),
        }
        // untouched fields keep their defaults
        assert_eq!(options.count, 10);
    }

    #[test]
    fn test_options_toml_round_trip_skips_callables() {
        let options = Options::new("/some/url", "NAME").on_select(|_| {});
        let text = options.to_toml_string().unwrap();
        let parsed = Options::from_toml_str(&text).unwrap();
        assert_eq!(parsed.service_url, "/some/url");
        assert_eq!(parsed.kind, "NAME");
        assert!(parsed.on_select.is_none());
    }

    #[test]
    fn test_save_and_load_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "suggestions_options_{}.toml",
            std::process::id()
        ));
        let mut options = Options::new("https://example.com/suggest", "ADDRESS");
        options.bounds = Some("city-".to_string());
        options.save_toml(&path).unwrap();

        let loaded = Options::load_toml(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.kind, "ADDRESS");
        assert_eq!(loaded.bounds.as_deref(), Some("city-"));
    }

    #[test]
    fn test_normalize_trims_and_composes() {
        assert_eq!(utils::normalize("  Jam "), "Jam");
        // "e" + combining acute -> precomposed
        assert_eq!(utils::normalize("Caf\u{0065}\u{0301}"), "Caf\u{00e9}");
    }
}
