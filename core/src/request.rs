//! Request builder.
//!
//! Turns the current query and `Options` into a `RequestDescriptor`. The
//! descriptor is built fresh for every request and owns all of its data, so
//! later option changes never reach a request that is already in flight.

use crate::bounds::BoundSpec;
use crate::Options;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Engine build version, sent in `X-Version`.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header identifying the engine version.
pub const VERSION_HEADER: &str = "X-Version";

/// Wire protocol revision sent in every request body.
pub const PROTOCOL_VERSION: u32 = 1;

/// Body key for the lookup type.
pub const TYPE_FIELD: &str = "type";
/// Body key for the requested suggestion count.
pub const COUNT_FIELD: &str = "count";
/// Body key for the protocol revision.
pub const PROTOCOL_FIELD: &str = "protocol_version";

/// HTTP method used for suggestion requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Post,
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Get => "GET",
        }
    }
}

/// Extra request parameters.
///
/// `Static` maps come from configuration; a `Provider` is invoked once per
/// request so parameters can follow external state.
#[derive(Clone)]
pub enum Params {
    Static(Map<String, Value>),
    Provider(Rc<dyn Fn() -> Map<String, Value>>),
}

impl Params {
    /// Resolve to a concrete map for one request.
    pub fn resolve(&self) -> Map<String, Value> {
        match self {
            Params::Static(map) => map.clone(),
            Params::Provider(provider) => provider(),
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::Static(Map::new())
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Params::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Params::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

// Providers have no serialized form; they serialize as an empty table.
impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Params::Static(map) => map.serialize(serializer),
            Params::Provider(_) => Map::new().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Params::Static)
    }
}

/// A fully assembled request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    /// Body fields in insertion order: caller params first, engine fields after
    pub params: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Build the request for `query` under `options`.
    ///
    /// Merge order: caller params, then the engine-owned fields (query, type,
    /// count, protocol revision, bounds), so engine fields win on key
    /// collisions. Headers follow the same rule for `X-Version`.
    pub fn build(query: &str, options: &Options) -> Self {
        let mut params = options.params.resolve();

        params.insert(options.param_name.clone(), Value::from(query));
        params.insert(TYPE_FIELD.to_string(), Value::from(options.kind.as_str()));
        params.insert(COUNT_FIELD.to_string(), Value::from(options.count));
        params.insert(PROTOCOL_FIELD.to_string(), Value::from(PROTOCOL_VERSION));

        if let Some(bounds) = options.bounds.as_deref().and_then(BoundSpec::parse) {
            bounds.apply_to(&mut params);
        }

        Self {
            url: options.service_url.clone(),
            method: options.method,
            params,
            headers: build_headers(options),
        }
    }

    /// JSON body for POST requests; GET requests carry no body.
    pub fn body(&self) -> Option<String> {
        match self.method {
            Method::Post => Some(Value::Object(self.params.clone()).to_string()),
            Method::Get => None,
        }
    }

    /// Params flattened to string pairs for a query string.
    ///
    /// Strings are sent verbatim, every other value as compact JSON.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }

    /// Identity of this request for the response cache.
    pub fn cache_key(&self) -> String {
        format!(
            "{} {} {}",
            self.method.as_str(),
            self.url,
            Value::Object(self.params.clone())
        )
    }

    /// Look up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn build_headers(options: &Options) -> BTreeMap<String, String> {
    let mut engine_headers = vec![(VERSION_HEADER, ENGINE_VERSION)];
    if options.method == Method::Post {
        engine_headers.push(("Content-Type", "application/json"));
    }

    let mut headers: BTreeMap<String, String> = options
        .headers
        .iter()
        .filter(|(name, _)| {
            !engine_headers
                .iter()
                .any(|(owned, _)| owned.eq_ignore_ascii_case(name))
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    for (name, value) in engine_headers {
        headers.insert(name.to_string(), value.to_string());
    }
    headers
}
