//! HTTP front end for the suggestions query engine.
//!
//! `suggestions_core` owns the query state machine and never performs I/O.
//! This crate adds:
//! - `SuggestionsConfig`: engine options plus transport settings, loaded from TOML
//! - `HttpTransport`: executes engine requests with a blocking `reqwest` client
//! - `Autocomplete`: a cooperative driver joining the two
//! - `logging`: tracing subscriber setup for the binary

pub mod config;
pub mod driver;
pub mod http;
pub mod logging;

pub use config::SuggestionsConfig;
pub use driver::Autocomplete;
pub use http::HttpTransport;

pub use suggestions_core::{
    Completion, Controller, EngineError, Options, RenderContext, Suggestion, TransportError,
};
