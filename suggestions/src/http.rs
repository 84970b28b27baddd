//! HTTP execution of engine requests.
//!
//! Uses the `reqwest` blocking client: the engine is single-threaded, so the
//! driver executes queued requests one at a time and feeds each outcome back
//! into the controller.
//!
//! Request format:
//! - POST: JSON body with the request params, headers as built by the engine
//! - GET: params url-encoded into the query string
//!
//! Expected response format:
//! JSON object: `{"suggestions": [{"value": "...", "data": ...} | "...", ...]}`

use serde_json::Value;
use std::time::Duration;
use suggestions_core::{Method, RequestDescriptor, TransportError};

/// Executes `RequestDescriptor`s over HTTP.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Convert a descriptor into a ready-to-send `reqwest` request.
    pub fn to_request(
        &self,
        request: &RequestDescriptor,
    ) -> Result<reqwest::blocking::Request, TransportError> {
        let builder = match request.method {
            Method::Post => {
                let body = request.body().unwrap_or_default();
                self.client.post(&request.url).body(body)
            }
            Method::Get => self.client.get(get_url(request)),
        };

        let builder = request
            .headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));

        builder
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))
    }

    /// Execute a request and return the decoded JSON body.
    pub fn execute(&self, request: &RequestDescriptor) -> Result<Value, TransportError> {
        let http_request = self.to_request(request)?;
        let response = self.client.execute(http_request).map_err(map_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let text = response.text().map_err(map_error)?;
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// URL with the params appended as a query string.
pub fn get_url(request: &RequestDescriptor) -> String {
    let query = request
        .query_pairs()
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        request.url.clone()
    } else if request.url.contains('?') {
        format!("{}&{}", request.url, query)
    } else {
        format!("{}?{}", request.url, query)
    }
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}
