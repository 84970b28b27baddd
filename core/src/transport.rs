//! Transport seam.
//!
//! The controller never performs I/O. It hands each request to a `Transport`
//! together with a `Ticket`; whoever executes the request later reports the
//! outcome through `Controller::complete(ticket, result)`, in any order.

use crate::request::RequestDescriptor;
use serde_json::Value;
use std::collections::VecDeque;
use thiserror::Error;

/// Identifies one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Why a request produced no usable response body.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Outbound side of the engine.
pub trait Transport {
    /// Start a request. The transport must eventually report back through
    /// `Controller::complete` with the same ticket, or never.
    fn dispatch(&mut self, ticket: Ticket, request: RequestDescriptor);
}

/// A dispatched request waiting to be executed.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub ticket: Ticket,
    pub request: RequestDescriptor,
}

/// Transport that only records dispatches.
///
/// The host drains `pending` in FIFO order, performs the I/O and completes
/// the tickets. `history` keeps every request ever dispatched.
#[derive(Debug, Default)]
pub struct QueuedTransport {
    pending: VecDeque<Dispatched>,
    history: Vec<RequestDescriptor>,
}

impl QueuedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest pending request.
    pub fn pop(&mut self) -> Option<Dispatched> {
        self.pending.pop_front()
    }

    /// Take every pending request.
    pub fn drain(&mut self) -> Vec<Dispatched> {
        self.pending.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Every request dispatched so far, oldest first.
    pub fn requests(&self) -> &[RequestDescriptor] {
        &self.history
    }

    pub fn last_request(&self) -> Option<&RequestDescriptor> {
        self.history.last()
    }
}

impl Transport for QueuedTransport {
    fn dispatch(&mut self, ticket: Ticket, request: RequestDescriptor) {
        self.history.push(request.clone());
        self.pending.push_back(Dispatched { ticket, request });
    }
}

/// Successful response body.
pub type ResponseBody = Value;
