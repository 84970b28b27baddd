//! Cooperative driver joining the controller with the HTTP transport.
//!
//! Everything runs on the caller's thread: value changes go into the
//! controller, `pump()` fires a due debounce timer and executes whatever the
//! controller queued, completing each ticket as its response comes back.

use crate::config::SuggestionsConfig;
use crate::http::HttpTransport;
use std::time::Instant;
use suggestions_core::{
    Completion, Controller, EngineError, Options, QueuedTransport, RenderContext, Suggestion,
};

/// An autocomplete session over HTTP.
pub struct Autocomplete {
    controller: Controller<QueuedTransport>,
    http: HttpTransport,
}

impl Autocomplete {
    pub fn new(config: SuggestionsConfig) -> anyhow::Result<Self> {
        let http = HttpTransport::new(config.timeout(), &config.user_agent)?;
        Ok(Self::with_transport(config.into_base(), http))
    }

    pub fn with_transport(options: Options, http: HttpTransport) -> Self {
        Self {
            controller: Controller::new(options, QueuedTransport::new()),
            http,
        }
    }

    pub fn controller(&self) -> &Controller<QueuedTransport> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<QueuedTransport> {
        &mut self.controller
    }

    pub fn context(&self) -> &RenderContext {
        self.controller.context()
    }

    /// Feed a new field value and run any resulting requests.
    pub fn input(&mut self, text: &str) -> Result<Vec<Completion>, EngineError> {
        self.controller.on_value_change(text, Instant::now())?;
        self.pump()
    }

    /// Fire a due timer, then execute queued requests in dispatch order.
    pub fn pump(&mut self) -> Result<Vec<Completion>, EngineError> {
        self.controller.poll_timer(Instant::now())?;

        let mut completions = Vec::new();
        while let Some(sent) = self.controller.transport_mut().pop() {
            let result = self.http.execute(&sent.request);
            completions.push(self.controller.complete(sent.ticket, result));
        }
        Ok(completions)
    }

    /// Block until a pending debounce timer fires, then run its request.
    pub fn settle(&mut self) -> Result<Vec<Completion>, EngineError> {
        if let Some(deadline) = self.controller.timer_deadline() {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
        }
        self.pump()
    }

    pub fn select(&mut self, index: usize) -> Result<Suggestion, EngineError> {
        self.controller.select(index)
    }

    pub fn dismiss(&mut self) -> Result<(), EngineError> {
        self.controller.dismiss()
    }

    pub fn dispose(&mut self) {
        self.controller.dispose();
    }
}
