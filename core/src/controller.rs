//! Query controller.
//!
//! The `Controller` ties the engine together: it receives value-change events
//! from the host field, debounces them, consults the bad-query cache, builds
//! requests and hands them to a `Transport`. Completions come back through
//! `complete()`, where stale responses are dropped and the query state,
//! render context and callbacks are updated.
//!
//! Every dispatched request is tagged with the exact field text it was built
//! for. A completion is applied only if it answers the most recent dispatch
//! and that text is still the live value, which stands in for aborting
//! superseded requests.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use serde_json::json;
//! use suggestions_core::{Controller, Options, QueuedTransport};
//!
//! let mut engine = Controller::new(Options::new("/suggest", "NAME"), QueuedTransport::new());
//! engine.on_value_change("Jam", Instant::now()).unwrap();
//!
//! let sent = engine.transport_mut().pop().unwrap();
//! engine.complete(sent.ticket, Ok(json!({ "suggestions": [{ "value": "Jamaica", "data": "B" }] })));
//!
//! assert!(engine.state().visible);
//! assert_eq!(engine.state().suggestions()[0].value, "Jamaica");
//! ```

use crate::bad_query::BadQueryCache;
use crate::context::{Container, RenderContext};
use crate::debounce::Debouncer;
use crate::error::EngineError;
use crate::field::InputField;
use crate::normalize::normalize;
use crate::request::RequestDescriptor;
use crate::session::{Phase, QueryState};
use crate::suggestion::Suggestion;
use crate::transport::{ResponseBody, Ticket, Transport, TransportError};
use crate::{utils, Options};
use ahash::AHashMap;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, warn};

/// Receives rendering and selection notifications.
///
/// All methods default to no-ops so renderers implement only what they draw.
pub trait SuggestionsObserver {
    /// The render context changed (shown, hidden or new suggestions).
    fn on_suggestions_changed(&mut self, _context: &RenderContext) {}

    /// Suggestions are about to be drawn into `container`.
    fn on_before_render(&mut self, _container: &Container) {}

    /// A suggestion was selected.
    fn on_selected(&mut self, _suggestion: &Suggestion) {}
}

/// Outcome of `Controller::complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Response matched the live input and was applied
    Applied { count: usize },
    /// Response was superseded, stale, abandoned by `dispose`, or for an
    /// unknown ticket
    Discarded,
    /// Request for the live input failed; nothing was updated
    Failed,
}

#[derive(Debug)]
struct InFlight {
    /// Field text the request was built for and sent
    text: String,
    /// Normalized form of `text`
    query: String,
    cache_key: String,
}

/// The suggestion query state machine for one input field.
pub struct Controller<T: Transport> {
    options: Options,

    state: QueryState,
    phase: Phase,

    /// Attached host field; `None` once disposed
    field: Option<InputField>,

    debouncer: Debouncer,
    bad_queries: BadQueryCache,

    /// request cache key -> normalized suggestions
    responses: LruCache<String, Vec<Suggestion>>,

    in_flight: AHashMap<Ticket, InFlight>,
    /// The only dispatched request whose response may be applied
    current: Option<Ticket>,
    next_ticket: u64,

    transport: T,

    /// Snapshot for the renderer
    context: RenderContext,
    container: Option<Container>,
    observer: Option<Box<dyn SuggestionsObserver>>,
}

fn cache_capacity(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)
}

impl<T: Transport> Controller<T> {
    /// Create an engine attached to a fresh, empty field.
    pub fn new(options: Options, transport: T) -> Self {
        let container = Container::allocate();
        debug!(container = %container.id, "suggestions engine created");

        Self {
            bad_queries: BadQueryCache::new(options.prevent_bad_queries),
            responses: LruCache::new(cache_capacity(options.max_cache_size)),
            options,
            state: QueryState::new(),
            phase: Phase::Idle,
            field: Some(InputField::new()),
            debouncer: Debouncer::new(),
            in_flight: AHashMap::new(),
            current: None,
            next_ticket: 0,
            transport,
            context: RenderContext::new(),
            container: Some(container),
            observer: None,
        }
    }

    // ========== Accessors ==========

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Render snapshot, refreshed after every state change.
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Rendering target; `None` after dispose.
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    /// Attached field; `None` after dispose.
    pub fn field(&self) -> Option<&InputField> {
        self.field.as_ref()
    }

    pub fn bad_queries(&self) -> &BadQueryCache {
        &self.bad_queries
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Number of requests that have not completed yet (stale ones included).
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// When the pending debounce timer will fire.
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == Phase::Disposed
    }

    pub fn set_observer(&mut self, observer: Box<dyn SuggestionsObserver>) {
        self.observer = Some(observer);
    }

    // ========== Options ==========

    /// Replace the options. Requests already in flight keep the
    /// configuration they were built with.
    pub fn set_options(&mut self, options: Options) {
        self.bad_queries.set_enabled(options.prevent_bad_queries);
        if options.max_cache_size != self.options.max_cache_size {
            self.responses.resize(cache_capacity(options.max_cache_size));
        }
        self.options = options;
        debug!("options updated");
    }

    /// Apply a partial change to the current options.
    pub fn update_options(&mut self, update: impl FnOnce(&mut Options)) {
        let mut options = self.options.clone();
        update(&mut options);
        self.set_options(options);
    }

    // ========== Input ==========

    /// Process a new value of the host field.
    ///
    /// Cancels the pending timer. Too-short input clears the suggestions;
    /// otherwise the request is dispatched right away (no debounce configured)
    /// or the timer is re-armed.
    pub fn on_value_change(&mut self, text: &str, now: Instant) -> Result<(), EngineError> {
        let field = self.field.as_mut().ok_or(EngineError::Disposed)?;
        field.set_text(text);
        self.state.current_value = text.to_string();
        self.debouncer.cancel();

        let query = utils::normalize(text);
        if query.chars().count() < self.options.min_chars.max(1) {
            debug!(len = query.chars().count(), "query below minimum length");
            self.state.clear_suggestions();
            self.phase = Phase::Idle;
            self.publish();
            return Ok(());
        }

        let delay = self.options.defer_request_by();
        if delay.is_zero() {
            self.fire();
        } else {
            let generation = self.debouncer.arm(now, delay);
            debug!(generation, ?delay, "debounce armed");
            self.phase = Phase::Debouncing;
        }
        Ok(())
    }

    /// Fire the debounce timer if its deadline has passed.
    /// Returns whether it fired.
    pub fn poll_timer(&mut self, now: Instant) -> Result<bool, EngineError> {
        if self.field.is_none() {
            return Err(EngineError::Disposed);
        }
        if self.debouncer.fire_if_due(now) {
            self.fire();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Query for the live field text: suppress, serve from cache or dispatch.
    fn fire(&mut self) {
        let Some(field) = self.field.as_ref() else {
            return;
        };
        let text = field.text().to_string();
        let query = utils::normalize(&text);
        // whatever happens below supersedes the previous request
        self.current = None;

        if self.bad_queries.should_suppress(&query) {
            debug!(
                query = %query,
                roots = ?self.bad_queries.matching_roots(&query),
                "query suppressed by bad-query cache"
            );
            self.state.clear_suggestions();
            self.phase = Phase::Suppressed;
            self.publish();
            return;
        }

        let request = RequestDescriptor::build(&text, &self.options);
        let cache_key = request.cache_key();

        if !self.options.no_cache {
            if let Some(cached) = self.responses.get(&cache_key).cloned() {
                debug!(query = %query, "serving suggestions from response cache");
                self.apply(&text, cached);
                return;
            }
        }

        if let Some(hook) = &self.options.on_search_start {
            hook.get()(&request);
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        debug!(ticket = ticket.id(), query = %query, url = %request.url, "dispatching request");

        self.in_flight.insert(
            ticket,
            InFlight {
                text,
                query,
                cache_key,
            },
        );
        self.current = Some(ticket);
        self.transport.dispatch(ticket, request);
        self.phase = Phase::AwaitingResponse;
    }

    // ========== Responses ==========

    /// Report the outcome of a dispatched request.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<ResponseBody, TransportError>,
    ) -> Completion {
        let Some(flight) = self.in_flight.remove(&ticket) else {
            debug!(ticket = ticket.id(), "completion for unknown or abandoned request");
            return Completion::Discarded;
        };

        if self.current != Some(ticket) {
            debug!(ticket = ticket.id(), query = %flight.query, "discarding superseded response");
            return Completion::Discarded;
        }
        let is_live = self
            .field
            .as_ref()
            .is_some_and(|field| field.text() == flight.text);
        if !is_live {
            debug!(ticket = ticket.id(), query = %flight.query, "discarding stale response");
            return Completion::Discarded;
        }
        self.current = None;

        match result {
            Err(err) => {
                warn!(query = %flight.query, error = %err, "suggestion request failed");
                if let Some(hook) = &self.options.on_search_error {
                    hook.get()(&flight.text, &err);
                }
                if self.phase == Phase::AwaitingResponse {
                    self.phase = Phase::Idle;
                }
                Completion::Failed
            }
            Ok(body) => {
                let suggestions = normalize(&body, &flight.query, self.options.allow_free_text);
                let source_count = suggestions.iter().filter(|s| !s.unrestricted).count();
                self.bad_queries.record(&flight.query, source_count);

                if !self.options.no_cache {
                    self.responses.put(flight.cache_key, suggestions.clone());
                }

                let count = suggestions.len();
                debug!(ticket = ticket.id(), query = %flight.query, count, "response applied");
                self.apply(&flight.text, suggestions);
                Completion::Applied { count }
            }
        }
    }

    /// Commit suggestions for the live query and notify the renderer.
    fn apply(&mut self, query: &str, suggestions: Vec<Suggestion>) {
        // the live text is answered; a timer armed for it would only repeat the query
        self.debouncer.cancel();

        if let Some(hook) = &self.options.on_search_complete {
            hook.get()(query, &suggestions);
        }

        self.state.set_suggestions(suggestions);

        if self.state.visible {
            if let Some(container) = &self.container {
                if let Some(hook) = &self.options.before_render {
                    hook.get()(container);
                }
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_before_render(container);
                }
            }
            self.phase = Phase::Displaying;
        } else {
            self.phase = Phase::Idle;
        }
        self.publish();
    }

    // ========== Selection ==========

    /// Select the suggestion at `index` from the displayed list.
    ///
    /// The field takes the suggestion's value, the list is hidden and the
    /// `on_select` callback receives the suggestion.
    pub fn select(&mut self, index: usize) -> Result<Suggestion, EngineError> {
        if self.field.is_none() {
            return Err(EngineError::Disposed);
        }
        if self.phase != Phase::Displaying {
            return Err(EngineError::NotDisplaying);
        }

        let len = self.state.suggestions.len();
        let suggestion = self
            .state
            .suggestions
            .select(index)
            .cloned()
            .ok_or(EngineError::InvalidIndex { index, len })?;

        self.debouncer.cancel();
        if let Some(field) = self.field.as_mut() {
            field.set_text(&suggestion.value);
        }
        self.state.current_value = suggestion.value.clone();
        self.state.visible = false;
        self.phase = Phase::Idle;
        debug!(index, value = %suggestion.value, "suggestion selected");

        if let Some(hook) = &self.options.on_select {
            hook.get()(&suggestion);
        }
        if let Some(observer) = self.observer.as_mut() {
            observer.on_selected(&suggestion);
        }
        self.publish();
        Ok(suggestion)
    }

    /// Hide the list without selecting anything.
    pub fn dismiss(&mut self) -> Result<(), EngineError> {
        if self.field.is_none() {
            return Err(EngineError::Disposed);
        }
        self.state.visible = false;
        if self.phase == Phase::Displaying {
            self.phase = Phase::Idle;
        }
        self.publish();
        Ok(())
    }

    // ========== Teardown ==========

    /// Detach from the field and drop all owned state.
    ///
    /// Pending timers are cancelled and completions for requests issued before
    /// this call are discarded. Every later call is rejected.
    pub fn dispose(&mut self) {
        if self.phase == Phase::Disposed {
            return;
        }
        self.debouncer.cancel();
        self.in_flight.clear();
        self.current = None;
        self.state.clear();
        self.bad_queries.clear();
        self.responses.clear();
        self.field = None;

        // let the renderer hide before it is detached
        self.context.clear();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_suggestions_changed(&self.context);
        }
        self.observer = None;

        if let Some(container) = self.container.take() {
            debug!(container = %container.id, "suggestions engine disposed");
        }
        self.phase = Phase::Disposed;
    }

    fn publish(&mut self) {
        self.context
            .sync_from(&self.state, self.options.hint.as_deref());
        if let Some(observer) = self.observer.as_mut() {
            observer.on_suggestions_changed(&self.context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::QueuedTransport;
    use serde_json::json;
    use std::time::Duration;

    fn engine() -> Controller<QueuedTransport> {
        Controller::new(Options::new("/some/url", "NAME"), QueuedTransport::new())
    }

    fn respond(engine: &mut Controller<QueuedTransport>, body: serde_json::Value) -> Completion {
        let sent = engine.transport_mut().pop().expect("a pending request");
        engine.complete(sent.ticket, Ok(body))
    }

    #[test]
    fn test_dispatches_immediately_without_debounce() {
        let mut engine = engine();
        engine.on_value_change("Jam", Instant::now()).unwrap();
        assert_eq!(engine.phase(), Phase::AwaitingResponse);
        assert_eq!(engine.transport().requests().len(), 1);
        assert_eq!(engine.in_flight(), 1);
    }

    #[test]
    fn test_empty_input_goes_idle() {
        let mut engine = engine();
        engine.on_value_change("Jam", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));
        assert!(engine.state().visible);

        engine.on_value_change("   ", Instant::now()).unwrap();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(!engine.state().visible);
        assert!(engine.state().suggestions().is_empty());
        assert_eq!(engine.transport().requests().len(), 1);
    }

    #[test]
    fn test_min_chars() {
        let mut engine = engine();
        engine.update_options(|o| o.min_chars = 3);
        engine.on_value_change("Ja", Instant::now()).unwrap();
        assert!(engine.transport().requests().is_empty());
        engine.on_value_change("Jam", Instant::now()).unwrap();
        assert_eq!(engine.transport().requests().len(), 1);
    }

    #[test]
    fn test_debounce_only_latest_input_is_sent() {
        let mut engine = engine();
        engine.update_options(|o| o.defer_request_by_ms = 100);
        let t0 = Instant::now();

        engine.on_value_change("J", t0).unwrap();
        engine.on_value_change("Ja", t0 + Duration::from_millis(40)).unwrap();
        engine.on_value_change("Jam", t0 + Duration::from_millis(80)).unwrap();
        assert_eq!(engine.phase(), Phase::Debouncing);

        assert!(!engine.poll_timer(t0 + Duration::from_millis(150)).unwrap());
        assert!(engine.transport().requests().is_empty());

        assert!(engine.poll_timer(t0 + Duration::from_millis(180)).unwrap());
        let requests = engine.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].params["query"], json!("Jam"));
    }

    #[test]
    fn test_response_for_returned_text_cancels_pending_timer() {
        let mut engine = engine();
        engine.update_options(|o| o.defer_request_by_ms = 100);
        let t0 = Instant::now();

        engine.on_value_change("Jam", t0).unwrap();
        assert!(engine.poll_timer(t0 + Duration::from_millis(100)).unwrap());
        engine.on_value_change("Jama", t0 + Duration::from_millis(110)).unwrap();
        engine.on_value_change("Jam", t0 + Duration::from_millis(120)).unwrap();
        assert_eq!(engine.phase(), Phase::Debouncing);

        let outcome = respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));
        assert_eq!(outcome, Completion::Applied { count: 1 });
        assert_eq!(engine.phase(), Phase::Displaying);
        assert_eq!(engine.timer_deadline(), None);

        assert!(!engine.poll_timer(t0 + Duration::from_secs(1)).unwrap());
        assert_eq!(engine.transport().requests().len(), 1);
        assert_eq!(engine.phase(), Phase::Displaying);
    }

    #[test]
    fn test_failure_returns_to_idle_without_recording() {
        let mut engine = engine();
        engine.update_options(|o| o.prevent_bad_queries = true);
        engine.on_value_change("Jam", Instant::now()).unwrap();
        let sent = engine.transport_mut().pop().unwrap();

        let outcome = engine.complete(sent.ticket, Err(TransportError::Status(500)));
        assert_eq!(outcome, Completion::Failed);
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.bad_queries().is_empty());

        engine.on_value_change("Jama", Instant::now()).unwrap();
        assert_eq!(engine.transport().requests().len(), 2);
    }

    #[test]
    fn test_response_cache_skips_network() {
        let mut engine = engine();
        engine.on_value_change("Jam", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));

        engine.on_value_change("Jama", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));

        engine.on_value_change("Jam", Instant::now()).unwrap();
        assert_eq!(engine.transport().requests().len(), 2);
        assert_eq!(engine.phase(), Phase::Displaying);
        assert_eq!(engine.state().suggestions()[0].value, "Jamaica");
    }

    #[test]
    fn test_no_cache_always_dispatches() {
        let mut engine = engine();
        engine.update_options(|o| o.no_cache = true);
        engine.on_value_change("Jam", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));
        engine.on_value_change("Jam", Instant::now()).unwrap();
        assert_eq!(engine.transport().requests().len(), 2);
    }

    #[test]
    fn test_select_requires_displayed_list() {
        let mut engine = engine();
        assert_eq!(engine.select(0), Err(EngineError::NotDisplaying));

        engine.on_value_change("A", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Alex"] }));
        assert_eq!(
            engine.select(3),
            Err(EngineError::InvalidIndex { index: 3, len: 1 })
        );
        let chosen = engine.select(0).unwrap();
        assert_eq!(chosen.value, "Alex");
        assert_eq!(engine.field().unwrap().text(), "Alex");
        assert_eq!(engine.state().current_value, "Alex");
        assert_eq!(engine.state().selected_index(), Some(0));
        assert!(!engine.state().visible);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_dismiss_hides() {
        let mut engine = engine();
        engine.on_value_change("A", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Alex"] }));
        engine.dismiss().unwrap();
        assert!(!engine.context().visible);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_context_carries_hint() {
        let mut engine = engine();
        engine.on_value_change("jam", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));
        assert_eq!(engine.context().hint.as_deref(), Some(crate::DEFAULT_HINT));

        engine.update_options(|o| o.hint = Some("custom hint".to_string()));
        engine.on_value_change("jama", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));
        assert_eq!(engine.context().hint.as_deref(), Some("custom hint"));

        engine.update_options(|o| o.hint = None);
        engine.on_value_change("jamai", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica"] }));
        assert_eq!(engine.context().hint, None);
    }

    #[test]
    fn test_search_lifecycle_hooks() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let events: Rc<RefCell<Vec<String>>> = Rc::default();
        let (start, done, failed) = (Rc::clone(&events), Rc::clone(&events), Rc::clone(&events));
        let options = Options::new("/some/url", "NAME")
            .on_search_start(move |r| {
                start
                    .borrow_mut()
                    .push(format!("start {}", r.params["query"]))
            })
            .on_search_complete(move |q, s| {
                done.borrow_mut().push(format!("complete {q} {}", s.len()))
            })
            .on_search_error(move |q, _| failed.borrow_mut().push(format!("error {q}")));
        let mut engine = Controller::new(options, QueuedTransport::new());

        engine.on_value_change("Jam", Instant::now()).unwrap();
        respond(&mut engine, json!({ "suggestions": ["Jamaica", "Jambalaya"] }));
        engine.on_value_change("Jama", Instant::now()).unwrap();
        let sent = engine.transport_mut().pop().unwrap();
        engine.complete(sent.ticket, Err(TransportError::Timeout));

        assert_eq!(
            *events.borrow(),
            [
                r#"start "Jam""#,
                "complete Jam 2",
                r#"start "Jama""#,
                "error Jama",
            ]
        );
    }

    #[test]
    fn test_free_text_entry_does_not_hide_bad_root() {
        let mut engine = engine();
        engine.update_options(|o| {
            o.allow_free_text = true;
            o.prevent_bad_queries = true;
        });

        engine.on_value_change("Jzz", Instant::now()).unwrap();
        let outcome = respond(&mut engine, json!({ "suggestions": [] }));
        assert_eq!(outcome, Completion::Applied { count: 1 });
        assert!(engine.state().visible);
        assert!(engine.state().suggestions()[0].unrestricted);
        assert_eq!(engine.bad_queries().len(), 1);

        let chosen = engine.select(0).unwrap();
        assert_eq!(chosen.value, "Jzz");
    }
}
