//! Dispatch of runtime events to typed handlers.
//!
//! An [`EventVisitor`] is built once from [`ModuleHandler`]s and looks each
//! event up by module, then by code. Events nobody registered for are
//! skipped. An event whose payload does not decode is reported and later
//! events are still dispatched.
//!
//! ```ignore
//! let mut visitor = EventVisitor::new([ModuleHandler::new("accounts")
//!     .on(TRANSFER, |_event, transfer: TransferEvent| { /* ... */ })]);
//! let errors = visitor.visit_all(&events);
//! ```

use paratime_hash::DecodeError;
use paratime_types::event::{Event, RoundEvents};
use paratime_types::Round;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;

type Handler<'a> = Box<dyn FnMut(&Event) -> Result<usize, DecodeError> + Send + 'a>;

/// Handlers for the events of one module, keyed by code.
pub struct ModuleHandler<'a> {
    module: String,
    codes: Vec<(u32, Handler<'a>)>,
}

/// Routes events to the handlers registered for them.
pub struct EventVisitor<'a> {
    modules: HashMap<String, HashMap<u32, Handler<'a>>>,
}

/// An event payload did not decode into its handler's type.
#[derive(Debug, Error)]
#[error("failed to decode event {module}:{code} at index {index}: {source}")]
pub struct EventDecodeError {
    /// Round the event was emitted in, if known.
    pub round: Option<Round>,
    /// Position of the event within the visited events.
    pub index: usize,
    /// Emitting module.
    pub module: String,
    /// Event code.
    pub code: u32,
    /// Why decoding failed.
    #[source]
    pub source: DecodeError,
}

/// What happened to a visited event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// No handler is registered for the event.
    Skipped,
    /// The handler was called once per payload.
    Handled(usize),
}

impl<'a> ModuleHandler<'a> {
    /// An empty handler for `module`.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            codes: Vec::new(),
        }
    }

    /// The module handled.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Call `f` with every payload of events with `code`, decoded as `T`.
    ///
    /// An event's value is a list of payloads, all decoded before any is
    /// passed on.
    pub fn on<T, F>(mut self, code: u32, mut f: F) -> Self
    where
        T: DeserializeOwned,
        F: FnMut(&Event, T) + Send + 'a,
    {
        let handler: Handler<'a> = Box::new(move |event| {
            let payloads: Vec<T> = paratime_hash::deserialize(&event.value)?;
            let count = payloads.len();
            for payload in payloads {
                f(event, payload);
            }
            Ok(count)
        });
        self.codes.push((code, handler));
        self
    }
}

impl<'a> EventVisitor<'a> {
    /// Build the lookup table.
    ///
    /// When several handlers claim the same module and code, the first one
    /// wins.
    pub fn new(handlers: impl IntoIterator<Item = ModuleHandler<'a>>) -> Self {
        let mut modules: HashMap<String, HashMap<u32, Handler<'a>>> = HashMap::new();
        for handler in handlers {
            let codes = modules.entry(handler.module).or_default();
            for (code, f) in handler.codes {
                codes.entry(code).or_insert(f);
            }
        }
        Self { modules }
    }

    /// Whether a handler is registered for `module` and `code`.
    pub fn handles(&self, module: &str, code: u32) -> bool {
        self.modules
            .get(module)
            .is_some_and(|codes| codes.contains_key(&code))
    }

    /// Dispatch one event.
    pub fn visit(&mut self, event: &Event) -> Result<Visit, DecodeError> {
        match self
            .modules
            .get_mut(&event.module)
            .and_then(|codes| codes.get_mut(&event.code))
        {
            Some(handler) => Ok(Visit::Handled(handler(event)?)),
            None => Ok(Visit::Skipped),
        }
    }

    /// Dispatch `events` in order, returning the ones that failed to decode.
    pub fn visit_all(&mut self, events: &[Event]) -> Vec<EventDecodeError> {
        self.visit_events(None, events)
    }

    /// Dispatch the events of one round in emission order, returning the
    /// ones that failed to decode.
    pub fn visit_round(&mut self, round: &RoundEvents) -> Vec<EventDecodeError> {
        self.visit_events(Some(round.round), &round.events)
    }

    fn visit_events(&mut self, round: Option<Round>, events: &[Event]) -> Vec<EventDecodeError> {
        let mut errors = Vec::new();
        for (index, event) in events.iter().enumerate() {
            if let Err(source) = self.visit(event) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    ?round,
                    index,
                    module = %event.module,
                    code = event.code,
                    "undecodable event: {source}"
                );
                errors.push(EventDecodeError {
                    round,
                    index,
                    module: event.module.clone(),
                    code: event.code,
                    source,
                });
            }
        }
        errors
    }
}
