//! Raw runtime events.
//!
//! The runtime stores events under the key `module || be_u32(code)`. The
//! value is the canonical encoding of an array of event payloads.

use crate::{Hash, Round};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw event emitted by a runtime module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Emitting module name.
    pub module: String,
    /// Module-specific event code.
    pub code: u32,
    /// Encoded event payloads.
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
    /// Hash of the transaction that emitted the event, if any. Not part of
    /// the stored event.
    #[serde(skip)]
    pub tx_hash: Option<Hash>,
}

/// Events of a single round, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundEvents {
    /// The round.
    pub round: Round,
    /// The events.
    pub events: Vec<Event>,
}

/// An event key is too short or its module name is not UTF-8.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventKeyError {
    /// Key shorter than the 4 byte code suffix.
    #[error("event key too short: {0} bytes")]
    TooShort(usize),
    /// Module name is not valid UTF-8.
    #[error("event module name is not valid utf-8")]
    Module,
}

impl Event {
    /// Build an event from its storage key and value.
    pub fn from_raw(key: &[u8], value: Vec<u8>) -> Result<Self, EventKeyError> {
        let (module, code) = split_key(key)?;
        Ok(Self {
            module,
            code,
            value,
            tx_hash: None,
        })
    }

    /// The storage key of this event.
    pub fn key(&self) -> Vec<u8> {
        event_key(&self.module, self.code)
    }
}

/// Storage key for events of `module` with `code`.
pub fn event_key(module: &str, code: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(module.len() + 4);
    key.extend_from_slice(module.as_bytes());
    key.extend_from_slice(&code.to_be_bytes());
    key
}

fn split_key(key: &[u8]) -> Result<(String, u32), EventKeyError> {
    if key.len() < 4 {
        return Err(EventKeyError::TooShort(key.len()));
    }
    let (module, code) = key.split_at(key.len() - 4);
    let module = std::str::from_utf8(module).map_err(|_| EventKeyError::Module)?;
    let mut code_bytes = [0u8; 4];
    code_bytes.copy_from_slice(code);
    Ok((module.to_string(), u32::from_be_bytes(code_bytes)))
}
