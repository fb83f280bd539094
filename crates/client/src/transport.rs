//! The seam between the client and a paratime node.

use paratime_types::{event::Event, Round};
use std::{future::Future, sync::Arc};
use thiserror::Error;

/// Failure reported by a [`RuntimeClient`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The round has not been produced yet.
    #[error("round {0} is not available yet")]
    RoundNotAvailable(Round),
    /// A runtime module rejected the request.
    #[error("module {module} failed with code {code}: {message}")]
    Module {
        /// The module that raised the error.
        module: String,
        /// Module-specific error code.
        code: u32,
        /// Human readable message, possibly empty.
        message: String,
    },
    /// The node cannot be reached for now.
    #[error("node unavailable: {0}")]
    Unavailable(String),
    /// Any other failure.
    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the same request may succeed if repeated later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RoundNotAvailable(_) | Self::Unavailable(_))
    }
}

/// A transaction accepted into a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedTx {
    /// The round the transaction was included in.
    pub round: Round,
    /// Canonically encoded call result.
    pub output: Vec<u8>,
}

/// Access to a paratime node.
///
/// Requests and responses are canonical CBOR. The client decodes them and
/// never holds a lock across any of these futures.
pub trait RuntimeClient {
    /// The most recently produced round.
    fn latest_round(&self) -> impl Future<Output = Result<Round, TransportError>> + Send;

    /// Run the read-only `method` with encoded `args` at `round`.
    fn query(
        &self,
        round: Round,
        method: &str,
        args: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// Submit an encoded unverified transaction and wait for its inclusion.
    fn submit_tx(
        &self,
        utx: Vec<u8>,
    ) -> impl Future<Output = Result<SubmittedTx, TransportError>> + Send;

    /// Events emitted in `round`, in emission order.
    fn events(&self, round: Round)
        -> impl Future<Output = Result<Vec<Event>, TransportError>> + Send;
}

impl<C: RuntimeClient> RuntimeClient for &C {
    fn latest_round(&self) -> impl Future<Output = Result<Round, TransportError>> + Send {
        (**self).latest_round()
    }
    fn query(
        &self,
        round: Round,
        method: &str,
        args: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).query(round, method, args)
    }
    fn submit_tx(
        &self,
        utx: Vec<u8>,
    ) -> impl Future<Output = Result<SubmittedTx, TransportError>> + Send {
        (**self).submit_tx(utx)
    }
    fn events(
        &self,
        round: Round,
    ) -> impl Future<Output = Result<Vec<Event>, TransportError>> + Send {
        (**self).events(round)
    }
}

impl<C: RuntimeClient> RuntimeClient for Arc<C> {
    fn latest_round(&self) -> impl Future<Output = Result<Round, TransportError>> + Send {
        (**self).latest_round()
    }
    fn query(
        &self,
        round: Round,
        method: &str,
        args: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).query(round, method, args)
    }
    fn submit_tx(
        &self,
        utx: Vec<u8>,
    ) -> impl Future<Output = Result<SubmittedTx, TransportError>> + Send {
        (**self).submit_tx(utx)
    }
    fn events(
        &self,
        round: Round,
    ) -> impl Future<Output = Result<Vec<Event>, TransportError>> + Send {
        (**self).events(round)
    }
}
