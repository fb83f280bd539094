//! Client side of the paratime protocol.
//!
//! [`Client`] wraps a [`RuntimeClient`] transport and drives the full life
//! of a transaction against it:
//!
//! 1. Resolve signer nonces and estimate gas ([`Client::next_nonce`],
//!    [`Client::estimate_gas`]).
//! 2. Fill in the fee from the runtime's minimum gas price
//!    ([`Client::fill_fee`]).
//! 3. Optionally seal the call to the runtime's call data public key and
//!    sign every signer slot ([`TransactionBuilder`]).
//! 4. Submit, decode the result, and refresh the key and retry when the
//!    runtime has moved to a new key epoch ([`Client::sign_and_submit`]).
//!
//! Events are dispatched to typed handlers by an [`EventVisitor`], either
//! per round or continuously with [`Client::watch_events`].
//!
//! Each request is scoped to the call that issues it. The only state shared
//! between calls is the cached call data public key.

#![deny(missing_docs)]
#![deny(unsafe_code)]

use paratime_sign::context::ChainContext;
use paratime_types::Round;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

pub mod builder;
mod error;
pub mod events;
mod gas;
mod keys;
mod submit;
pub mod transport;
pub mod watch;

#[doc(inline)]
pub use builder::{SignedTransaction, TransactionBuilder};
#[doc(inline)]
pub use error::{Error, ErrorCategory, CODE_INVALID_CALL_FORMAT, CORE_MODULE};
#[doc(inline)]
pub use events::{EventVisitor, ModuleHandler};
pub use gas::EstimateGasQuery;
pub use submit::Receipt;
#[doc(inline)]
pub use transport::{RuntimeClient, SubmittedTx, TransportError};

use keys::KeyCache;

/// Client configuration.
///
/// Every field has a default, so a partial document deserializes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between polls for a round that is not produced yet, in
    /// milliseconds.
    pub poll_interval_ms: u64,
    /// How many times a sealed call is re-sealed under a refreshed key
    /// after the runtime reports an epoch mismatch.
    pub max_epoch_retries: u32,
    /// Percentage added on top of the runtime's gas estimate.
    pub gas_headroom_percent: u64,
    /// Give up waiting for a submitted transaction after this many
    /// milliseconds.
    pub submit_timeout_ms: Option<u64>,
    /// Verify every proof locally before submitting.
    pub verify_before_submit: bool,
}

/// A client for one paratime.
pub struct Client<C> {
    transport: C,
    chain_context: ChainContext,
    config: Config,
    keys: KeyCache,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_epoch_retries: 3,
            gas_headroom_percent: 20,
            submit_timeout_ms: Some(15_000),
            verify_before_submit: true,
        }
    }
}

impl Config {
    /// [`Config::poll_interval_ms`] as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// [`Config::submit_timeout_ms`] as a duration.
    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_ms.map(Duration::from_millis)
    }
}

impl<C: RuntimeClient> Client<C> {
    /// A client talking to `transport` for the paratime identified by
    /// `chain_context`.
    pub fn new(transport: C, chain_context: ChainContext, config: Config) -> Self {
        Self {
            transport,
            chain_context,
            config,
            keys: KeyCache::default(),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// The chain context transactions are signed for.
    pub fn chain_context(&self) -> &ChainContext {
        &self.chain_context
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A builder for `tx`, signing for this client's chain.
    pub fn builder(&self, tx: paratime_types::Transaction) -> TransactionBuilder {
        TransactionBuilder::new(tx, &self.chain_context)
    }

    /// The most recently produced round.
    pub async fn latest_round(&self) -> Result<Round, Error> {
        Ok(self.transport.latest_round().await?)
    }

    /// Run the read-only `method` at `round`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, args), err))]
    pub async fn query<Rq, Rs>(&self, round: Round, method: &str, args: &Rq) -> Result<Rs, Error>
    where
        Rq: Serialize + Sync + ?Sized,
        Rs: DeserializeOwned,
    {
        let args = paratime_hash::serialize(args);
        let out = self.transport.query(round, method, args).await?;
        Ok(paratime_hash::deserialize(&out)?)
    }
}
