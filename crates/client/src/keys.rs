//! The runtime's call data public key, cached per epoch.

use crate::{Client, Error, RuntimeClient};
use paratime_types::{callformat::CallDataPublicKey, ROUND_LATEST};
use std::sync::{Mutex, PoisonError};

/// Query returning the runtime's current call data public key.
pub(crate) const CALL_DATA_PUBLIC_KEY_METHOD: &str = "core.CallDataPublicKey";

/// Holds the last fetched key.
///
/// The mutex is only ever taken inside [`KeyCache::apply`], so it is
/// released before any await.
#[derive(Default)]
pub(crate) struct KeyCache {
    key: Mutex<Option<CallDataPublicKey>>,
}

impl KeyCache {
    fn apply<U>(&self, f: impl FnOnce(&mut Option<CallDataPublicKey>) -> U) -> U {
        f(&mut self.key.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn get(&self) -> Option<CallDataPublicKey> {
        self.apply(|key| key.clone())
    }

    pub(crate) fn store(&self, new: CallDataPublicKey) {
        self.apply(|key| match key {
            // Never step back to an older epoch fetched concurrently.
            Some(current) if current.epoch > new.epoch => (),
            _ => *key = Some(new),
        })
    }

    /// Drop the cached key if it is still the one of `epoch`.
    pub(crate) fn invalidate(&self, epoch: u64) -> bool {
        self.apply(|key| {
            if key.as_ref().is_some_and(|k| k.epoch == epoch) {
                *key = None;
                true
            } else {
                false
            }
        })
    }
}

impl<C: RuntimeClient> Client<C> {
    /// The runtime's call data public key, fetched on first use.
    pub async fn call_data_public_key(&self) -> Result<CallDataPublicKey, Error> {
        match self.keys.get() {
            Some(key) => Ok(key),
            None => self.refresh_call_data_public_key().await,
        }
    }

    /// Fetch the runtime's call data public key, replacing the cached one.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub async fn refresh_call_data_public_key(&self) -> Result<CallDataPublicKey, Error> {
        let key: CallDataPublicKey = self
            .query(ROUND_LATEST, CALL_DATA_PUBLIC_KEY_METHOD, &())
            .await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(epoch = key.epoch, "fetched call data public key");
        self.keys.store(key.clone());
        Ok(key)
    }

    /// Forget the cached key of `epoch`, so the next sealed call fetches a
    /// fresh one.
    pub(crate) fn invalidate_call_data_public_key(&self, epoch: u64) {
        if self.keys.invalidate(epoch) {
            #[cfg(feature = "tracing")]
            tracing::debug!(epoch, "dropped stale call data public key");
        }
    }
}
