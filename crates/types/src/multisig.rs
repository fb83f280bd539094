//! Weighted multisig configurations.
//!
//! The order of [`Config::signers`] is significant: it defines the slot each
//! signer's signature occupies in a [`SignatureSet`].

use crate::crypto::{PublicKey, Signature};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// One signature per configured signer, `None` where that signer did not sign.
pub type SignatureSet = Vec<Option<Signature>>;

/// A signer participating in a multisig configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signer {
    /// The signer's public key.
    pub public_key: PublicKey,
    /// The weight this signer's signature contributes.
    pub weight: u64,
}

/// A weighted multisig configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Config {
    /// The signers, in slot order.
    pub signers: Vec<Signer>,
    /// Minimum combined weight required to authorize.
    pub threshold: u64,
}

/// A multisig configuration or signature set is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A threshold of zero would authorize anyone.
    #[error("zero threshold")]
    ZeroThreshold,
    /// The same public key appears twice.
    #[error("duplicate public key at signer {0}")]
    DuplicateKey(usize),
    /// A signer has weight zero.
    #[error("zero weight for signer {0}")]
    ZeroWeight(usize),
    /// The combined weight does not fit in a `u64`.
    #[error("total weight overflows")]
    WeightOverflow,
    /// Even every signer together cannot reach the threshold.
    #[error("threshold {threshold} unreachable with total weight {total}")]
    UnreachableThreshold {
        /// The configured threshold.
        threshold: u64,
        /// The combined weight of all signers.
        total: u64,
    },
    /// The signature set has a different length than the signer list.
    #[error("signature set has {found} slots, expected {expected}")]
    SignatureSetLength {
        /// Number of configured signers.
        expected: usize,
        /// Number of slots in the signature set.
        found: usize,
    },
    /// The present signatures do not carry enough weight.
    #[error("insufficient weight: {weight} < threshold {threshold}")]
    InsufficientWeight {
        /// Combined weight of the present signatures.
        weight: u64,
        /// The configured threshold.
        threshold: u64,
    },
}

impl Config {
    /// Check that the configuration can ever authorize anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        let mut keys = HashSet::with_capacity(self.signers.len());
        let mut total: u64 = 0;
        for (ix, signer) in self.signers.iter().enumerate() {
            if !keys.insert(signer.public_key) {
                return Err(ConfigError::DuplicateKey(ix));
            }
            if signer.weight == 0 {
                return Err(ConfigError::ZeroWeight(ix));
            }
            total = total
                .checked_add(signer.weight)
                .ok_or(ConfigError::WeightOverflow)?;
        }
        if total < self.threshold {
            return Err(ConfigError::UnreachableThreshold {
                threshold: self.threshold,
                total,
            });
        }
        Ok(())
    }

    /// Combined weight of the populated slots of `set`.
    ///
    /// Does not check that the signatures are valid.
    pub fn signed_weight(&self, set: &[Option<Signature>]) -> Result<u64, ConfigError> {
        if set.len() != self.signers.len() {
            return Err(ConfigError::SignatureSetLength {
                expected: self.signers.len(),
                found: set.len(),
            });
        }
        let mut weight: u64 = 0;
        for (signer, sig) in self.signers.iter().zip(set) {
            if sig.is_some() {
                weight = weight
                    .checked_add(signer.weight)
                    .ok_or(ConfigError::WeightOverflow)?;
            }
        }
        Ok(weight)
    }

    /// Pair every present signature with its signer's public key, for batch
    /// verification.
    ///
    /// Fails if the configuration is invalid or if the present signatures do
    /// not reach the threshold.
    pub fn batch(
        &self,
        set: &[Option<Signature>],
    ) -> Result<(Vec<PublicKey>, Vec<Signature>), ConfigError> {
        self.validate()?;
        let weight = self.signed_weight(set)?;
        if weight < self.threshold {
            return Err(ConfigError::InsufficientWeight {
                weight,
                threshold: self.threshold,
            });
        }
        Ok(self
            .signers
            .iter()
            .zip(set)
            .filter_map(|(signer, sig)| Some((signer.public_key, sig.clone()?)))
            .unzip())
    }
}
