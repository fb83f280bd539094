//! Types for signed, leashed EVM simulate calls.

use crate::{transaction::Call, Hash};
use serde::{Deserialize, Serialize};

/// Size of a recoverable Secp256k1 signature in `r || s || v` form.
pub const RSV_SIGNATURE_SIZE: usize = 65;

/// Binds a signed read-only call to a window of recent blocks, so it cannot
/// be replayed against stale state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leash {
    /// The caller's current account nonce.
    pub nonce: u64,
    /// Number of the block the leash starts at.
    pub block_number: u64,
    /// Hash of that block.
    #[serde(with = "crate::serde::bytes")]
    pub block_hash: Hash,
    /// Number of blocks after `block_number` for which the call is valid.
    pub block_range: u64,
}

/// Call data of an EVM simulate call together with the caller's EIP-712
/// signature over the call parameters and leash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedCallDataPack {
    /// The call data, plain or already encrypted.
    pub data: Call,
    /// The leash the signature covers.
    pub leash: Leash,
    /// Signature in `r || s || v` form, `v` offset by 27.
    #[serde(with = "crate::serde::bytes")]
    pub signature: [u8; RSV_SIGNATURE_SIZE],
}
