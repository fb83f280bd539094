//! Base types for the paratime client protocol layer.
//!
//! Everything that is signed, encrypted or sent over the wire is defined
//! here together with its serde shape. The shapes mirror the runtime's
//! canonical CBOR layout, so encoding any of these types through
//! `paratime-hash` yields the exact bytes every other implementation signs.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod address;
pub mod callformat;
pub mod crypto;
pub mod event;
pub mod evm;
mod fmt;
pub mod multisig;
pub mod serde;
pub mod token;
pub mod transaction;

#[doc(inline)]
pub use address::{Address, CallerAddress};
#[doc(inline)]
pub use crypto::{PublicKey, Signature, SignatureAddressSpec};
#[doc(inline)]
pub use token::{BaseUnits, Denomination};
#[doc(inline)]
pub use transaction::{
    AddressSpec, AuthInfo, AuthProof, Call, CallFormat, CallResult, Fee, SignerInfo, Transaction,
    UnverifiedTransaction,
};

/// Generic CBOR value used for opaque call bodies, query arguments and results.
pub use ciborium::Value;

/// A 32-byte digest, as produced by SHA-512/256 or Keccak-256.
pub type Hash = [u8; 32];

/// A runtime round (block) number.
pub type Round = u64;

/// Round number standing in for "the latest round" in queries.
pub const ROUND_LATEST: Round = u64::MAX;
