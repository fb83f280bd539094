//! Domain-separated signing and verification for the paratime client
//! protocol layer.
//!
//! Every signature covers `context || message` where the context names the
//! message class and, for runtime transactions, the chain. A signature made
//! for one chain or one class of message never verifies for another.
//!
//! - [`context`]: signing contexts and chain contexts.
//! - [`Signer`]: the credential seam, with in-memory implementations in
//!   [`memory`].
//! - [`verify()`] and [`verify_multisig`] for single and multisig proofs.
//! - [`transaction::TransactionSigner`] accumulates proofs over a frozen
//!   transaction body.
//! - [`evm`]: EIP-712 signed call data for leashed simulate calls.

#![deny(missing_docs)]
#![deny(unsafe_code)]

use paratime_types::{multisig::ConfigError, PublicKey, Signature};
use thiserror::Error;

pub mod context;
pub mod evm;
pub mod memory;
pub mod transaction;
mod verify;

#[doc(inline)]
pub use memory::{Ed25519Signer, Secp256k1Signer, Sr25519Signer};
pub use verify::{verify, verify_multisig};

/// A credential able to produce signatures for one public key.
///
/// Implementations may hold keys in memory, in a hardware wallet or behind
/// a remote service.
pub trait Signer {
    /// The public key signatures verify against.
    fn public_key(&self) -> PublicKey;

    /// Sign `message` under `context`.
    fn sign(&self, context: &[u8], message: &[u8]) -> Result<Signature, Error>;

    /// Sign `message` without a context.
    ///
    /// Only used for external formats that do their own domain separation,
    /// such as EIP-712 typed data. Schemes that cannot sign raw messages
    /// return [`Error::UnsupportedRawSigning`].
    fn sign_raw(&self, message: &[u8]) -> Result<Signature, Error>;
}

/// Signing or verification failure.
#[derive(Debug, Error)]
pub enum Error {
    /// A secret key's bytes do not form a valid key.
    #[error("malformed {0} secret key")]
    MalformedSecretKey(&'static str),
    /// A public key's bytes do not form a valid key.
    #[error("malformed {0} public key")]
    MalformedPublicKey(&'static str),
    /// A signature's bytes do not form a valid signature.
    #[error("malformed {0} signature")]
    MalformedSignature(&'static str),
    /// The signature does not verify against the public key and message.
    #[error("signature verification failed")]
    VerificationFailed,
    /// The scheme cannot sign raw messages in the requested form.
    #[error("raw signing is not supported for {0}")]
    UnsupportedRawSigning(&'static str),
    /// No signer slot of the transaction accepts the given public key.
    #[error("no signer slot accepts public key {0}")]
    SignerNotFound(PublicKey),
    /// The signer's address differs from the one the payload names.
    #[error("signer address does not match the caller")]
    AddressMismatch,
    /// A multisig configuration or signature set is unusable.
    #[error("multisig: {0}")]
    Multisig(#[from] ConfigError),
    /// A single-signature slot was never signed.
    #[error("signer slot {0} is not signed")]
    MissingSignature(usize),
    /// The number of proofs differs from the number of signer slots.
    #[error("expected {expected} authentication proofs, found {found}")]
    ProofCount {
        /// Number of signer slots.
        expected: usize,
        /// Number of proofs supplied.
        found: usize,
    },
    /// A proof's kind does not fit its signer slot.
    #[error("proof {0} does not match its signer slot")]
    ProofMismatch(usize),
    /// Verification at the given proof failed.
    #[error("proof {index} is invalid: {source}")]
    InvalidProof {
        /// The failing proof's index.
        index: usize,
        /// Why the proof is invalid.
        #[source]
        source: Box<Error>,
    },
    /// The signed body is not a valid transaction.
    #[error("failed to decode transaction body: {0}")]
    Decode(#[from] paratime_hash::DecodeError),
    /// A numeric field does not fit its encoded width.
    #[error("{0} does not fit in 256 bits")]
    Overflow(&'static str),
}

impl<S: Signer + ?Sized> Signer for &S {
    fn public_key(&self) -> PublicKey {
        (**self).public_key()
    }
    fn sign(&self, context: &[u8], message: &[u8]) -> Result<Signature, Error> {
        (**self).sign(context, message)
    }
    fn sign_raw(&self, message: &[u8]) -> Result<Signature, Error> {
        (**self).sign_raw(message)
    }
}

impl<S: Signer + ?Sized> Signer for Box<S> {
    fn public_key(&self) -> PublicKey {
        (**self).public_key()
    }
    fn sign(&self, context: &[u8], message: &[u8]) -> Result<Signature, Error> {
        (**self).sign(context, message)
    }
    fn sign_raw(&self, message: &[u8]) -> Result<Signature, Error> {
        (**self).sign_raw(message)
    }
}
