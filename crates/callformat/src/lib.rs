//! Call formats for the paratime client protocol layer.
//!
//! A call is either sent [`CallFormat::Plain`] or sealed to the runtime's
//! call data public key with [`CallFormat::EncryptedX25519DeoxysII`]. Each
//! encrypted call uses a fresh ephemeral X25519 key pair and a fresh random
//! nonce. The ephemeral secret is consumed deriving the box key and only
//! the derived key is kept, in the [`Metadata`] needed to open the result.
//!
//! ```plain
//! Call { format: 1, method: "", body: { pk, nonce, epoch, data: seal(call) } }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

use paratime_types::{
    callformat::{CallDataPublicKey, CallEnvelopeX25519DeoxysII, ResultEnvelopeX25519DeoxysII},
    Call, CallFormat, CallResult,
};
use rand::{CryptoRng, RngCore};
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey};

pub mod mrae;

#[doc(inline)]
pub use mrae::{AuthenticationError, BoxKey};

/// Call encoding or result decoding failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Encryption was requested without the runtime's call data public key.
    #[error("runtime call data public key not set")]
    MissingPublicKey,
    /// The result envelope failed authentication. Never retried.
    #[error("failed to open result envelope: {0}")]
    Authentication(#[from] AuthenticationError),
    /// An encrypted call produced a plain successful result.
    #[error("unexpected plain result for an encrypted call")]
    UnexpectedPlainResult,
    /// The opened result is itself in an unknown format.
    #[error("unexpected unknown result inside result envelope")]
    UnexpectedUnknownResult,
    /// The result envelope is malformed.
    #[error("malformed result envelope: {0}")]
    MalformedEnvelope(#[source] paratime_hash::DecodeError),
    /// The opened result is not a valid call result.
    #[error("malformed result: {0}")]
    MalformedResult(#[source] paratime_hash::DecodeError),
}

/// What is needed to decode the result of an encoded call.
#[derive(Clone, Debug)]
pub enum Metadata {
    /// The call was sent as is.
    Plain,
    /// The call was sealed.
    EncryptedX25519DeoxysII {
        /// The runtime public key the call was sealed to.
        runtime_public_key: [u8; 32],
        /// Epoch of that key.
        epoch: u64,
        /// Box key shared with the runtime for this call only.
        key: BoxKey,
    },
}

impl Metadata {
    /// The call format this metadata decodes.
    pub fn format(&self) -> CallFormat {
        match self {
            Self::Plain => CallFormat::Plain,
            Self::EncryptedX25519DeoxysII { .. } => CallFormat::EncryptedX25519DeoxysII,
        }
    }
}

/// Encode `call` in `format` using the operating system's randomness.
///
/// `public_key` is required for encrypted formats.
pub fn encode_call(
    call: Call,
    format: CallFormat,
    public_key: Option<&CallDataPublicKey>,
) -> Result<(Call, Metadata), Error> {
    encode_call_with_rng(call, format, public_key, &mut rand::rngs::OsRng)
}

/// Encode `call` in `format`, drawing the ephemeral key and nonce from
/// `rng`.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(format = ?format), err))]
pub fn encode_call_with_rng<R: RngCore + CryptoRng>(
    call: Call,
    format: CallFormat,
    public_key: Option<&CallDataPublicKey>,
    rng: &mut R,
) -> Result<(Call, Metadata), Error> {
    match format {
        CallFormat::Plain => Ok((call, Metadata::Plain)),
        CallFormat::EncryptedX25519DeoxysII => {
            let runtime = public_key.ok_or(Error::MissingPublicKey)?;
            let runtime_public_key = runtime.public_key.key;

            let secret = EphemeralSecret::random_from_rng(&mut *rng);
            let pk = PublicKey::from(&secret);
            let key = mrae::kdf(&secret.diffie_hellman(&PublicKey::from(runtime_public_key)));

            let mut nonce = [0u8; mrae::NONCE_SIZE];
            rng.fill_bytes(&mut nonce);

            let read_only = call.read_only;
            let data = key.seal(&nonce, &paratime_hash::serialize(&call), &[]);
            let envelope = CallEnvelopeX25519DeoxysII {
                pk: pk.to_bytes(),
                nonce,
                epoch: runtime.epoch,
                data,
            };
            let encoded = Call {
                format,
                method: String::new(),
                body: paratime_hash::to_value(&envelope),
                read_only,
            };
            #[cfg(feature = "tracing")]
            tracing::debug!(epoch = runtime.epoch, "sealed call");
            Ok((
                encoded,
                Metadata::EncryptedX25519DeoxysII {
                    runtime_public_key,
                    epoch: runtime.epoch,
                    key,
                },
            ))
        }
    }
}

/// Decode the result of a call encoded with `meta`.
///
/// Plain results pass through unchanged. For encrypted calls the `unknown`
/// envelope is opened and the inner result returned. A `fail` outcome is
/// returned as is since a call can fail before the runtime processes its
/// format.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
pub fn decode_result(result: CallResult, meta: &Metadata) -> Result<CallResult, Error> {
    let key = match meta {
        Metadata::Plain => return Ok(result),
        Metadata::EncryptedX25519DeoxysII { key, .. } => key,
    };
    let raw = match result {
        CallResult::Unknown(raw) => raw,
        CallResult::Ok(_) => return Err(Error::UnexpectedPlainResult),
        failed @ CallResult::Failed { .. } => return Ok(failed),
    };
    let envelope: ResultEnvelopeX25519DeoxysII =
        paratime_hash::from_value(raw).map_err(Error::MalformedEnvelope)?;
    let plain = key.open(&envelope.nonce, &envelope.data, &[])?;
    let inner: CallResult = paratime_hash::deserialize(&plain).map_err(Error::MalformedResult)?;
    match inner {
        CallResult::Unknown(_) => Err(Error::UnexpectedUnknownResult),
        inner => Ok(inner),
    }
}
