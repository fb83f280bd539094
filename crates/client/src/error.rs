use crate::transport::TransportError;
use paratime_types::{CallResult, Denomination, Value};
use std::time::Duration;
use thiserror::Error;

/// The module reporting call format failures.
pub const CORE_MODULE: &str = "core";

/// Error code of `core` for a call format the runtime cannot process, as
/// raised when a call is sealed to a key of another epoch.
pub const CODE_INVALID_CALL_FORMAT: u32 = 15;

/// Client failure.
#[derive(Debug, Error)]
pub enum Error {
    /// The transaction was changed after its body was frozen for signing.
    #[error("transaction body is frozen once signing starts")]
    BodyFrozen,
    /// The call was already encoded in a call format.
    #[error("call is already encoded")]
    CallAlreadyEncoded,
    /// Submission needs at least one signer.
    #[error("no signers given")]
    NoSigners,
    /// Gas cannot be estimated for a confidential call.
    #[error("gas estimation is unavailable for confidential calls, set the gas limit")]
    ConfidentialGasEstimation,
    /// The runtime does not accept fees in this denomination.
    #[error("denomination {0} is not accepted for fees")]
    UnsupportedDenomination(Denomination),
    /// Signing or local verification failed.
    #[error("signing failed: {0}")]
    Sign(#[from] paratime_sign::Error),
    /// Encoding the call or decoding its result failed.
    #[error("call format: {0}")]
    CallFormat(#[from] paratime_callformat::Error),
    /// A signer's address could not be derived.
    #[error("address derivation failed: {0}")]
    Address(#[from] paratime_hash::AddressError),
    /// The node could not serve the request.
    #[error(transparent)]
    Transport(TransportError),
    /// A runtime module rejected the call or query.
    #[error("module {module} failed with code {code}: {message}")]
    Module {
        /// The module that raised the error.
        module: String,
        /// Module-specific error code.
        code: u32,
        /// Human readable message, possibly empty.
        message: String,
    },
    /// A response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] paratime_hash::DecodeError),
    /// Rounds past the last representable one were requested.
    #[error("round number overflow")]
    RoundOverflow,
    /// The operation was cancelled.
    #[error("cancelled")]
    Cancelled,
    /// The operation did not complete in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// How an [`Error`] should be handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caused by the caller. Retrying the same request fails the same way.
    Local,
    /// A temporary remote condition. The request may be retried.
    Transient,
    /// The runtime rejected the request. Never retried.
    Remote,
    /// A cryptographic or protocol integrity failure. Always fatal.
    Integrity,
}

impl Error {
    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        use paratime_callformat::Error as Format;
        use paratime_sign::Error as Sign;
        match self {
            Self::Sign(
                Sign::VerificationFailed
                | Sign::MalformedSignature(_)
                | Sign::InvalidProof { .. }
                | Sign::ProofCount { .. }
                | Sign::ProofMismatch(_),
            ) => ErrorCategory::Integrity,
            Self::BodyFrozen
            | Self::CallAlreadyEncoded
            | Self::NoSigners
            | Self::ConfidentialGasEstimation
            | Self::UnsupportedDenomination(_)
            | Self::RoundOverflow
            | Self::Sign(_)
            | Self::Address(_)
            | Self::Cancelled
            | Self::CallFormat(Format::MissingPublicKey) => ErrorCategory::Local,
            Self::CallFormat(_) => ErrorCategory::Integrity,
            Self::Transport(e) if e.is_transient() => ErrorCategory::Transient,
            Self::Timeout(_) => ErrorCategory::Transient,
            Self::Transport(_) | Self::Module { .. } | Self::Decode(_) => ErrorCategory::Remote,
        }
    }

    /// Whether the runtime refused a sealed call because its key epoch has
    /// passed.
    pub fn is_epoch_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Module { module, code, .. }
                if module == CORE_MODULE && *code == CODE_INVALID_CALL_FORMAT
        )
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Module {
                module,
                code,
                message,
            } => Self::Module {
                module,
                code,
                message,
            },
            e => Self::Transport(e),
        }
    }
}

/// The output of a decoded call result, or the module failure it carries.
pub(crate) fn into_output(result: CallResult) -> Result<Value, Error> {
    match result {
        CallResult::Ok(value) => Ok(value),
        CallResult::Failed {
            module,
            code,
            message,
        } => Err(Error::Module {
            module,
            code,
            message,
        }),
        CallResult::Unknown(_) => Err(paratime_callformat::Error::UnexpectedUnknownResult.into()),
    }
}
