//! Transactions, their authentication information and call results.

use crate::{
    address::CallerAddress,
    crypto::{PublicKey, Signature, SignatureAddressSpec},
    multisig::{self, SignatureSet},
    token::BaseUnits,
    Value,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The transaction format version produced by this crate.
pub const LATEST_TRANSACTION_VERSION: u16 = 1;

/// A transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Format version.
    #[serde(rename = "v")]
    pub version: u16,
    /// The call to perform.
    pub call: Call,
    /// Authentication and fee information.
    #[serde(rename = "ai")]
    pub auth_info: AuthInfo,
}

/// Format used to encode a call body and its result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CallFormat {
    /// Plain text call data.
    #[default]
    Plain = 0,
    /// Call data sealed with X25519 key agreement and Deoxys-II.
    EncryptedX25519DeoxysII = 1,
}

/// A method call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// How `body` is encoded.
    #[serde(default, skip_serializing_if = "CallFormat::is_plain")]
    pub format: CallFormat,
    /// Method name. Empty for encrypted calls.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    /// Method arguments.
    pub body: Value,
    /// Whether the call is read-only.
    #[serde(default, rename = "ro", skip_serializing_if = "is_false")]
    pub read_only: bool,
}

/// Authentication and fee information.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthInfo {
    /// One entry per authorizer, in proof order.
    #[serde(rename = "si")]
    pub signer_info: Vec<SignerInfo>,
    /// The fee.
    pub fee: Fee,
    /// First round at which the transaction is valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<u64>,
    /// Last round at which the transaction is valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<u64>,
}

/// Transaction fee.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Total amount paid for the transaction.
    pub amount: BaseUnits,
    /// Maximum gas the transaction may use.
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub gas: u64,
    /// Maximum number of consensus messages the transaction may emit.
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub consensus_messages: u32,
    /// Module that pays the fee on the signer's behalf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<FeeProxy>,
}

/// Identifies a module paying the fee for a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeProxy {
    /// The paying module.
    pub module: String,
    /// Module-specific identifier.
    #[serde(with = "serde_bytes")]
    pub id: Vec<u8>,
}

/// How a signer authenticates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressSpec {
    /// A single signature.
    #[serde(rename = "signature")]
    Signature(SignatureAddressSpec),
    /// A weighted multisig.
    #[serde(rename = "multisig")]
    Multisig(multisig::Config),
}

/// An authorizer of a transaction and the nonce it proposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    /// How the signer authenticates.
    pub address_spec: AddressSpec,
    /// The signer's account nonce at submission time.
    pub nonce: u64,
}

/// Proof that a [`SignerInfo`] authorized a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthProof {
    /// A single signature.
    #[serde(rename = "signature")]
    Signature(Signature),
    /// One optional signature per multisig signer.
    #[serde(rename = "multisig")]
    Multisig(SignatureSet),
    /// A module-authenticated call. Never produced by clients.
    #[serde(rename = "module")]
    Module(String),
}

/// A signed but not yet verified transaction: the canonically encoded
/// [`Transaction`] and one proof per signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnverifiedTransaction(#[serde(with = "serde_bytes")] pub Vec<u8>, pub Vec<AuthProof>);

/// The outcome of a call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CallResult {
    /// The call succeeded.
    #[serde(rename = "ok")]
    Ok(Value),
    /// The call failed with a module error.
    #[serde(rename = "fail")]
    Failed {
        /// The module that raised the error.
        module: String,
        /// Module-specific error code.
        code: u32,
        /// Human readable message, if any.
        #[serde(default, skip_serializing_if = "String::is_empty")]
        message: String,
    },
    /// The outcome is wrapped in a format-specific envelope.
    #[serde(rename = "unknown")]
    Unknown(Value),
}

impl Transaction {
    /// A transaction calling `method` with `body` and no signers yet.
    pub fn new(method: impl Into<String>, body: Value) -> Self {
        Self {
            version: LATEST_TRANSACTION_VERSION,
            call: Call {
                format: CallFormat::Plain,
                method: method.into(),
                body,
                read_only: false,
            },
            auth_info: AuthInfo::default(),
        }
    }

    /// Append a single-signature signer.
    pub fn append_auth_signature(&mut self, spec: SignatureAddressSpec, nonce: u64) {
        self.auth_info.signer_info.push(SignerInfo {
            address_spec: AddressSpec::Signature(spec),
            nonce,
        });
    }

    /// Append a multisig signer.
    pub fn append_auth_multisig(&mut self, config: multisig::Config, nonce: u64) {
        self.auth_info.signer_info.push(SignerInfo {
            address_spec: AddressSpec::Multisig(config),
            nonce,
        });
    }

    /// The gas limit.
    pub fn fee_gas(&self) -> u64 {
        self.auth_info.fee.gas
    }

    /// Set the gas limit.
    pub fn set_fee_gas(&mut self, gas: u64) {
        self.auth_info.fee.gas = gas;
    }

    /// Set the fee amount.
    pub fn set_fee_amount(&mut self, amount: BaseUnits) {
        self.auth_info.fee.amount = amount;
    }
}

impl Call {
    /// Whether the body is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.format != CallFormat::Plain
    }
}

impl CallFormat {
    fn is_plain(&self) -> bool {
        *self == CallFormat::Plain
    }
}

impl TryFrom<u8> for CallFormat {
    type Error = u8;
    fn try_from(v: u8) -> Result<Self, u8> {
        match v {
            0 => Ok(Self::Plain),
            1 => Ok(Self::EncryptedX25519DeoxysII),
            other => Err(other),
        }
    }
}

impl Serialize for CallFormat {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for CallFormat {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = u8::deserialize(d)?;
        Self::try_from(v)
            .map_err(|v| serde::de::Error::custom(format!("unknown call format {v}")))
    }
}

impl AddressSpec {
    /// Whether `pk` may sign for this spec.
    pub fn accepts(&self, pk: &PublicKey) -> bool {
        match self {
            Self::Signature(spec) => spec.public_key() == *pk,
            Self::Multisig(cfg) => cfg.signers.iter().any(|s| s.public_key == *pk),
        }
    }
}

impl CallResult {
    /// Whether the call did not fail. `Unknown` counts as success here since
    /// only the format-specific decoder can tell.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
