//! EIP-712 signed call data for leashed EVM simulate calls.
//!
//! A simulate call normally runs with an anonymous caller. Signing the call
//! parameters together with a [`Leash`] proves the caller's identity for a
//! short window of blocks, which confidential contracts rely on for view
//! calls that depend on `msg.sender`.
//!
//! The signature covers the plaintext call data. The returned pack's
//! [`SignedCallDataPack::data`] may be replaced by its encrypted form
//! afterwards.

use crate::{Error, Signer};
use num_bigint::BigUint;
use paratime_types::{
    address::ETH_ADDRESS_SIZE,
    evm::{Leash, SignedCallDataPack, RSV_SIGNATURE_SIZE},
    Call, CallFormat, Hash, PublicKey, Value,
};

/// EIP-712 domain name.
pub const DOMAIN_NAME: &str = "oasis-runtime-sdk/evm: signed query";

/// EIP-712 domain version.
pub const DOMAIN_VERSION: &str = "1.0.0";

const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version,uint256 chainId)";

const LEASH_TYPE: &str =
    "Leash(uint64 nonce,uint64 blockNumber,bytes32 blockHash,uint64 blockRange)";

const CALL_TYPE: &str = concat!(
    "Call(address from,address to,uint64 gasLimit,uint256 gasPrice,uint256 value,bytes data,Leash leash)",
    "Leash(uint64 nonce,uint64 blockNumber,bytes32 blockHash,uint64 blockRange)",
);

/// Ethereum wallets emit `v` offset by this much.
const RECOVERY_ID_OFFSET: u8 = 27;

/// Parameters of an EVM simulate call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulateCall {
    /// Ethereum address of the caller.
    pub caller: [u8; ETH_ADDRESS_SIZE],
    /// Ethereum address of the callee.
    pub address: [u8; ETH_ADDRESS_SIZE],
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas price.
    pub gas_price: BigUint,
    /// Value transferred.
    pub value: BigUint,
    /// ABI encoded call data.
    pub data: Vec<u8>,
}

/// The EIP-712 digest of `call` and `leash` for chain `chain_id`.
pub fn typed_data_digest(chain_id: u64, call: &SimulateCall, leash: &Leash) -> Result<Hash, Error> {
    let domain = hash_struct(&[
        keccak(DOMAIN_TYPE.as_bytes()),
        keccak(DOMAIN_NAME.as_bytes()),
        keccak(DOMAIN_VERSION.as_bytes()),
        word_u64(chain_id),
    ]);
    let leash_hash = hash_struct(&[
        keccak(LEASH_TYPE.as_bytes()),
        word_u64(leash.nonce),
        word_u64(leash.block_number),
        leash.block_hash,
        word_u64(leash.block_range),
    ]);
    let call_hash = hash_struct(&[
        keccak(CALL_TYPE.as_bytes()),
        word_address(&call.caller),
        word_address(&call.address),
        word_u64(call.gas_limit),
        word_u256(&call.gas_price, "gas price")?,
        word_u256(&call.value, "value")?,
        keccak(&call.data),
        leash_hash,
    ]);
    let mut encoded = Vec::with_capacity(2 + 32 + 32);
    encoded.extend_from_slice(b"\x19\x01");
    encoded.extend_from_slice(&domain);
    encoded.extend_from_slice(&call_hash);
    Ok(keccak(&encoded))
}

/// Sign `call` for chain `chain_id`, leashed to `leash`.
///
/// `signer` must hold a Secp256k1 key that controls `call.caller`, and
/// sign raw 32-byte digests in `r || s || v` form.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
pub fn sign_call_data_pack<S: Signer + ?Sized>(
    signer: &S,
    chain_id: u64,
    call: &SimulateCall,
    leash: Leash,
) -> Result<SignedCallDataPack, Error> {
    let PublicKey::Secp256k1(pk) = signer.public_key() else {
        return Err(Error::UnsupportedRawSigning("typed data with a non-secp256k1 key"));
    };
    let eth = paratime_hash::address::eth_address(&pk)
        .map_err(|_| Error::MalformedPublicKey("secp256k1"))?;
    if eth != call.caller {
        return Err(Error::AddressMismatch);
    }
    let digest = typed_data_digest(chain_id, call, &leash)?;
    let raw = signer.sign_raw(&digest)?;
    let mut signature: [u8; RSV_SIGNATURE_SIZE] = raw
        .0
        .as_slice()
        .try_into()
        .map_err(|_| Error::MalformedSignature("secp256k1"))?;
    if signature[RSV_SIGNATURE_SIZE - 1] < RECOVERY_ID_OFFSET {
        signature[RSV_SIGNATURE_SIZE - 1] += RECOVERY_ID_OFFSET;
    }
    Ok(SignedCallDataPack {
        data: Call {
            format: CallFormat::Plain,
            method: String::new(),
            body: Value::Bytes(call.data.clone()),
            read_only: false,
        },
        leash,
        signature,
    })
}

/// Recover the Ethereum address that signed `pack` for `call`.
pub fn recover_signer(
    chain_id: u64,
    call: &SimulateCall,
    pack: &SignedCallDataPack,
) -> Result<[u8; ETH_ADDRESS_SIZE], Error> {
    use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};

    let digest = typed_data_digest(chain_id, call, &pack.leash)?;
    let mut v = pack.signature[RSV_SIGNATURE_SIZE - 1];
    if v >= RECOVERY_ID_OFFSET {
        v -= RECOVERY_ID_OFFSET;
    }
    let rec_id =
        RecoveryId::from_i32(i32::from(v)).map_err(|_| Error::MalformedSignature("secp256k1"))?;
    let sig = RecoverableSignature::from_compact(&pack.signature[..64], rec_id)
        .map_err(|_| Error::MalformedSignature("secp256k1"))?;
    let pk = secp256k1::Secp256k1::verification_only()
        .recover_ecdsa(&secp256k1::Message::from_digest(digest), &sig)
        .map_err(|_| Error::VerificationFailed)?;
    paratime_hash::address::eth_address(&pk.serialize())
        .map_err(|_| Error::MalformedPublicKey("secp256k1"))
}

fn keccak(bytes: &[u8]) -> Hash {
    paratime_hash::keccak256(bytes)
}

fn hash_struct(words: &[[u8; 32]]) -> Hash {
    keccak(&words.concat())
}

fn word_u64(v: u64) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[24..].copy_from_slice(&v.to_be_bytes());
    w
}

fn word_address(addr: &[u8; ETH_ADDRESS_SIZE]) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[32 - ETH_ADDRESS_SIZE..].copy_from_slice(addr);
    w
}

fn word_u256(v: &BigUint, what: &'static str) -> Result<[u8; 32], Error> {
    let bytes = v.to_bytes_be();
    if bytes.len() > 32 {
        return Err(Error::Overflow(what));
    }
    let mut w = [0u8; 32];
    w[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(w)
}
