//! Address derivation.
//!
//! `address = version || SHA-512/256(context || version || data)[..20]`
//!
//! The context names the credential type so that identical bytes under
//! different schemes never collide. Secp256k1 keys derive from their
//! 20-byte Ethereum address rather than the key itself, so Ethereum wallets
//! and the runtime agree on the same account.

use crate::hash_parts;
use paratime_types::{
    address::{ADDRESS_SIZE, ADDRESS_VERSION_SIZE, ETH_ADDRESS_SIZE},
    crypto::SECP256K1_PUBLIC_KEY_SIZE,
    multisig, Address,
};
use thiserror::Error;

/// Version of every currently defined address.
pub const ADDRESS_V0_VERSION: u8 = 0;

/// Context for Ed25519 addresses.
pub const ADDRESS_V0_ED25519_CONTEXT: &[u8] = b"oasis-core/address: staking";

/// Context for Ethereum-compatible Secp256k1 addresses.
pub const ADDRESS_V0_SECP256K1ETH_CONTEXT: &[u8] = b"oasis-runtime-sdk/address: secp256k1eth";

/// Context for Sr25519 addresses.
pub const ADDRESS_V0_SR25519_CONTEXT: &[u8] = b"oasis-runtime-sdk/address: sr25519";

/// Context for multisig addresses.
pub const ADDRESS_V0_MULTISIG_CONTEXT: &[u8] = b"oasis-runtime-sdk/address: multisig";

/// Context for module-owned addresses.
pub const ADDRESS_V0_MODULE_CONTEXT: &[u8] = b"oasis-runtime-sdk/address: module";

/// A credential that cannot be mapped to an address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The Secp256k1 public key is not a valid curve point.
    #[error("invalid secp256k1 public key: {0}")]
    InvalidSecp256k1Key(#[from] secp256k1::Error),
}

/// Derive an address from a context, version and payload.
pub fn from_context(context: &[u8], version: u8, data: &[u8]) -> Address {
    let h = hash_parts(&[context, &[version], data]);
    let mut addr = [0u8; ADDRESS_SIZE];
    addr[0] = version;
    addr[ADDRESS_VERSION_SIZE..].copy_from_slice(&h[..ADDRESS_SIZE - ADDRESS_VERSION_SIZE]);
    Address(addr)
}

/// Address of an Ed25519 public key.
pub fn from_ed25519(pk: &[u8; 32]) -> Address {
    from_context(ADDRESS_V0_ED25519_CONTEXT, ADDRESS_V0_VERSION, pk)
}

/// Address of an Sr25519 public key.
pub fn from_sr25519(pk: &[u8; 32]) -> Address {
    from_context(ADDRESS_V0_SR25519_CONTEXT, ADDRESS_V0_VERSION, pk)
}

/// Address of an Ethereum account.
pub fn from_eth(eth_address: &[u8; ETH_ADDRESS_SIZE]) -> Address {
    from_context(
        ADDRESS_V0_SECP256K1ETH_CONTEXT,
        ADDRESS_V0_VERSION,
        eth_address,
    )
}

/// Address of a compressed Secp256k1 public key, via its Ethereum address.
pub fn from_secp256k1eth(pk: &[u8; SECP256K1_PUBLIC_KEY_SIZE]) -> Result<Address, AddressError> {
    Ok(from_eth(&eth_address(pk)?))
}

/// Address of a multisig configuration.
///
/// The payload is the canonical encoding of the whole configuration, so
/// reordering signers or changing any weight yields a different address.
pub fn from_multisig(config: &multisig::Config) -> Address {
    from_context(
        ADDRESS_V0_MULTISIG_CONTEXT,
        ADDRESS_V0_VERSION,
        &crate::serialize(config),
    )
}

/// Address owned by a runtime module, e.g. a contract instance.
pub fn from_module(module: &str, kind: &[u8]) -> Address {
    let mut data = Vec::with_capacity(module.len() + 1 + kind.len());
    data.extend_from_slice(module.as_bytes());
    data.push(b'.');
    data.extend_from_slice(kind);
    from_context(ADDRESS_V0_MODULE_CONTEXT, ADDRESS_V0_VERSION, &data)
}

/// The Ethereum address of a compressed Secp256k1 public key: the last 20
/// bytes of the Keccak-256 hash of the untagged uncompressed point.
pub fn eth_address(
    pk: &[u8; SECP256K1_PUBLIC_KEY_SIZE],
) -> Result<[u8; ETH_ADDRESS_SIZE], AddressError> {
    let pk = secp256k1::PublicKey::from_slice(pk)?;
    let uncompressed = pk.serialize_uncompressed();
    let h = crate::keccak256(&uncompressed[1..]);
    let mut out = [0u8; ETH_ADDRESS_SIZE];
    out.copy_from_slice(&h[h.len() - ETH_ADDRESS_SIZE..]);
    Ok(out)
}
