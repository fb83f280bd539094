//! Deoxys-II-256-128 boxes keyed by an X25519 exchange.
//!
//! The box key is `HMAC-SHA-512/256("MRAE_Box_Deoxys-II-256-128", X25519(sk, pk))`.

use hmac::{Hmac, Mac};
use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};
use zeroize::ZeroizeOnDrop;

/// Size of a Deoxys-II key.
pub const KEY_SIZE: usize = deoxysii::KEY_SIZE;

/// Size of a Deoxys-II nonce.
pub const NONCE_SIZE: usize = deoxysii::NONCE_SIZE;

const BOX_KDF_KEY: &[u8] = b"MRAE_Box_Deoxys-II-256-128";

/// A symmetric box key, wiped on drop.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct BoxKey([u8; KEY_SIZE]);

/// The box could not be opened.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("authentication failed")]
pub struct AuthenticationError;

impl BoxKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Seal `message` with `additional_data` authenticated alongside.
    pub fn seal(&self, nonce: &[u8; NONCE_SIZE], message: &[u8], additional_data: &[u8]) -> Vec<u8> {
        deoxysii::DeoxysII::new(&self.0).seal(nonce, message, additional_data)
    }

    /// Open a box produced by [`BoxKey::seal`].
    pub fn open(
        &self,
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
        additional_data: &[u8],
    ) -> Result<Vec<u8>, AuthenticationError> {
        let mut ciphertext = ciphertext.to_vec();
        deoxysii::DeoxysII::new(&self.0)
            .open(nonce, &mut ciphertext, additional_data)
            .map_err(|_| AuthenticationError)
    }
}

impl std::fmt::Debug for BoxKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxKey(..)")
    }
}

/// Derive the box key from an X25519 shared secret.
pub fn kdf(shared: &SharedSecret) -> BoxKey {
    let mut mac = <Hmac<sha2::Sha512_256> as Mac>::new_from_slice(BOX_KDF_KEY)
        .expect("HMAC should accept keys of any length");
    mac.update(shared.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest[..KEY_SIZE]);
    BoxKey(key)
}

/// Derive the box key shared by `private_key` and `public_key`.
pub fn derive_symmetric(public_key: &[u8; 32], private_key: &[u8; 32]) -> BoxKey {
    let secret = StaticSecret::from(*private_key);
    kdf(&secret.diffie_hellman(&PublicKey::from(*public_key)))
}

/// Seal `message` for the holder of the secret key behind `public_key`.
pub fn box_seal(
    nonce: &[u8; NONCE_SIZE],
    message: &[u8],
    additional_data: &[u8],
    public_key: &[u8; 32],
    private_key: &[u8; 32],
) -> Vec<u8> {
    derive_symmetric(public_key, private_key).seal(nonce, message, additional_data)
}

/// Open a box sealed with [`box_seal`] by the holder of the secret key
/// behind `public_key`.
pub fn box_open(
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    additional_data: &[u8],
    public_key: &[u8; 32],
    private_key: &[u8; 32],
) -> Result<Vec<u8>, AuthenticationError> {
    derive_symmetric(public_key, private_key).open(nonce, ciphertext, additional_data)
}
