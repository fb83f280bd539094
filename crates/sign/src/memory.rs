//! Signers holding their secret key in memory.

use crate::{context::signing_payload, Error, Signer};
use ed25519_dalek::Signer as _;
use paratime_types::{PublicKey, Signature};
use rand::{CryptoRng, RngCore};
use secp256k1::{Message, Secp256k1, SecretKey};
use sha2::Digest;

/// Size of every supported secret key seed.
pub const SECRET_KEY_SIZE: usize = 32;

/// An Ed25519 key.
///
/// Signs `SHA-512/256(context || message)` with pure Ed25519.
pub struct Ed25519Signer(ed25519_dalek::SigningKey);

/// A Secp256k1 key.
///
/// Signs `SHA-512/256(context || message)` with ECDSA and DER encodes the
/// result. Raw signing takes a 32-byte digest and yields `r || s || v`.
pub struct Secp256k1Signer {
    secret: SecretKey,
    public: secp256k1::PublicKey,
}

/// An Sr25519 key, expanded from a mini secret key in Ed25519 mode.
pub struct Sr25519Signer(schnorrkel::Keypair);

fn random_seed<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; SECRET_KEY_SIZE] {
    let mut seed = [0u8; SECRET_KEY_SIZE];
    rng.fill_bytes(&mut seed);
    seed
}

impl Ed25519Signer {
    /// Construct from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SECRET_KEY_SIZE]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(seed))
    }

    /// Generate a fresh key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_seed(&random_seed(rng))
    }
}

impl Secp256k1Signer {
    /// Construct from a 32-byte secret scalar.
    pub fn from_seed(seed: &[u8; SECRET_KEY_SIZE]) -> Result<Self, Error> {
        let secret =
            SecretKey::from_slice(seed).map_err(|_| Error::MalformedSecretKey("secp256k1"))?;
        let public = secp256k1::PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok(Self { secret, public })
    }

    /// Generate a fresh key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secp = Secp256k1::signing_only();
        let (secret, public) = secp.generate_keypair(rng);
        Self { secret, public }
    }

    /// Produce a recoverable signature over a 32-byte digest as
    /// `r || s || v` with `v` the bare recovery id.
    pub fn sign_digest_recoverable(&self, digest: [u8; 32]) -> [u8; 65] {
        let secp = Secp256k1::signing_only();
        let (rec_id, sig) = secp
            .sign_ecdsa_recoverable(&Message::from_digest(digest), &self.secret)
            .serialize_compact();
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig);
        // Recovery ids are always in 0..=3.
        out[64] = rec_id.to_i32() as u8;
        out
    }
}

impl Sr25519Signer {
    /// Construct from a 32-byte mini secret key.
    pub fn from_seed(seed: &[u8; SECRET_KEY_SIZE]) -> Result<Self, Error> {
        let mini = schnorrkel::MiniSecretKey::from_bytes(seed)
            .map_err(|_| Error::MalformedSecretKey("sr25519"))?;
        Ok(Self(
            mini.expand_to_keypair(schnorrkel::ExpansionMode::Ed25519),
        ))
    }

    /// Generate a fresh key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mini = schnorrkel::MiniSecretKey::from_bytes(&random_seed(rng))
            .expect("32 bytes should always form a valid mini secret key");
        Self(mini.expand_to_keypair(schnorrkel::ExpansionMode::Ed25519))
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> PublicKey {
        PublicKey::Ed25519(self.0.verifying_key().to_bytes())
    }

    fn sign(&self, context: &[u8], message: &[u8]) -> Result<Signature, Error> {
        let digest = signing_payload(context, message);
        Ok(Signature(self.0.sign(&digest).to_bytes().to_vec()))
    }

    fn sign_raw(&self, message: &[u8]) -> Result<Signature, Error> {
        Ok(Signature(self.0.sign(message).to_bytes().to_vec()))
    }
}

impl Signer for Secp256k1Signer {
    fn public_key(&self) -> PublicKey {
        PublicKey::Secp256k1(self.public.serialize())
    }

    fn sign(&self, context: &[u8], message: &[u8]) -> Result<Signature, Error> {
        let digest = signing_payload(context, message);
        let secp = Secp256k1::signing_only();
        let sig = secp.sign_ecdsa(&Message::from_digest(digest), &self.secret);
        Ok(Signature(sig.serialize_der().to_vec()))
    }

    fn sign_raw(&self, message: &[u8]) -> Result<Signature, Error> {
        let digest: [u8; 32] = message
            .try_into()
            .map_err(|_| Error::UnsupportedRawSigning("secp256k1 messages that are not digests"))?;
        Ok(Signature(self.sign_digest_recoverable(digest).to_vec()))
    }
}

impl Signer for Sr25519Signer {
    fn public_key(&self) -> PublicKey {
        PublicKey::Sr25519(self.0.public.to_bytes())
    }

    fn sign(&self, context: &[u8], message: &[u8]) -> Result<Signature, Error> {
        let transcript = schnorrkel::signing_context(context)
            .hash256(sha2::Sha512_256::new().chain_update(message));
        Ok(Signature(self.0.sign(transcript).to_bytes().to_vec()))
    }

    fn sign_raw(&self, _message: &[u8]) -> Result<Signature, Error> {
        Err(Error::UnsupportedRawSigning("sr25519"))
    }
}
