use crate::{context::signing_payload, Error};
use paratime_types::{multisig, PublicKey, Signature};
use secp256k1::{Message, Secp256k1};
use sha2::Digest;

/// Verify a signature over `message` under `context`.
pub fn verify(
    pk: &PublicKey,
    context: &[u8],
    message: &[u8],
    signature: &Signature,
) -> Result<(), Error> {
    match pk {
        PublicKey::Ed25519(pk) => {
            let key = ed25519_dalek::VerifyingKey::from_bytes(pk)
                .map_err(|_| Error::MalformedPublicKey("ed25519"))?;
            let sig = ed25519_dalek::Signature::from_slice(&signature.0)
                .map_err(|_| Error::MalformedSignature("ed25519"))?;
            let digest = signing_payload(context, message);
            key.verify_strict(&digest, &sig)
                .map_err(|_| Error::VerificationFailed)
        }
        PublicKey::Secp256k1(pk) => {
            let key = secp256k1::PublicKey::from_slice(pk)
                .map_err(|_| Error::MalformedPublicKey("secp256k1"))?;
            let sig = secp256k1::ecdsa::Signature::from_der(&signature.0)
                .map_err(|_| Error::MalformedSignature("secp256k1"))?;
            let digest = signing_payload(context, message);
            Secp256k1::verification_only()
                .verify_ecdsa(&Message::from_digest(digest), &sig, &key)
                .map_err(|_| Error::VerificationFailed)
        }
        PublicKey::Sr25519(pk) => {
            let key = schnorrkel::PublicKey::from_bytes(pk)
                .map_err(|_| Error::MalformedPublicKey("sr25519"))?;
            let sig = schnorrkel::Signature::from_bytes(&signature.0)
                .map_err(|_| Error::MalformedSignature("sr25519"))?;
            let transcript = schnorrkel::signing_context(context)
                .hash256(sha2::Sha512_256::new().chain_update(message));
            key.verify(transcript, &sig)
                .map_err(|_| Error::VerificationFailed)
        }
    }
}

/// Verify a multisig signature set over `message` under `context`.
///
/// The set must reach the configuration's threshold and every present
/// signature must verify.
pub fn verify_multisig(
    config: &multisig::Config,
    set: &[Option<Signature>],
    context: &[u8],
    message: &[u8],
) -> Result<(), Error> {
    let (pks, sigs) = config.batch(set)?;
    for (pk, sig) in pks.iter().zip(&sigs) {
        verify(pk, context, message, sig)?;
    }
    Ok(())
}
