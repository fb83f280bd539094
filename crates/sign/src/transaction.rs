//! Transaction authorization.
//!
//! A [`TransactionSigner`] freezes a transaction's canonical encoding once
//! and accumulates one proof per signer slot over those exact bytes. Slots
//! may be signed in any order and signatures may be produced elsewhere and
//! attached with [`TransactionSigner::append_signature`].

use crate::{verify, verify_multisig, Error, Signer};
use paratime_types::{
    multisig::SignatureSet, AddressSpec, AuthProof, Hash, PublicKey, Signature, Transaction,
    UnverifiedTransaction,
};

/// Progress of a [`TransactionSigner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningState {
    /// No slot holds a signature.
    Unsigned,
    /// Some slots hold signatures, but not every slot has one yet.
    PartiallySigned,
    /// Every slot holds at least one signature.
    ///
    /// A multisig slot counts once any of its signers signed, whether or not
    /// it reaches its threshold. [`TransactionSigner::finalize`] checks the
    /// weight.
    FullySigned,
}

/// Proof accumulated for one signer slot.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Slot {
    Signature(Option<Signature>),
    Multisig(SignatureSet),
}

/// Signs a frozen transaction body for every signer slot.
#[derive(Clone, Debug)]
pub struct TransactionSigner {
    tx: Transaction,
    body: Vec<u8>,
    context: Vec<u8>,
    slots: Vec<Slot>,
}

impl TransactionSigner {
    /// Freeze `tx` for signing under `context`.
    ///
    /// The body is encoded exactly once, here.
    pub fn new(tx: Transaction, context: Vec<u8>) -> Self {
        let body = paratime_hash::serialize(&tx);
        let slots = tx
            .auth_info
            .signer_info
            .iter()
            .map(|si| match &si.address_spec {
                AddressSpec::Signature(_) => Slot::Signature(None),
                AddressSpec::Multisig(config) => Slot::Multisig(vec![None; config.signers.len()]),
            })
            .collect();
        Self {
            tx,
            body,
            context,
            slots,
        }
    }

    /// The transaction being signed.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// The frozen encoding every signature covers.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The signing context.
    pub fn context(&self) -> &[u8] {
        &self.context
    }

    /// Sign with `signer` for every slot that accepts its public key.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub fn append_sign<S: Signer + ?Sized>(&mut self, signer: &S) -> Result<(), Error> {
        let pk = signer.public_key();
        if !self.accepts(&pk) {
            return Err(Error::SignerNotFound(pk));
        }
        let signature = signer.sign(&self.context, &self.body)?;
        self.place(&pk, signature);
        #[cfg(feature = "tracing")]
        tracing::debug!(signer = %pk, state = ?self.state(), "appended signature");
        Ok(())
    }

    /// Attach a signature produced elsewhere.
    ///
    /// The signature is verified against the frozen body before it is
    /// stored.
    pub fn append_signature(&mut self, pk: PublicKey, signature: Signature) -> Result<(), Error> {
        if !self.accepts(&pk) {
            return Err(Error::SignerNotFound(pk));
        }
        verify(&pk, &self.context, &self.body, &signature)?;
        self.place(&pk, signature);
        Ok(())
    }

    /// Current progress.
    pub fn state(&self) -> SigningState {
        let attempted = |slot: &Slot| match slot {
            Slot::Signature(sig) => sig.is_some(),
            Slot::Multisig(set) => set.iter().any(Option::is_some),
        };
        if self.slots.is_empty() || !self.slots.iter().any(attempted) {
            SigningState::Unsigned
        } else if self.slots.iter().all(attempted) {
            SigningState::FullySigned
        } else {
            SigningState::PartiallySigned
        }
    }

    /// Produce the transaction to submit.
    ///
    /// Fails if any slot is unsigned or any multisig slot falls short of its
    /// threshold, even when [`TransactionSigner::state`] reports
    /// [`SigningState::FullySigned`]. The runtime remains the authority on
    /// validity.
    pub fn finalize(self) -> Result<UnverifiedTransaction, Error> {
        let mut proofs = Vec::with_capacity(self.slots.len());
        for (ix, (slot, si)) in self
            .slots
            .into_iter()
            .zip(&self.tx.auth_info.signer_info)
            .enumerate()
        {
            match (slot, &si.address_spec) {
                (Slot::Signature(Some(sig)), _) => proofs.push(AuthProof::Signature(sig)),
                (Slot::Signature(None), _) => return Err(Error::MissingSignature(ix)),
                (Slot::Multisig(set), AddressSpec::Multisig(config)) => {
                    if let Err(e) = config.batch(&set) {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(slot = ix, "refusing multisig proof: {e}");
                        return Err(e.into());
                    }
                    proofs.push(AuthProof::Multisig(set));
                }
                (Slot::Multisig(_), AddressSpec::Signature(_)) => {
                    return Err(Error::ProofMismatch(ix))
                }
            }
        }
        Ok(UnverifiedTransaction(self.body, proofs))
    }

    fn accepts(&self, pk: &PublicKey) -> bool {
        self.tx
            .auth_info
            .signer_info
            .iter()
            .any(|si| si.address_spec.accepts(pk))
    }

    fn place(&mut self, pk: &PublicKey, signature: Signature) {
        for (slot, si) in self.slots.iter_mut().zip(&self.tx.auth_info.signer_info) {
            match (slot, &si.address_spec) {
                (Slot::Signature(sig), AddressSpec::Signature(spec)) => {
                    if spec.public_key() == *pk {
                        *sig = Some(signature.clone());
                    }
                }
                (Slot::Multisig(set), AddressSpec::Multisig(config)) => {
                    for (entry, signer) in set.iter_mut().zip(&config.signers) {
                        if signer.public_key == *pk {
                            *entry = Some(signature.clone());
                        }
                    }
                }
                _ => (),
            }
        }
    }
}

/// Verify every proof of `utx` under `context` and return the decoded
/// transaction.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
pub fn verify_transaction(
    utx: &UnverifiedTransaction,
    context: &[u8],
) -> Result<Transaction, Error> {
    let UnverifiedTransaction(body, proofs) = utx;
    let tx: Transaction = paratime_hash::deserialize(body)?;
    let signers = &tx.auth_info.signer_info;
    if signers.len() != proofs.len() {
        return Err(Error::ProofCount {
            expected: signers.len(),
            found: proofs.len(),
        });
    }
    for (index, (si, proof)) in signers.iter().zip(proofs).enumerate() {
        let res = match (&si.address_spec, proof) {
            (AddressSpec::Signature(spec), AuthProof::Signature(sig)) => {
                verify(&spec.public_key(), context, body, sig)
            }
            (AddressSpec::Multisig(config), AuthProof::Multisig(set)) => {
                verify_multisig(config, set, context, body)
            }
            _ => return Err(Error::ProofMismatch(index)),
        };
        res.map_err(|e| Error::InvalidProof {
            index,
            source: Box::new(e),
        })?;
    }
    Ok(tx)
}

/// Hash identifying a submitted transaction.
pub fn transaction_hash(utx: &UnverifiedTransaction) -> Hash {
    paratime_hash::hash(utx)
}
