//! Transaction assembly and the signing state machine.
//!
//! ```plain
//! Unsigned --append_sign--> PartiallySigned --...--> FullySigned --finalize--> SignedTransaction
//! ```
//!
//! While unsigned the transaction may be edited and its call encoded. The
//! first signature freezes the body: every later signature covers the same
//! bytes and every later edit fails with [`Error::BodyFrozen`].

use crate::Error;
use paratime_callformat::Metadata;
use paratime_sign::{
    context::{self, ChainContext},
    transaction::{transaction_hash, TransactionSigner},
    Signer,
};
use paratime_types::{
    callformat::CallDataPublicKey, multisig, BaseUnits, CallFormat, Hash, PublicKey, Signature,
    SignatureAddressSpec, Transaction, UnverifiedTransaction,
};

pub use paratime_sign::transaction::SigningState;

/// Assembles, encodes and signs one transaction.
#[derive(Debug)]
pub struct TransactionBuilder {
    context: Vec<u8>,
    tx: Transaction,
    /// Present once the body is frozen.
    signer: Option<TransactionSigner>,
    meta: Metadata,
}

/// A fully authorized transaction, ready to submit.
#[derive(Debug)]
pub struct SignedTransaction {
    pub(crate) utx: UnverifiedTransaction,
    pub(crate) context: Vec<u8>,
    pub(crate) meta: Metadata,
}

impl TransactionBuilder {
    /// Start building `tx` for the chain identified by `chain_context`.
    pub fn new(tx: Transaction, chain_context: &ChainContext) -> Self {
        Self {
            context: context::tx_context(chain_context),
            tx,
            signer: None,
            meta: Metadata::Plain,
        }
    }

    /// The transaction as it will be or was signed.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Mutable access to the transaction until signing starts.
    pub fn transaction_mut(&mut self) -> Result<&mut Transaction, Error> {
        match self.signer {
            None => Ok(&mut self.tx),
            Some(_) => Err(Error::BodyFrozen),
        }
    }

    /// Add a single-signature signer slot.
    pub fn append_auth_signature(
        &mut self,
        spec: SignatureAddressSpec,
        nonce: u64,
    ) -> Result<(), Error> {
        self.transaction_mut()?.append_auth_signature(spec, nonce);
        Ok(())
    }

    /// Add a multisig signer slot.
    pub fn append_auth_multisig(&mut self, config: multisig::Config, nonce: u64) -> Result<(), Error> {
        self.transaction_mut()?.append_auth_multisig(config, nonce);
        Ok(())
    }

    /// Set the gas limit.
    pub fn set_fee_gas(&mut self, gas: u64) -> Result<(), Error> {
        self.transaction_mut()?.set_fee_gas(gas);
        Ok(())
    }

    /// Set the fee amount.
    pub fn set_fee_amount(&mut self, amount: BaseUnits) -> Result<(), Error> {
        self.transaction_mut()?.set_fee_amount(amount);
        Ok(())
    }

    /// Encode the call in `format`.
    ///
    /// Encrypted formats need the runtime's call data public key. A call can
    /// only be encoded once, before signing.
    pub fn encode_call(
        &mut self,
        format: CallFormat,
        public_key: Option<&CallDataPublicKey>,
    ) -> Result<(), Error> {
        if !matches!(self.meta, Metadata::Plain) {
            return Err(Error::CallAlreadyEncoded);
        }
        let tx = self.transaction_mut()?;
        if tx.call.is_encrypted() {
            return Err(Error::CallAlreadyEncoded);
        }
        let call = tx.call.clone();
        let (call, meta) = paratime_callformat::encode_call(call, format, public_key)?;
        tx.call = call;
        self.meta = meta;
        Ok(())
    }

    /// What decoding the result of this transaction needs.
    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// Freeze the body for signing.
    ///
    /// Use the returned signer's `body` and `context` to produce
    /// signatures elsewhere. Freezing an already frozen body is a no-op.
    pub fn freeze(&mut self) -> &TransactionSigner {
        self.signer()
    }

    /// Sign every slot `signer` may sign.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub fn append_sign<S: Signer + ?Sized>(&mut self, signer: &S) -> Result<(), Error> {
        self.signer().append_sign(signer)?;
        Ok(())
    }

    /// Attach a signature produced elsewhere over the frozen body.
    pub fn append_signature(&mut self, pk: PublicKey, signature: Signature) -> Result<(), Error> {
        self.signer().append_signature(pk, signature)?;
        Ok(())
    }

    /// Signing progress.
    pub fn state(&self) -> SigningState {
        self.signer
            .as_ref()
            .map_or(SigningState::Unsigned, TransactionSigner::state)
    }

    /// Assemble the proofs into a transaction ready for submission.
    pub fn finalize(self) -> Result<SignedTransaction, Error> {
        let signer = match self.signer {
            Some(signer) => signer,
            None => TransactionSigner::new(self.tx, self.context.clone()),
        };
        Ok(SignedTransaction {
            utx: signer.finalize()?,
            context: self.context,
            meta: self.meta,
        })
    }

    fn signer(&mut self) -> &mut TransactionSigner {
        let (tx, context) = (&self.tx, &self.context);
        self.signer.get_or_insert_with(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!(format = ?tx.call.format, "freezing transaction body");
            TransactionSigner::new(tx.clone(), context.clone())
        })
    }
}

impl SignedTransaction {
    /// The encoded body and its proofs.
    pub fn unverified(&self) -> &UnverifiedTransaction {
        &self.utx
    }

    /// The transaction hash, as the runtime reports it.
    pub fn hash(&self) -> Hash {
        transaction_hash(&self.utx)
    }

    /// What decoding the result of this transaction needs.
    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }
}
