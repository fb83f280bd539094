//! Submission and the sign-and-submit flow.

use crate::{error::into_output, Client, Error, RuntimeClient, SignedTransaction};
use paratime_hash::DeriveAddress;
use paratime_sign::{transaction::verify_transaction, Signer};
use paratime_types::{
    CallFormat, CallerAddress, Hash, PublicKey, Round, SignatureAddressSpec, Transaction, Value,
};

/// The outcome of an included transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Receipt {
    /// The round the transaction was included in.
    pub round: Round,
    /// The transaction hash.
    pub hash: Hash,
    /// The decoded call output.
    pub output: Value,
}

impl<C: RuntimeClient> Client<C> {
    /// Submit `tx` and wait for its result.
    ///
    /// A call the runtime rejects surfaces as [`Error::Module`] with the
    /// runtime's module and code as is.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub async fn submit(&self, tx: SignedTransaction) -> Result<Receipt, Error> {
        if self.config.verify_before_submit {
            verify_transaction(&tx.utx, &tx.context)?;
        }
        let hash = tx.hash();
        let data = paratime_hash::serialize(&tx.utx);
        let submitted = match self.config.submit_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, self.transport.submit_tx(data))
                .await
                .map_err(|_| Error::Timeout(timeout))??,
            None => self.transport.submit_tx(data).await?,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(round = submitted.round, hash = %hex::encode(hash), "transaction included");

        let result = paratime_hash::deserialize(&submitted.output)?;
        let result = paratime_callformat::decode_result(result, &tx.meta)?;
        Ok(Receipt {
            round: submitted.round,
            hash,
            output: into_output(result)?,
        })
    }

    /// Authorize `tx` by `signers`, fill in what is missing, and submit it.
    ///
    /// One single-signature slot is appended per signer at its current
    /// nonce. A zero gas limit is replaced by an estimate and a zero fee
    /// amount by the gas limit at the minimum gas price. Calls sealed in
    /// `format` are re-sealed and re-signed under a refreshed key when the
    /// runtime reports an epoch mismatch, up to the configured number of
    /// retries. The rejected attempt has already used up the signers'
    /// nonces, so every retry starts over from fresh nonces.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(format = ?format), err))]
    pub async fn sign_and_submit<S>(
        &self,
        tx: Transaction,
        format: CallFormat,
        signers: &[S],
    ) -> Result<Receipt, Error>
    where
        S: Signer + Sync,
    {
        if signers.is_empty() {
            return Err(Error::NoSigners);
        }
        if tx.fee_gas() == 0 && format != CallFormat::Plain {
            return Err(Error::ConfidentialGasEstimation);
        }

        let mut attempt = 0;
        loop {
            let prepared = self.prepare(tx.clone(), signers).await?;
            let key = match format {
                CallFormat::Plain => None,
                CallFormat::EncryptedX25519DeoxysII => Some(self.call_data_public_key().await?),
            };
            let mut builder = self.builder(prepared);
            builder.encode_call(format, key.as_ref())?;
            for signer in signers {
                builder.append_sign(signer)?;
            }
            let result = self.submit(builder.finalize()?).await;
            match (result, key) {
                (Err(e), Some(key))
                    if e.is_epoch_mismatch() && attempt < self.config.max_epoch_retries =>
                {
                    attempt += 1;
                    #[cfg(feature = "tracing")]
                    tracing::debug!(epoch = key.epoch, attempt, "call key epoch passed, retrying");
                    self.invalidate_call_data_public_key(key.epoch);
                }
                (result, _) => return result,
            }
        }
    }

    /// Append a slot per signer at its current nonce, then fill in a zero
    /// gas limit and fee amount.
    async fn prepare<S: Signer>(
        &self,
        mut tx: Transaction,
        signers: &[S],
    ) -> Result<Transaction, Error> {
        let round = self.latest_round().await?;
        for signer in signers {
            let spec = SignatureAddressSpec::from(signer.public_key());
            let nonce = self.next_nonce(round, spec.address()?).await?;
            tx.append_auth_signature(spec, nonce);
        }

        // Estimate only once every signer slot is present, as each adds to
        // the cost.
        if tx.fee_gas() == 0 {
            let from = signers
                .first()
                .map(|signer| caller(&signer.public_key()))
                .transpose()?;
            let gas = self.estimate_gas(round, &tx, from).await?;
            tx.set_fee_gas(gas);
        }
        if tx.auth_info.fee.amount.is_zero() {
            self.fill_fee(round, &mut tx).await?;
        }
        Ok(tx)
    }
}

/// The account gas is estimated for.
fn caller(pk: &PublicKey) -> Result<CallerAddress, Error> {
    Ok(match pk {
        PublicKey::Secp256k1(pk) => CallerAddress::EthAddress(paratime_hash::address::eth_address(pk)?),
        pk => CallerAddress::Address(SignatureAddressSpec::from(*pk).address()?),
    })
}
