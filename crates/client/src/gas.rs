//! Nonces, gas and fees.

use crate::{Client, Error, RuntimeClient};
use paratime_types::{
    Address, BaseUnits, CallerAddress, Denomination, Round, Transaction,
};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const NONCE_METHOD: &str = "accounts.Nonce";
const ESTIMATE_GAS_METHOD: &str = "core.EstimateGas";
const MIN_GAS_PRICE_METHOD: &str = "core.MinGasPrice";

/// Gas limit sent with a transaction being estimated. The runtime
/// simulates it with its own upper bound.
const PLACEHOLDER_GAS: u64 = 0;

#[derive(Serialize)]
struct NonceQuery {
    address: Address,
}

/// Arguments of the runtime's gas estimation query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateGasQuery {
    /// Account to simulate the call from. Defaults to the first signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<CallerAddress>,
    /// The transaction to simulate.
    pub tx: Transaction,
    /// Report a failing simulation as an error rather than an estimate.
    #[serde(default)]
    pub propagate_failures: bool,
}

impl<C: RuntimeClient> Client<C> {
    /// The next nonce of `address` at `round`.
    ///
    /// This is the runtime's answer as is. Nothing is cached or predicted,
    /// so concurrent submissions from one account must coordinate.
    pub async fn next_nonce(&self, round: Round, address: Address) -> Result<u64, Error> {
        self.query(round, NONCE_METHOD, &NonceQuery { address }).await
    }

    /// Estimate the gas `tx` needs, plus the configured headroom.
    ///
    /// Fails with [`Error::ConfidentialGasEstimation`] for sealed calls, as
    /// the runtime cannot simulate those faithfully. Set their gas limit by
    /// hand.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub async fn estimate_gas(
        &self,
        round: Round,
        tx: &Transaction,
        caller: Option<CallerAddress>,
    ) -> Result<u64, Error> {
        if tx.call.is_encrypted() {
            return Err(Error::ConfidentialGasEstimation);
        }
        let mut tx = tx.clone();
        tx.set_fee_gas(PLACEHOLDER_GAS);
        let query = EstimateGasQuery {
            caller,
            tx,
            propagate_failures: false,
        };
        let estimate: u64 = self.query(round, ESTIMATE_GAS_METHOD, &query).await?;
        let gas = with_headroom(estimate, self.config.gas_headroom_percent);
        #[cfg(feature = "tracing")]
        tracing::debug!(estimate, gas, "estimated gas");
        Ok(gas)
    }

    /// Minimum gas price per accepted fee denomination.
    pub async fn min_gas_price(&self, round: Round) -> Result<BTreeMap<Denomination, u128>, Error> {
        self.query(round, MIN_GAS_PRICE_METHOD, &()).await
    }

    /// Minimum gas price in `denomination`.
    pub async fn gas_price(&self, round: Round, denomination: &Denomination) -> Result<u128, Error> {
        self.min_gas_price(round)
            .await?
            .get(denomination)
            .copied()
            .ok_or_else(|| Error::UnsupportedDenomination(denomination.clone()))
    }

    /// Set the fee amount of `tx` to its gas limit at the minimum gas price,
    /// keeping the fee's denomination.
    pub async fn fill_fee(&self, round: Round, tx: &mut Transaction) -> Result<(), Error> {
        let denomination = tx.auth_info.fee.amount.denomination.clone();
        let price = self.gas_price(round, &denomination).await?;
        let amount = fee_amount(price, tx.fee_gas());
        tx.set_fee_amount(BaseUnits::new(amount, denomination));
        Ok(())
    }
}

/// The fee for `gas` at `price`, exactly.
pub(crate) fn fee_amount(price: u128, gas: u64) -> BigUint {
    BigUint::from(price) * gas
}

/// `gas` increased by `percent` percent, saturating.
pub(crate) fn with_headroom(gas: u64, percent: u64) -> u64 {
    gas.saturating_add(gas.saturating_mul(percent) / 100)
}
