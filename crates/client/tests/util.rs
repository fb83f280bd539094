// Cargo treats each test in `tests` as a crate, so for some tests some items
// are considered dead code.
#![allow(dead_code)]

use paratime_callformat::mrae;
use paratime_client::{Client, Config, EstimateGasQuery, RuntimeClient, SubmittedTx, TransportError};
use paratime_hash::DeriveAddress;
use paratime_sign::context::ChainContext;
use paratime_types::{
    callformat::{
        CallDataPublicKey, CallEnvelopeX25519DeoxysII, ResultEnvelopeX25519DeoxysII,
        SignedPublicKey,
    },
    event::Event,
    Address, Call, CallResult, Denomination, Round, Transaction, UnverifiedTransaction, Value,
};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
    time::Duration,
};

pub const RUNTIME_SECRET: [u8; 32] = [7; 32];

/// Method whose plain calls always fail.
pub const FAILING_METHOD: &str = "test.Fail";

/// `core` error codes the node answers with.
pub const CODE_INVALID_METHOD: u32 = 3;
pub const CODE_INVALID_NONCE: u32 = 4;

/// An in-memory paratime node.
///
/// Plain calls echo their body. Sealed calls are opened with
/// [`RUNTIME_SECRET`] and their echoed body sealed back.
#[derive(Default)]
pub struct MockNode {
    state: Mutex<State>,
}

#[derive(Default)]
pub struct State {
    pub latest_round: Round,
    pub nonces: HashMap<Address, u64>,
    pub gas_estimate: u64,
    pub min_gas_price: BTreeMap<Denomination, u128>,
    pub key_epoch: u64,
    /// Reject every sealed call as sealed under a passed epoch.
    pub always_stale: bool,
    /// Corrupt sealed results.
    pub tamper_results: bool,
    /// How long submissions take.
    pub submit_delay: Option<Duration>,
    /// Number of upcoming requests answered with a transient failure.
    pub unavailable: usize,
    /// Answer every request with a permanent failure.
    pub broken: bool,
    pub events: BTreeMap<Round, Vec<Event>>,
    /// Method of every query, in order.
    pub queries: Vec<String>,
    pub estimates: Vec<EstimateGasQuery>,
    pub submitted: Vec<UnverifiedTransaction>,
    /// Calls as the runtime saw them after opening.
    pub executed: Vec<Call>,
    pub event_requests: usize,
}

impl MockNode {
    pub fn new() -> Self {
        let node = Self::default();
        node.with(|s| {
            s.latest_round = 1;
            s.gas_estimate = 1_000;
            s.min_gas_price.insert(Denomination::NATIVE, 2);
            s.key_epoch = 1;
        });
        node
    }

    pub fn with<U>(&self, f: impl FnOnce(&mut State) -> U) -> U {
        f(&mut self.state.lock().unwrap())
    }

    /// Produce the next round with `events`.
    pub fn produce_round(&self, events: Vec<Event>) -> Round {
        self.with(|s| {
            s.latest_round += 1;
            s.events.insert(s.latest_round, events);
            s.latest_round
        })
    }

    pub fn call_data_public_key(epoch: u64) -> CallDataPublicKey {
        let pk = x25519_dalek::PublicKey::from(&x25519_dalek::StaticSecret::from(RUNTIME_SECRET));
        CallDataPublicKey {
            public_key: SignedPublicKey {
                key: pk.to_bytes(),
                ..Default::default()
            },
            epoch,
        }
    }

    fn fail_if_unavailable(&self) -> Result<(), TransportError> {
        self.with(|s| {
            if s.broken {
                return Err(TransportError::Other("broken".into()));
            }
            if s.unavailable > 0 {
                s.unavailable -= 1;
                return Err(TransportError::Unavailable("try later".into()));
            }
            Ok(())
        })
    }

    fn answer_query(&self, round: Round, method: &str, args: &[u8]) -> Result<Value, TransportError> {
        #[derive(Deserialize)]
        struct NonceQuery {
            address: Address,
        }

        self.with(|s| {
            s.queries.push(method.to_string());
            if round != paratime_types::ROUND_LATEST && round > s.latest_round {
                return Err(TransportError::RoundNotAvailable(round));
            }
            let value = match method {
                "accounts.Nonce" => {
                    let q: NonceQuery = paratime_hash::deserialize(args).map_err(bad_args)?;
                    paratime_hash::to_value(&s.nonces.get(&q.address).copied().unwrap_or(0))
                }
                "core.EstimateGas" => {
                    let q: EstimateGasQuery = paratime_hash::deserialize(args).map_err(bad_args)?;
                    s.estimates.push(q);
                    paratime_hash::to_value(&s.gas_estimate)
                }
                "core.MinGasPrice" => paratime_hash::to_value(&s.min_gas_price),
                "core.CallDataPublicKey" => {
                    paratime_hash::to_value(&Self::call_data_public_key(s.key_epoch))
                }
                _ => {
                    return Err(TransportError::Module {
                        module: "core".into(),
                        code: CODE_INVALID_METHOD,
                        message: format!("invalid method: {method}"),
                    })
                }
            };
            Ok(value)
        })
    }

    fn execute(&self, utx: UnverifiedTransaction) -> Result<SubmittedTx, TransportError> {
        self.with(|s| {
            let tx: Transaction = paratime_hash::deserialize(&utx.0).map_err(bad_args)?;
            let signers = tx
                .auth_info
                .signer_info
                .iter()
                .map(|si| Ok((si.address_spec.address().map_err(bad_args)?, si.nonce)))
                .collect::<Result<Vec<_>, TransportError>>()?;
            for (address, nonce) in &signers {
                if s.nonces.get(address).copied().unwrap_or(0) != *nonce {
                    return Err(TransportError::Module {
                        module: "core".into(),
                        code: CODE_INVALID_NONCE,
                        message: "invalid nonce".into(),
                    });
                }
            }
            // Authentication uses up the nonces, whatever the call does next.
            for (address, nonce) in signers {
                s.nonces.insert(address, nonce + 1);
            }
            s.submitted.push(utx);
            s.latest_round += 1;
            let round = s.latest_round;

            let result = if tx.call.is_encrypted() {
                let envelope: CallEnvelopeX25519DeoxysII =
                    paratime_hash::from_value(tx.call.body).map_err(bad_args)?;
                if s.always_stale || envelope.epoch != s.key_epoch {
                    CallResult::Failed {
                        module: "core".into(),
                        code: 15,
                        message: "invalid call format: epoch mismatch".into(),
                    }
                } else {
                    let key = mrae::derive_symmetric(&envelope.pk, &RUNTIME_SECRET);
                    let plain = key
                        .open(&envelope.nonce, &envelope.data, &[])
                        .map_err(|e| TransportError::Other(e.to_string()))?;
                    let call: Call = paratime_hash::deserialize(&plain).map_err(bad_args)?;
                    let inner = run(&call);
                    s.executed.push(call);
                    let nonce = [3; mrae::NONCE_SIZE];
                    let mut data = key.seal(&nonce, &paratime_hash::serialize(&inner), &[]);
                    if s.tamper_results {
                        data[0] ^= 0x01;
                    }
                    CallResult::Unknown(paratime_hash::to_value(&ResultEnvelopeX25519DeoxysII {
                        nonce,
                        data,
                    }))
                }
            } else {
                let result = run(&tx.call);
                s.executed.push(tx.call);
                result
            };
            Ok(SubmittedTx {
                round,
                output: paratime_hash::serialize(&result),
            })
        })
    }
}

fn run(call: &Call) -> CallResult {
    if call.method == FAILING_METHOD {
        CallResult::Failed {
            module: "test".into(),
            code: 1,
            message: "failed on purpose".into(),
        }
    } else {
        CallResult::Ok(call.body.clone())
    }
}

fn bad_args(e: impl std::fmt::Display) -> TransportError {
    TransportError::Other(format!("malformed request: {e}"))
}

impl RuntimeClient for MockNode {
    async fn latest_round(&self) -> Result<Round, TransportError> {
        self.fail_if_unavailable()?;
        Ok(self.with(|s| s.latest_round))
    }

    async fn query(&self, round: Round, method: &str, args: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        self.fail_if_unavailable()?;
        let value = self.answer_query(round, method, &args)?;
        Ok(paratime_hash::serialize(&value))
    }

    async fn submit_tx(&self, utx: Vec<u8>) -> Result<SubmittedTx, TransportError> {
        self.fail_if_unavailable()?;
        if let Some(delay) = self.with(|s| s.submit_delay) {
            tokio::time::sleep(delay).await;
        }
        let utx = paratime_hash::deserialize(&utx).map_err(bad_args)?;
        self.execute(utx)
    }

    async fn events(&self, round: Round) -> Result<Vec<Event>, TransportError> {
        self.with(|s| s.event_requests += 1);
        self.fail_if_unavailable()?;
        self.with(|s| {
            if round > s.latest_round {
                return Err(TransportError::RoundNotAvailable(round));
            }
            Ok(s.events.get(&round).cloned().unwrap_or_default())
        })
    }
}

pub fn chain_context() -> ChainContext {
    ChainContext::new("test chain")
}

pub fn client(node: &MockNode) -> Client<&MockNode> {
    client_with(node, Config::default())
}

pub fn client_with(node: &MockNode, config: Config) -> Client<&MockNode> {
    Client::new(node, chain_context(), config)
}

pub fn body() -> Value {
    Value::Map(vec![(Value::Text("amount".into()), Value::Integer(10.into()))])
}
