//! Signing contexts.
//!
//! A context is `<domain> || " for chain " || <chain context>` where the
//! chain context identifies one runtime on one consensus network:
//!
//! ```plain
//! hex(SHA-512/256(<runtime id> || <consensus chain context>))
//! ```

use paratime_types::Hash;
use std::fmt;

/// Separates a signing domain from the chain context.
pub const CHAIN_CONTEXT_SEPARATOR: &[u8] = b" for chain ";

/// Domain of runtime transactions.
pub const TX_SIGNATURE_CONTEXT: &[u8] = b"oasis-runtime-sdk/tx: v0";

/// Domain of consensus layer transactions.
pub const CONSENSUS_TX_SIGNATURE_CONTEXT: &[u8] = b"oasis-core/consensus: tx";

/// Domain of storage receipts.
pub const STORAGE_RECEIPT_SIGNATURE_CONTEXT: &[u8] = b"oasis-core/storage: receipt";

/// Size of a runtime identifier.
pub const RUNTIME_ID_SIZE: usize = 32;

/// Identifies the chain signatures are valid for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChainContext(String);

impl ChainContext {
    /// Derive the chain context of a runtime from its identifier and the
    /// consensus layer's chain context.
    pub fn derive(runtime_id: &[u8; RUNTIME_ID_SIZE], consensus_chain_context: &str) -> Self {
        let h = paratime_hash::hash_parts(&[runtime_id, consensus_chain_context.as_bytes()]);
        Self(hex::encode(h))
    }

    /// Use an already derived chain context, e.g. the consensus layer's own.
    pub fn new(context: impl Into<String>) -> Self {
        Self(context.into())
    }

    /// The chain context as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bind a signing domain to a chain.
pub fn combine(domain: &[u8], chain_context: &ChainContext) -> Vec<u8> {
    let cc = chain_context.as_str().as_bytes();
    let mut ctx = Vec::with_capacity(domain.len() + CHAIN_CONTEXT_SEPARATOR.len() + cc.len());
    ctx.extend_from_slice(domain);
    ctx.extend_from_slice(CHAIN_CONTEXT_SEPARATOR);
    ctx.extend_from_slice(cc);
    ctx
}

/// The context runtime transactions for `chain_context` are signed under.
pub fn tx_context(chain_context: &ChainContext) -> Vec<u8> {
    combine(TX_SIGNATURE_CONTEXT, chain_context)
}

/// The digest signed for `message` under `context`.
pub fn signing_payload(context: &[u8], message: &[u8]) -> Hash {
    paratime_hash::hash_parts(&[context, message])
}
