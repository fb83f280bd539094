//! Custom serde module implementations.

pub mod bytes;
pub mod quantity;
