//! Token amounts.

use num_bigint::BigUint;
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeTuple,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Maximum length of a denomination in bytes.
pub const MAX_DENOMINATION_SIZE: usize = 32;

/// A token denomination. The empty denomination is the runtime's native token.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Denomination(#[serde(with = "serde_bytes")] Vec<u8>);

/// An amount of tokens of a given denomination.
///
/// Encoded as the two element array `[amount, denomination]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BaseUnits {
    /// The amount, in the smallest unit of the denomination.
    pub amount: BigUint,
    /// The denomination.
    pub denomination: Denomination,
}

/// A denomination exceeded [`MAX_DENOMINATION_SIZE`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("denomination too long: {0} bytes")]
pub struct DenominationTooLong(pub usize);

impl Denomination {
    /// The native denomination.
    pub const NATIVE: Denomination = Denomination(Vec::new());

    /// Construct a denomination from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, DenominationTooLong> {
        let bytes = bytes.into();
        if bytes.len() > MAX_DENOMINATION_SIZE {
            return Err(DenominationTooLong(bytes.len()));
        }
        Ok(Self(bytes))
    }

    /// Whether this is the native denomination.
    pub fn is_native(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw denomination bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::str::FromStr for Denomination {
    type Err = DenominationTooLong;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.as_bytes())
    }
}

impl BaseUnits {
    /// Construct an amount of the given denomination.
    pub fn new(amount: impl Into<BigUint>, denomination: Denomination) -> Self {
        Self {
            amount: amount.into(),
            denomination,
        }
    }

    /// An amount of the native denomination.
    pub fn native(amount: impl Into<BigUint>) -> Self {
        Self::new(amount, Denomination::NATIVE)
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.bits() == 0
    }
}

impl Serialize for BaseUnits {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let amount = crate::serde::quantity::to_bytes(&self.amount);
        let mut tup = s.serialize_tuple(2)?;
        tup.serialize_element(serde_bytes::Bytes::new(&amount))?;
        tup.serialize_element(&self.denomination)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for BaseUnits {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct BaseUnitsVisitor;

        impl<'de> Visitor<'de> for BaseUnitsVisitor {
            type Value = BaseUnits;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an `[amount, denomination]` array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<BaseUnits, A::Error> {
                let amount: serde_bytes::ByteBuf = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let denomination: Denomination = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(3, &self));
                }
                let amount = crate::serde::quantity::from_bytes(&amount)
                    .ok_or_else(|| de::Error::custom("quantity has leading zero bytes"))?;
                if denomination.0.len() > MAX_DENOMINATION_SIZE {
                    return Err(de::Error::custom(DenominationTooLong(denomination.0.len())));
                }
                Ok(BaseUnits {
                    amount,
                    denomination,
                })
            }
        }

        d.deserialize_tuple(2, BaseUnitsVisitor)
    }
}
