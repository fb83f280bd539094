use crate::{address, AddressError, DeriveAddress};
use paratime_types::{multisig, Address, AddressSpec, SignatureAddressSpec};

impl DeriveAddress for SignatureAddressSpec {
    fn address(&self) -> Result<Address, AddressError> {
        match self {
            Self::Ed25519(pk) => Ok(address::from_ed25519(pk)),
            Self::Secp256k1Eth(pk) => address::from_secp256k1eth(pk),
            Self::Sr25519(pk) => Ok(address::from_sr25519(pk)),
        }
    }
}

impl DeriveAddress for multisig::Config {
    fn address(&self) -> Result<Address, AddressError> {
        Ok(address::from_multisig(self))
    }
}

impl DeriveAddress for AddressSpec {
    fn address(&self) -> Result<Address, AddressError> {
        match self {
            Self::Signature(spec) => spec.address(),
            Self::Multisig(config) => config.address(),
        }
    }
}
