//! EIP-55 address serialization for the archive. Reading accepts any case.

use alloy::primitives::Address;
use serde::Serializer;

pub fn address<S: Serializer>(addr: &Address, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&addr.to_checksum(None))
}

pub fn opt_address<S: Serializer>(addr: &Option<Address>, s: S) -> Result<S::Ok, S::Error> {
    match addr {
        Some(a) => address(a, s),
        None => s.serialize_none(),
    }
}
