//! Canonical wire form
//!
//! Envelopes, results, authorization entries and contract values travel as their Stellar XDR
//! encoding, wrapped in standard base64 (the RPC's `…Xdr` fields).

use stellar_xdr::curr::{Limits, ReadXdr, WriteXdr};

use crate::error::{Error, Result};

pub fn to_bytes<T: WriteXdr>(value: &T) -> Vec<u8> {
    // JUSTIFICATION: variable length fields are bounded when the value is constructed, and
    // writing into a vector without limits has no other failure mode.
    value.to_xdr(Limits::none()).unwrap()
}

pub fn to_base64<T: WriteXdr>(value: &T) -> String {
    // JUSTIFICATION: see `to_bytes`
    value.to_xdr_base64(Limits::none()).unwrap()
}

pub fn from_bytes<T: ReadXdr>(label: &str, bytes: &[u8]) -> Result<T> {
    T::from_xdr(bytes, Limits::none()).map_err(|source| Error::encoding(label, source))
}

pub fn from_base64<T: ReadXdr>(label: &str, encoded: &str) -> Result<T> {
    T::from_xdr_base64(encoded.trim(), Limits::none())
        .map_err(|source| Error::encoding(label, source))
}
