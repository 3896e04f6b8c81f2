//! Soroban contract values

pub use stellar_xdr::curr::{
    Int128Parts, ScAddress, ScMap, ScMapEntry, ScSymbol, ScVal, ScVec, UInt128Parts,
};
use stellar_xdr::curr::{AccountId, Hash, PublicKey, StringM, Uint256};

use crate::error::{Error, Result};
use crate::strkey::{self, StrKeyError, Version};
use crate::wire;

/// Symbol value, at most 32 characters
pub fn symbol(name: &str) -> Result<ScVal> {
    StringM::<32>::try_from(name.to_string())
        .map(|name| ScVal::Symbol(ScSymbol(name)))
        .map_err(|source| Error::encoding("ScSymbol", source))
}

/// Decode a base64 encoded contract value
pub fn sc_val_from_xdr(encoded: &str) -> Result<ScVal> {
    wire::from_base64("ScVal", encoded)
}

pub fn sc_val_to_xdr(value: &ScVal) -> String {
    wire::to_base64(value)
}

pub fn account_id(public_key: [u8; 32]) -> AccountId {
    AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(public_key)))
}

/// Parse a `G…` account id or a `C…` contract id
pub fn address_from_strkey(key: &str) -> std::result::Result<ScAddress, StrKeyError> {
    if key.starts_with('C') {
        strkey::decode(Version::Contract, key).map(|id| ScAddress::Contract(Hash(id)))
    } else {
        strkey::decode(Version::AccountId, key).map(|key| ScAddress::Account(account_id(key)))
    }
}

pub fn address_to_strkey(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key)))) => {
            strkey::encode(Version::AccountId, key)
        }
        ScAddress::Contract(Hash(id)) => strkey::encode(Version::Contract, id),
    }
}

pub fn i128_val(value: i128) -> ScVal {
    ScVal::I128(Int128Parts {
        hi: (value >> 64) as i64,
        lo: value as u64,
    })
}

pub fn u128_val(value: u128) -> ScVal {
    ScVal::U128(UInt128Parts {
        hi: (value >> 64) as u64,
        lo: value as u64,
    })
}

pub fn i128_from_parts(parts: &Int128Parts) -> i128 {
    ((parts.hi as i128) << 64) | parts.lo as i128
}

pub fn u128_from_parts(parts: &UInt128Parts) -> u128 {
    ((parts.hi as u128) << 64) | parts.lo as u128
}
