//! Stellar string keys (`G…` accounts, `S…` secret seeds, `C…` contracts)

use stellar_strkey::{ed25519, Contract};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    AccountId,
    SecretSeed,
    Contract,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {version:?} string key: {reason}")]
pub struct StrKeyError {
    pub version: Version,
    pub reason: String,
}

pub fn encode(version: Version, payload: &[u8; 32]) -> String {
    match version {
        Version::AccountId => ed25519::PublicKey(*payload).to_string(),
        Version::SecretSeed => ed25519::PrivateKey(*payload).to_string(),
        Version::Contract => Contract(*payload).to_string(),
    }
}

pub fn decode(version: Version, key: &str) -> Result<[u8; 32], StrKeyError> {
    let decoded = match version {
        Version::AccountId => ed25519::PublicKey::from_string(key).map(|key| key.0),
        Version::SecretSeed => ed25519::PrivateKey::from_string(key).map(|key| key.0),
        Version::Contract => Contract::from_string(key).map(|contract| contract.0),
    };

    decoded.map_err(|err| StrKeyError {
        version,
        reason: format!("{:?}", err),
    })
}
