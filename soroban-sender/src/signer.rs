//! Signer adapter
//!
//! A transaction is signed either with a local secret key, or by handing it over to an
//! external wallet that was connected earlier.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transaction::{SignedTransaction, Transaction};
use crate::utils::key_signer::KeySigner;

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Invalid secret key: {0}")]
    InvalidKey(String),

    #[error("Wallet connector unavailable: {0}")]
    ConnectorUnavailable(String),

    #[error("User rejected the signature request")]
    UserRejected,

    #[error(transparent)]
    Other(anyhow::Error),
}

/// Signer with direct access to a private key
pub trait TransactionSigner {
    /// `G…` account id of the signing key
    fn public_key(&self) -> String;

    /// Signs a fully assembled transaction
    fn sign_transaction(&self, tx: &Transaction) -> SignedTransaction;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    pub network_passphrase: String,
    /// Account the wallet should sign with, if it manages several
    pub address: Option<String>,
}

/// Previously connected external wallet (browser extension, hardware wallet, remote signer)
///
/// Signing may suspend for a long time, as it typically waits for the user.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn name(&self) -> &str;

    /// Sign an envelope in its wire form and return the signed envelope in wire form
    async fn sign_transaction(
        &self,
        tx_xdr: &str,
        opts: &SignOptions,
    ) -> std::result::Result<String, SignerError>;
}

/// Signing strategy used for a single submission
pub enum SigningMethod {
    LocalKey(KeySigner),
    Connector(Arc<dyn WalletConnector>),
}

impl SigningMethod {
    /// Pick the signing strategy. A secret key takes precedence over the connector.
    pub fn resolve(
        secret_key: Option<&str>,
        connector: Option<&Arc<dyn WalletConnector>>,
    ) -> Result<Self> {
        match (secret_key, connector) {
            (Some(secret_key), _) => Ok(SigningMethod::LocalKey(KeySigner::from_secret(
                secret_key,
            )?)),
            (None, Some(connector)) => Ok(SigningMethod::Connector(Arc::clone(connector))),
            (None, None) => Err(Error::NoSigningMethod),
        }
    }

    /// Sign the transaction, returning the signed envelope in wire form
    pub async fn sign(&self, tx: &Transaction) -> std::result::Result<String, SignerError> {
        match self {
            SigningMethod::LocalKey(signer) => {
                debug!(public_key = %signer.public_key(), "Signing with local key.");
                Ok(TransactionSigner::sign_transaction(signer, tx).to_xdr())
            }
            SigningMethod::Connector(connector) => {
                debug!(connector = connector.name(), "Requesting signature from wallet.");
                let opts = SignOptions {
                    network_passphrase: tx.network_passphrase().to_string(),
                    address: None,
                };
                connector.sign_transaction(&tx.to_xdr(), &opts).await
            }
        }
    }
}

impl std::fmt::Debug for SigningMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningMethod::LocalKey(signer) => f.debug_tuple("LocalKey").field(signer).finish(),
            SigningMethod::Connector(connector) => {
                f.debug_tuple("Connector").field(&connector.name()).finish()
            }
        }
    }
}
