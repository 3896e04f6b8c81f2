use std::time::Duration;

use thiserror::Error;

use crate::{
    node::{NodeError, SubmissionHandle},
    signer::SignerError,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No secret key or active wallet. Provide at least one of those.")]
    NoSigningMethod,

    #[error("Invalid submission context: {0}")]
    InvalidContext(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error(transparent)]
    SignerError(#[from] SignerError),

    #[error(transparent)]
    NodeError(#[from] NodeError),

    #[error("Unsupported {0}.")]
    Unsupported(String),

    #[error("Transaction simulation failed: {0}")]
    SimulationFailed(String),

    #[error("Malformed transaction result: {0}")]
    MalformedResult(String),

    #[error("Transaction failed: {0}")]
    ContractExecution(InvokeFailure),

    #[error("Timed out after {waited:?} waiting for transaction {hash}")]
    Timeout {
        hash: SubmissionHandle,
        waited: Duration,
    },

    #[error("Transaction submission was cancelled")]
    Cancelled,

    #[error("Couldn't decode {label}: {source}")]
    Encoding {
        label: String,
        source: anyhow::Error,
    },
}

/// Reason a contract invocation failed on chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeFailure {
    Malformed,
    Trapped,
    UnknownCode(i32),
}

impl std::fmt::Display for InvokeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeFailure::Malformed => write!(f, "malformed"),
            InvokeFailure::Trapped => write!(f, "trapped"),
            InvokeFailure::UnknownCode(code) => write!(f, "unexpected result code {}", code),
        }
    }
}

impl Error {
    pub(crate) fn encoding(label: &str, source: impl Into<anyhow::Error>) -> Self {
        Error::Encoding {
            label: label.to_string(),
            source: source.into(),
        }
    }
}
