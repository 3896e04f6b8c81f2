//! Node client
//!
//! The three remote operations the sender needs from a Soroban node: simulating, submitting,
//! and looking up the status of a submitted transaction.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::sc_val::ScVal;
use crate::transaction::{
    SignedTransaction, SorobanAuthorizationEntry, SorobanTransactionData, Transaction,
};

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Network error: {0}")]
    Network(anyhow::Error),

    #[error("Transaction not found")]
    NotFound,

    #[error("Transaction rejected at submission with status {status}: {error_result_xdr:?}")]
    RejectedAtSubmit {
        status: String,
        error_result_xdr: Option<String>,
    },

    #[error("Unexpected transaction status: {0}")]
    UnexpectedStatus(String),

    #[error("Couldn't decode {label} from node response: {source}")]
    Decode {
        label: String,
        source: anyhow::Error,
    },
}

/// Network assigned transaction hash, used to poll the transaction status
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionHandle(String);

impl SubmissionHandle {
    pub fn new(hash: impl Into<String>) -> Self {
        SubmissionHandle(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a transaction simulation (preflight)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimulationResult {
    pub transaction_data: Option<SorobanTransactionData>,
    pub min_resource_fee: i64,
    /// Authorizations the invocation requires
    pub auth: Vec<SorobanAuthorizationEntry>,
    /// Value the invocation returned during simulation
    pub return_value: Option<ScVal>,
    pub latest_ledger: u32,
    /// Error reported by the simulation. Such a result can't be assembled.
    pub error: Option<String>,
}

/// Response for a transaction that reached a terminal status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalResponse {
    pub ledger: Option<u32>,
    /// Encoded `TransactionResult`
    pub result_xdr: Option<String>,
    /// Encoded `ScVal` returned by the invoked contract function
    pub return_value_xdr: Option<String>,
    /// Encoded `TransactionMeta`, for nodes that don't report the return value on its own
    pub result_meta_xdr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    NotFound,
    Success(TerminalResponse),
    Failed(TerminalResponse),
}

/// Component which can simulate and submit transactions, and query their status
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Preflight a transaction, computing its resource footprint, fee and authorizations
    async fn simulate(&self, tx: &Transaction) -> Result<SimulationResult, NodeError>;

    /// Submit a signed transaction, without waiting for it to be applied
    async fn submit(&self, tx: &SignedTransaction) -> Result<SubmissionHandle, NodeError>;

    /// Look up a submitted transaction
    async fn get_status(&self, handle: &SubmissionHandle)
        -> Result<TransactionStatus, NodeError>;
}
