//! Soroban transaction sender

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::assembler::assemble;
use crate::decoder::{decode, ResponseReturnValue, ReturnValueDecoder, TerminalKind};
use crate::error::{Error, Result};
use crate::network::ChainMetadata;
use crate::node::{NodeClient, NodeError, SubmissionHandle, TerminalResponse, TransactionStatus};
use crate::signer::SigningMethod;
use crate::transaction::{SignedTransaction, Transaction};

pub mod assembler;
#[cfg(feature = "clap")]
pub mod clap;
pub mod decoder;
pub mod error;
pub mod network;
pub mod node;
pub mod options;
pub mod sc_val;
pub mod signer;
pub mod status;
pub mod strkey;
pub mod transaction;
pub mod utils;
pub mod wire;

pub use decoder::TransactionOutcome;
pub use options::{SendOptions, SendOptionsBuilder, SorobanContext};
pub use status::SubmissionStatus;

/// Transaction sender
///
/// Drives a transaction through simulation, assembly, signing, submission and status polling.
/// One sender can run any number of submissions, concurrently or one after the other. Runs
/// only share the observable status, which always holds the state of the most recently
/// updated run.
pub struct TxSender {
    default_tx: Option<Transaction>,
    default_options: SendOptions,
    status: watch::Sender<SubmissionStatus>,
    return_values: Arc<dyn ReturnValueDecoder>,
}

/// Everything a run needs, checked before any I/O
struct Submission {
    tx: Transaction,
    chain: ChainMetadata,
    server: Arc<dyn NodeClient>,
    signing_method: SigningMethod,
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for TxSender {
    fn default() -> Self {
        Self::new(None, SendOptions::default())
    }
}

impl TxSender {
    /// Create a sender with a fallback transaction and default options, both used when a call
    /// doesn't supply its own
    pub fn new(default_tx: Option<Transaction>, default_options: SendOptions) -> Self {
        let (status, _) = watch::channel(SubmissionStatus::Idle);
        TxSender {
            default_tx,
            default_options,
            status,
            return_values: Arc::new(ResponseReturnValue),
        }
    }

    /// Replace the decoder turning successful invocations into contract values
    pub fn with_return_value_decoder(mut self, decoder: impl ReturnValueDecoder + 'static) -> Self {
        self.return_values = Arc::new(decoder);
        self
    }

    pub fn status(&self) -> SubmissionStatus {
        *self.status.borrow()
    }

    pub fn is_idle(&self) -> bool {
        self.status().is_idle()
    }

    pub fn is_loading(&self) -> bool {
        self.status().is_loading()
    }

    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    pub fn is_error(&self) -> bool {
        self.status().is_error()
    }

    /// Watch status transitions
    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    /// Return the observable status to `Idle`
    ///
    /// Runs never do this on their own: a finished run leaves `Success` or `Error` in place, and
    /// a run rejected before any I/O leaves the previous status untouched. Calling `reset`
    /// between runs is the only way back to `Idle`.
    pub fn reset(&self) {
        self.status.send_replace(SubmissionStatus::Idle);
    }

    /// Send a transaction and wait for its result
    ///
    /// `tx` and `options` override the sender's defaults.
    pub async fn send_transaction(
        &self,
        tx: Option<Transaction>,
        options: Option<SendOptions>,
    ) -> Result<TransactionOutcome> {
        self.send_transaction_with_cancel(tx, options, &CancellationToken::new())
            .await
    }

    /// Like [`TxSender::send_transaction`], aborting at the next suspension point once `cancel`
    /// is triggered
    pub async fn send_transaction_with_cancel(
        &self,
        tx: Option<Transaction>,
        options: Option<SendOptions>,
        cancel: &CancellationToken,
    ) -> Result<TransactionOutcome> {
        let options = self
            .default_options
            .clone()
            .merge(options.unwrap_or_default());

        let submission = self.prepare(tx, options)?;

        self.set_status(SubmissionStatus::Loading);

        match self.run(submission, cancel).await {
            Ok((TerminalKind::Success, outcome)) => {
                self.set_status(SubmissionStatus::Success);
                Ok(outcome)
            }
            Ok((TerminalKind::Failed, outcome)) => {
                self.set_status(SubmissionStatus::Error);
                Ok(outcome)
            }
            Err(err) => {
                warn!(%err, "Transaction submission failed.");
                self.set_status(SubmissionStatus::Error);
                Err(err)
            }
        }
    }

    fn set_status(&self, status: SubmissionStatus) {
        debug!(?status, "Submission status changed.");
        self.status.send_replace(status);
    }

    /// Precondition checks, without I/O and without touching the status
    fn prepare(&self, tx: Option<Transaction>, options: SendOptions) -> Result<Submission> {
        let context = options.soroban_context.clone().unwrap_or_default();

        if options.secret_key.is_none() && context.active_connector.is_none() {
            return Err(Error::NoSigningMethod);
        }

        let tx = tx
            .or_else(|| self.default_tx.clone())
            .ok_or(Error::InvalidContext("no transaction".to_string()))?;

        // Required even when a secret key does the signing
        let connector = context
            .active_connector
            .ok_or(Error::InvalidContext("no active connector".to_string()))?;

        let chain = context
            .active_chain
            .ok_or(Error::InvalidContext("no active chain".to_string()))?;

        let server = context
            .server
            .ok_or(Error::InvalidContext("not connected to server".to_string()))?;

        let signing_method =
            SigningMethod::resolve(options.secret_key.as_deref(), Some(&connector))?;

        if tx.network_passphrase() != chain.network_passphrase {
            warn!(
                tx_network = tx.network_passphrase(),
                active_network = %chain.network_passphrase,
                "Transaction was built for another network, binding it to the active chain."
            );
        }

        if options.skip_adding_footprint == Some(true) {
            debug!("skip_adding_footprint is reserved and has no effect.");
        }

        Ok(Submission {
            tx,
            chain,
            server,
            signing_method,
            timeout: options.timeout(),
            poll_interval: options.poll_interval(),
        })
    }

    async fn run(
        &self,
        submission: Submission,
        cancel: &CancellationToken,
    ) -> Result<(TerminalKind, TransactionOutcome)> {
        let Submission {
            tx,
            chain,
            server,
            signing_method,
            timeout,
            poll_interval,
        } = submission;
        let network_passphrase = chain.network_passphrase.as_str();

        info!(network = %chain.name, "Simulating transaction.");
        let simulation = cancellable(cancel, server.simulate(&tx)).await??;

        let auth_count = simulation.auth.len();
        if auth_count > 1 {
            return Err(Error::Unsupported(format!(
                "transaction requiring {} authorizations, at most one is supported",
                auth_count
            )));
        }

        debug!(
            auth_count,
            min_resource_fee = simulation.min_resource_fee,
            "Assembling transaction."
        );
        let assembled = assemble(&tx, network_passphrase, &simulation)?;

        debug!(?signing_method, "Signing transaction.");
        let signed_xdr = cancellable(cancel, signing_method.sign(&assembled)).await??;

        // Submit exactly what was signed, in canonical form
        let signed = SignedTransaction::from_xdr(&signed_xdr, network_passphrase)?;
        if signed.hash() != assembled.hash() {
            warn!("Signer returned a transaction different from the assembled one.");
        }

        info!(hash = %signed.hash_hex(), "Submitting transaction.");
        let handle = cancellable(cancel, server.submit(&signed)).await??;

        let (kind, response) = poll_status(
            server.as_ref(),
            &handle,
            timeout,
            poll_interval,
            cancel,
        )
        .await?;

        info!(%handle, ?kind, ledger = ?response.ledger, "Transaction reached a terminal status.");
        let outcome = decode(kind, &response, self.return_values.as_ref())?;

        Ok((kind, outcome))
    }
}

/// Poll the transaction status until it is terminal or `timeout` elapsed
///
/// Only a missing transaction is retried, every other error ends the polling. A `timeout` too
/// large to be represented as a deadline never expires.
async fn poll_status(
    server: &dyn NodeClient,
    handle: &SubmissionHandle,
    timeout: Duration,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> Result<(TerminalKind, TerminalResponse)> {
    info!(%handle, ?timeout, "Awaiting transaction confirmation.");
    let started = Instant::now();
    let deadline = started.checked_add(timeout);

    loop {
        let wait = match deadline {
            Some(deadline) => poll_interval.min(deadline.saturating_duration_since(Instant::now())),
            None => poll_interval,
        };
        cancellable(cancel, tokio::time::sleep(wait)).await?;

        match cancellable(cancel, server.get_status(handle)).await? {
            Ok(TransactionStatus::Success(response)) => {
                return Ok((TerminalKind::Success, response))
            }
            Ok(TransactionStatus::Failed(response)) => return Ok((TerminalKind::Failed, response)),
            Ok(TransactionStatus::Pending | TransactionStatus::NotFound)
            | Err(NodeError::NotFound) => {
                debug!(%handle, "Transaction not yet applied.");
            }
            Err(err) => return Err(err.into()),
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(Error::Timeout {
                hash: handle.clone(),
                waited: started.elapsed(),
            });
        }
    }
}

async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        output = fut => Ok(output),
    }
}
