//! In-memory node client and wallet connector

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use soroban_sender::decoder::{
    InvokeHostFunctionResult, OperationResult, OperationResultTr, TransactionResult,
    TransactionResultResult,
};
use soroban_sender::network::{ChainMetadata, TESTNET_PASSPHRASE};
use soroban_sender::node::{
    NodeClient, NodeError, SimulationResult, SubmissionHandle, TerminalResponse,
    TransactionStatus,
};
use soroban_sender::sc_val::{sc_val_to_xdr, ScAddress, ScSymbol, ScVal};
use soroban_sender::signer::{SignOptions, SignerError, TransactionSigner, WalletConnector};
use soroban_sender::strkey::{encode, Version};
use soroban_sender::transaction::{
    contract_transaction, Account, ContractTransactionProps, ExtensionPoint, LedgerFootprint,
    SignedTransaction, SorobanAuthorizationEntry, SorobanResources, SorobanTransactionData,
    Transaction,
};
use soroban_sender::utils::key_signer::KeySigner;
use soroban_sender::wire;
use soroban_sender::SorobanContext;
use stellar_xdr::curr::{
    Hash, InvokeContractArgs, SorobanAddressCredentials, SorobanAuthorizedFunction,
    SorobanAuthorizedInvocation, SorobanCredentials, TransactionResultExt, VecM,
};

pub const SEED: [u8; 32] = [21; 32];

pub fn key_signer() -> KeySigner {
    KeySigner::from_seed(&SEED)
}

pub fn sample_tx() -> Transaction {
    contract_transaction(ContractTransactionProps {
        network_passphrase: TESTNET_PASSPHRASE.to_string(),
        source: Account::new(key_signer().public_key(), 100),
        contract_id: encode(Version::Contract, &[8; 32]),
        method: "increment".to_string(),
        params: vec![ScVal::U32(1)],
    })
    .unwrap()
}

pub fn auth_entry(nonce: i64) -> SorobanAuthorizationEntry {
    SorobanAuthorizationEntry {
        credentials: SorobanCredentials::Address(SorobanAddressCredentials {
            address: ScAddress::Contract(Hash([9; 32])),
            nonce,
            signature_expiration_ledger: 600,
            signature: ScVal::Void,
        }),
        root_invocation: SorobanAuthorizedInvocation {
            function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                contract_address: ScAddress::Contract(Hash([8; 32])),
                function_name: ScSymbol("increment".to_string().try_into().unwrap()),
                args: VecM::default(),
            }),
            sub_invocations: VecM::default(),
        },
    }
}

pub fn simulation(auth_count: usize) -> SimulationResult {
    SimulationResult {
        transaction_data: Some(SorobanTransactionData {
            ext: ExtensionPoint::V0,
            resources: SorobanResources {
                footprint: LedgerFootprint {
                    read_only: VecM::default(),
                    read_write: VecM::default(),
                },
                instructions: 2_000,
                read_bytes: 100,
                write_bytes: 50,
            },
            resource_fee: 1_000,
        }),
        min_resource_fee: 1_000,
        auth: (0..auth_count as i64).map(auth_entry).collect(),
        return_value: Some(ScVal::U32(2)),
        latest_ledger: 500,
        error: None,
    }
}

pub fn invoke_response(result: InvokeHostFunctionResult, value: Option<ScVal>) -> TerminalResponse {
    let results = vec![OperationResult::OpInner(
        OperationResultTr::InvokeHostFunction(result),
    )];
    TerminalResponse {
        ledger: Some(501),
        result_xdr: Some(wire::to_base64(&TransactionResult {
            fee_charged: 1_100,
            result: TransactionResultResult::TxSuccess(results.try_into().unwrap()),
            ext: TransactionResultExt::V0,
        })),
        return_value_xdr: value.map(|value| sc_val_to_xdr(&value)),
        result_meta_xdr: None,
    }
}

pub fn success(value: ScVal) -> StatusReply {
    StatusReply::Status(TransactionStatus::Success(invoke_response(
        InvokeHostFunctionResult::Success(Hash([0; 32])),
        Some(value),
    )))
}

#[derive(Clone)]
pub enum StatusReply {
    Status(TransactionStatus),
    NotFoundError,
    NetworkError(String),
}

#[derive(Clone)]
pub enum SubmitReply {
    Accept,
    Reject { error_result_xdr: String },
}

/// Scripted node. Once the scripted statuses run out, every lookup is `Pending`.
pub struct MockNode {
    simulation: Result<SimulationResult, String>,
    submit: SubmitReply,
    statuses: Mutex<VecDeque<StatusReply>>,
    pub simulate_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub submitted: Mutex<Vec<SignedTransaction>>,
}

impl MockNode {
    pub fn new(simulation: SimulationResult, statuses: Vec<StatusReply>) -> Self {
        MockNode {
            simulation: Ok(simulation),
            submit: SubmitReply::Accept,
            statuses: Mutex::new(statuses.into()),
            simulate_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_submit(mut self, submit: SubmitReply) -> Self {
        self.submit = submit;
        self
    }

    pub fn failing_simulation(mut self, err: &str) -> Self {
        self.simulation = Err(err.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
            + self.submit_calls.load(Ordering::SeqCst)
            + self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn simulate(&self, _tx: &Transaction) -> Result<SimulationResult, NodeError> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        self.simulation
            .clone()
            .map_err(|err| NodeError::Network(anyhow!(err)))
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<SubmissionHandle, NodeError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(tx.clone());
        match &self.submit {
            SubmitReply::Accept => Ok(SubmissionHandle::new(tx.hash_hex())),
            SubmitReply::Reject { error_result_xdr } => Err(NodeError::RejectedAtSubmit {
                status: "ERROR".to_string(),
                error_result_xdr: Some(error_result_xdr.clone()),
            }),
        }
    }

    async fn get_status(
        &self,
        _handle: &SubmissionHandle,
    ) -> Result<TransactionStatus, NodeError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.statuses.lock().unwrap().pop_front() {
            None => Ok(TransactionStatus::Pending),
            Some(StatusReply::Status(status)) => Ok(status),
            Some(StatusReply::NotFoundError) => Err(NodeError::NotFound),
            Some(StatusReply::NetworkError(err)) => Err(NodeError::Network(anyhow!(err))),
        }
    }
}

#[derive(Clone, Copy)]
pub enum ConnectorBehaviour {
    Sign,
    Reject,
    Unavailable,
}

/// Wallet signing with [`key_signer`]
pub struct MockConnector {
    behaviour: ConnectorBehaviour,
    pub calls: AtomicUsize,
    pub last_options: Mutex<Option<SignOptions>>,
}

impl MockConnector {
    pub fn new(behaviour: ConnectorBehaviour) -> Self {
        MockConnector {
            behaviour,
            calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    fn name(&self) -> &str {
        "mock"
    }

    async fn sign_transaction(
        &self,
        tx_xdr: &str,
        opts: &SignOptions,
    ) -> Result<String, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(opts.clone());
        match self.behaviour {
            ConnectorBehaviour::Sign => {
                let tx = Transaction::from_xdr(tx_xdr, &opts.network_passphrase)
                    .map_err(|err| SignerError::Other(anyhow!(err)))?;
                Ok(TransactionSigner::sign_transaction(&key_signer(), &tx).to_xdr())
            }
            ConnectorBehaviour::Reject => Err(SignerError::UserRejected),
            ConnectorBehaviour::Unavailable => Err(SignerError::ConnectorUnavailable(
                "extension not installed".to_string(),
            )),
        }
    }
}

/// Active chain and server, without a connected wallet
pub fn context(node: &Arc<MockNode>) -> SorobanContext {
    SorobanContext::new()
        .with_chain(ChainMetadata::testnet())
        .with_server(node.clone())
}

pub fn wallet_context(node: &Arc<MockNode>, connector: &Arc<MockConnector>) -> SorobanContext {
    context(node).with_connector(connector.clone())
}
