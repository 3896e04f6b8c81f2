//! Minimal transaction builder

use chrono::Utc;
use stellar_xdr::curr::{self as xdr, StringM, Uint256, VecM};

use super::{
    ExtendFootprintTtlOp, ExtensionPoint, HostFunction, InvokeContractArgs, InvokeHostFunctionOp,
    Memo, MuxedAccount, Operation, OperationBody, Preconditions, RestoreFootprintOp,
    SequenceNumber, SorobanTransactionData, TimeBounds, TimePoint, Transaction, TransactionExt,
    BASE_FEE,
};
use crate::error::{Error, Result};
use crate::sc_val::{address_from_strkey, ScSymbol, ScVal};
use crate::strkey::{self, Version};

/// Passing this to [`TxBuilder::set_timeout`] leaves the transaction valid forever
pub const TIMEOUT_INFINITE: u64 = 0;

/// Source account and its current sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_id: String,
    pub sequence: i64,
}

impl Account {
    pub fn new(account_id: impl Into<String>, sequence: i64) -> Self {
        Account {
            account_id: account_id.into(),
            sequence,
        }
    }
}

/// Simple Transaction builder
pub struct TxBuilder {
    source: Account,
    fee_per_op: u32,
    network_passphrase: String,
    memo: Memo,
    operations: Vec<Operation>,
    time_bounds: Option<TimeBounds>,
    soroban_data: Option<SorobanTransactionData>,
}

impl TxBuilder {
    /// Start an empty transaction. `fee_per_op` is charged for every operation added.
    pub fn new(source: &Account, fee_per_op: u32, network_passphrase: impl Into<String>) -> Self {
        TxBuilder {
            source: source.clone(),
            fee_per_op,
            network_passphrase: network_passphrase.into(),
            memo: Memo::None,
            operations: Vec::new(),
            time_bounds: None,
            soroban_data: None,
        }
    }

    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn add_memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    /// Text memo, at most 28 bytes
    pub fn add_text_memo(self, text: &str) -> Result<Self> {
        let text = StringM::<28>::try_from(text.to_string())
            .map_err(|err| Error::InvalidTransaction(format!("memo: {}", err)))?;
        Ok(self.add_memo(Memo::Text(text)))
    }

    /// Valid from now on for `seconds` seconds, or forever with [`TIMEOUT_INFINITE`]
    pub fn set_timeout(mut self, seconds: u64) -> Self {
        let max_time = if seconds == TIMEOUT_INFINITE {
            0
        } else {
            (Utc::now().timestamp().max(0) as u64).saturating_add(seconds)
        };

        self.time_bounds = Some(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(max_time),
        });
        self
    }

    pub fn set_time_bounds(mut self, time_bounds: TimeBounds) -> Self {
        self.time_bounds = Some(time_bounds);
        self
    }

    pub fn set_soroban_data(mut self, soroban_data: SorobanTransactionData) -> Self {
        self.soroban_data = Some(soroban_data);
        self
    }

    pub fn build(self) -> Result<Transaction> {
        let source = strkey::decode(Version::AccountId, &self.source.account_id).map_err(|err| {
            Error::InvalidTransaction(format!(
                "source account {}: {}",
                self.source.account_id, err
            ))
        })?;

        if self.operations.is_empty() {
            return Err(Error::InvalidTransaction(
                "at least one operation is required".to_string(),
            ));
        }

        let time_bounds = self.time_bounds.ok_or(Error::InvalidTransaction(
            "a timeout or time bounds must be set".to_string(),
        ))?;

        let fee = u32::try_from(self.operations.len())
            .ok()
            .and_then(|ops| ops.checked_mul(self.fee_per_op))
            .ok_or(Error::InvalidTransaction("fee overflow".to_string()))?;

        let seq_num = self
            .source
            .sequence
            .checked_add(1)
            .ok_or(Error::InvalidTransaction("sequence overflow".to_string()))?;

        let op_count = self.operations.len();
        let operations: VecM<Operation, 100> = self.operations.try_into().map_err(|_| {
            Error::InvalidTransaction(format!("too many operations ({})", op_count))
        })?;

        let tx = xdr::Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(source)),
            fee,
            seq_num: SequenceNumber(seq_num),
            cond: Preconditions::Time(time_bounds),
            memo: self.memo,
            operations,
            ext: match self.soroban_data {
                Some(data) => TransactionExt::V1(data),
                None => TransactionExt::V0,
            },
        };

        Ok(Transaction::new(tx, self.network_passphrase))
    }
}

/// Operation calling `method` on the `C…` contract `contract_id`
pub fn invoke_contract(contract_id: &str, method: &str, params: Vec<ScVal>) -> Result<Operation> {
    let contract_address = address_from_strkey(contract_id).map_err(|err| {
        Error::InvalidTransaction(format!("contract id {}: {}", contract_id, err))
    })?;
    let function_name = StringM::<32>::try_from(method.to_string())
        .map(ScSymbol)
        .map_err(|err| Error::InvalidTransaction(format!("method {}: {}", method, err)))?;
    let args: VecM<ScVal> = params
        .try_into()
        .map_err(|err| Error::InvalidTransaction(format!("arguments: {}", err)))?;

    Ok(Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function: HostFunction::InvokeContract(InvokeContractArgs {
                contract_address,
                function_name,
                args,
            }),
            auth: VecM::default(),
        }),
    })
}

pub fn extend_footprint_ttl(extend_to: u32) -> Operation {
    Operation {
        source_account: None,
        body: OperationBody::ExtendFootprintTtl(ExtendFootprintTtlOp {
            ext: ExtensionPoint::V0,
            extend_to,
        }),
    }
}

pub fn restore_footprint() -> Operation {
    Operation {
        source_account: None,
        body: OperationBody::RestoreFootprint(RestoreFootprintOp {
            ext: ExtensionPoint::V0,
        }),
    }
}

pub struct ContractTransactionProps {
    pub network_passphrase: String,
    pub source: Account,
    /// `C…` contract id
    pub contract_id: String,
    pub method: String,
    pub params: Vec<ScVal>,
}

/// Build a transaction calling a single contract function, with the base fee and no timeout
pub fn contract_transaction(props: ContractTransactionProps) -> Result<Transaction> {
    let operation = invoke_contract(&props.contract_id, &props.method, props.params)?;

    TxBuilder::new(&props.source, BASE_FEE, props.network_passphrase)
        .add_operation(operation)
        .set_timeout(TIMEOUT_INFINITE)
        .build()
}
