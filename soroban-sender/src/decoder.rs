//! Decoding of terminal transaction responses

use itertools::Itertools;
use serde::{Deserialize, Serialize};
pub use stellar_xdr::curr::{
    InvokeHostFunctionResult, OperationResult, OperationResultTr, TransactionMeta,
    TransactionResult, TransactionResultResult,
};
use tracing::debug;

use crate::error::{Error, InvokeFailure, Result};
use crate::node::TerminalResponse;
use crate::sc_val::{sc_val_from_xdr, ScVal};
use crate::wire;

/// Value standing in for results the sender can't decode into a contract value
pub const SENTINEL_VALUE: ScVal = ScVal::I32(-1);

/// Decoded result of a transaction that reached a terminal status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionOutcome {
    /// Value returned by the invoked contract function
    Value(ScVal),
    /// Degraded success: the result carries no contract return value (classic transactions,
    /// or nodes that don't report return values)
    Sentinel,
}

impl TransactionOutcome {
    pub fn into_sc_val(self) -> ScVal {
        match self {
            TransactionOutcome::Value(value) => value,
            TransactionOutcome::Sentinel => SENTINEL_VALUE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Success,
    Failed,
}

fn failure(result: &InvokeHostFunctionResult) -> InvokeFailure {
    match result {
        InvokeHostFunctionResult::Malformed => InvokeFailure::Malformed,
        InvokeHostFunctionResult::Trapped => InvokeFailure::Trapped,
        other => InvokeFailure::UnknownCode(other.discriminant() as i32),
    }
}

/// Extension point turning a successful invocation into the contract's return value
pub trait ReturnValueDecoder: Send + Sync {
    fn decode_return_value(&self, response: &TerminalResponse) -> Result<TransactionOutcome>;
}

/// Reads the return value the node attaches to the response, or the one recorded in the
/// Soroban metadata, falling back to the sentinel
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseReturnValue;

impl ReturnValueDecoder for ResponseReturnValue {
    fn decode_return_value(&self, response: &TerminalResponse) -> Result<TransactionOutcome> {
        if let Some(encoded) = &response.return_value_xdr {
            return Ok(TransactionOutcome::Value(sc_val_from_xdr(encoded)?));
        }

        let Some(meta_xdr) = &response.result_meta_xdr else {
            debug!("Node reported no return value.");
            return Ok(TransactionOutcome::Sentinel);
        };

        let meta: TransactionMeta = wire::from_base64("TransactionMeta", meta_xdr)?;
        match meta {
            TransactionMeta::V3(meta) => match meta.soroban_meta {
                Some(soroban_meta) => Ok(TransactionOutcome::Value(soroban_meta.return_value)),
                None => Ok(TransactionOutcome::Sentinel),
            },
            other => {
                debug!(version = other.name(), "Metadata carries no Soroban return value.");
                Ok(TransactionOutcome::Sentinel)
            }
        }
    }
}

/// Interpret a terminal response
pub fn decode(
    kind: TerminalKind,
    response: &TerminalResponse,
    return_values: &dyn ReturnValueDecoder,
) -> Result<TransactionOutcome> {
    let Some(result_xdr) = &response.result_xdr else {
        debug!("No result payload, assuming a classic transaction.");
        return Ok(TransactionOutcome::Sentinel);
    };

    let result: TransactionResult = wire::from_base64("TransactionResult", result_xdr)
        .map_err(|err| Error::MalformedResult(err.to_string()))?;

    let results = match result.result {
        TransactionResultResult::TxSuccess(results) | TransactionResultResult::TxFailed(results) => {
            results
        }
        other => {
            return Err(Error::MalformedResult(format!(
                "transaction result {} carries no operation results",
                other.name()
            )))
        }
    };

    let op_result = results.to_vec().into_iter().exactly_one().map_err(|results| {
        Error::MalformedResult(format!(
            "expected exactly one result, got {}",
            results.count()
        ))
    })?;

    let invoke_result = match op_result {
        OperationResult::OpInner(OperationResultTr::InvokeHostFunction(invoke_result)) => {
            invoke_result
        }
        other => {
            debug!(result = other.name(), "Not a contract invocation result.");
            return Ok(TransactionOutcome::Sentinel);
        }
    };

    match (kind, invoke_result) {
        (TerminalKind::Success, InvokeHostFunctionResult::Success(_)) => {
            return_values.decode_return_value(response)
        }
        (TerminalKind::Success, other) => Err(Error::MalformedResult(format!(
            "successful transaction with failed invocation ({})",
            other.name()
        ))),
        (TerminalKind::Failed, InvokeHostFunctionResult::Success(_)) => {
            Err(Error::ContractExecution(InvokeFailure::UnknownCode(0)))
        }
        (TerminalKind::Failed, other) => Err(Error::ContractExecution(failure(&other))),
    }
}
