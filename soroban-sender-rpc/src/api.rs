//! Soroban RPC request and response payloads

use jsonrpsee::core::traits::ToRpcParams;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use soroban_sender::node::{
    NodeError, SimulationResult, SubmissionHandle, TerminalResponse, TransactionStatus,
};
use soroban_sender::sc_val::ScVal;
use soroban_sender::transaction::{SorobanAuthorizationEntry, SorobanTransactionData};
use soroban_sender::wire;

use super::error::{Result, RpcError};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHealthResponse {
    pub status: String,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
    #[serde(default)]
    pub oldest_ledger: Option<u32>,
    #[serde(default)]
    pub ledger_retention_window: Option<u32>,
}

impl GetHealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNetworkResponse {
    #[serde(default)]
    pub friendbot_url: Option<String>,
    pub passphrase: String,
    pub protocol_version: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLatestLedgerResponse {
    pub id: String,
    pub protocol_version: u32,
    pub sequence: u32,
}

/// Envelope in wire form, shared by `simulateTransaction` and `sendTransaction`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct TransactionParams {
    pub transaction: String,
}

impl ToRpcParams for TransactionParams {
    fn to_rpc_params(self) -> std::result::Result<Option<Box<RawValue>>, serde_json::Error> {
        serde_json::value::to_raw_value(&self).map(Some)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct GetTransactionParams {
    pub hash: String,
}

impl ToRpcParams for GetTransactionParams {
    fn to_rpc_params(self) -> std::result::Result<Option<Box<RawValue>>, serde_json::Error> {
        serde_json::value::to_raw_value(&self).map(Some)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimulateTransactionResponse {
    #[serde(default)]
    pub transaction_data: Option<String>,
    /// Stringified stroop amount
    #[serde(default)]
    pub min_resource_fee: Option<String>,
    #[serde(default)]
    pub results: Vec<SimulateHostFunctionResult>,
    pub latest_ledger: u32,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct SimulateHostFunctionResult {
    #[serde(default)]
    pub auth: Vec<String>,
    pub xdr: String,
}

impl TryFrom<SimulateTransactionResponse> for SimulationResult {
    type Error = RpcError;

    fn try_from(resp: SimulateTransactionResponse) -> Result<SimulationResult> {
        if let Some(error) = resp.error {
            return Ok(SimulationResult {
                latest_ledger: resp.latest_ledger,
                error: Some(error),
                ..Default::default()
            });
        }

        let transaction_data = resp
            .transaction_data
            .as_deref()
            .map(|encoded| wire::from_base64::<SorobanTransactionData>("transactionData", encoded))
            .transpose()
            .map_err(|source| RpcError::conversion("transactionData", source))?;

        let min_resource_fee = resp
            .min_resource_fee
            .as_deref()
            .map(str::parse::<i64>)
            .transpose()
            .map_err(|source| RpcError::conversion("minResourceFee", source))?
            .unwrap_or_default();

        let (auth, return_value) = match resp.results.first() {
            None => (Vec::new(), None),
            Some(result) => {
                let auth = result
                    .auth
                    .iter()
                    .map(|entry| {
                        wire::from_base64::<SorobanAuthorizationEntry>("SorobanAuthorizationEntry", entry)
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|source| RpcError::conversion("SorobanAuthorizationEntry", source))?;
                let return_value = wire::from_base64::<ScVal>("ScVal", &result.xdr)
                    .map_err(|source| RpcError::conversion("ScVal", source))?;
                (auth, Some(return_value))
            }
        };

        Ok(SimulationResult {
            transaction_data,
            min_resource_fee,
            auth,
            return_value,
            latest_ledger: resp.latest_ledger,
            error: None,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendTransactionResponse {
    pub status: String,
    pub hash: String,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
}

impl TryFrom<SendTransactionResponse> for SubmissionHandle {
    type Error = NodeError;

    fn try_from(resp: SendTransactionResponse) -> std::result::Result<Self, NodeError> {
        let rejected = resp.error_result_xdr.is_some()
            || matches!(resp.status.as_str(), "ERROR" | "TRY_AGAIN_LATER");
        if rejected {
            return Err(NodeError::RejectedAtSubmit {
                status: resp.status,
                error_result_xdr: resp.error_result_xdr,
            });
        }

        if matches!(resp.status.as_str(), "PENDING" | "DUPLICATE") {
            Ok(SubmissionHandle::new(resp.hash))
        } else {
            Err(NodeError::UnexpectedStatus(resp.status))
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetTransactionResponse {
    pub status: String,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub return_value: Option<String>,
    #[serde(default)]
    pub result_meta_xdr: Option<String>,
}

impl TryFrom<GetTransactionResponse> for TransactionStatus {
    type Error = NodeError;

    fn try_from(resp: GetTransactionResponse) -> std::result::Result<Self, NodeError> {
        let terminal = || TerminalResponse {
            ledger: resp.ledger,
            result_xdr: resp.result_xdr.clone(),
            return_value_xdr: resp.return_value.clone(),
            result_meta_xdr: resp.result_meta_xdr.clone(),
        };

        match resp.status.as_str() {
            "SUCCESS" => Ok(TransactionStatus::Success(terminal())),
            "FAILED" => Ok(TransactionStatus::Failed(terminal())),
            "NOT_FOUND" => Ok(TransactionStatus::NotFound),
            "PENDING" => Ok(TransactionStatus::Pending),
            other => Err(NodeError::UnexpectedStatus(other.to_string())),
        }
    }
}
