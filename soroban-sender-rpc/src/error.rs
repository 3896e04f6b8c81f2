use anyhow::anyhow;
use jsonrpsee::core::client::Error as ClientError;
use soroban_sender::node::NodeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RpcError>;

/// JSON-RPC error code the server answers with for unknown transactions
pub const NOT_FOUND_CODE: i32 = 404;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Couldn't convert a {label} from Soroban RPC response: {source}")]
    ConversionError {
        label: String,
        source: anyhow::Error,
    },

    #[error("Failed to connect to Soroban RPC: {0}")]
    StartupError(anyhow::Error),

    #[error(transparent)]
    JSONRpcError(#[from] ClientError),
}

impl RpcError {
    pub(crate) fn conversion(label: &str, source: impl Into<anyhow::Error>) -> Self {
        RpcError::ConversionError {
            label: label.to_string(),
            source: source.into(),
        }
    }
}

impl From<RpcError> for NodeError {
    fn from(err: RpcError) -> NodeError {
        match err {
            RpcError::JSONRpcError(ClientError::Call(call)) if call.code() == NOT_FOUND_CODE => {
                NodeError::NotFound
            }
            RpcError::ConversionError { label, source } => NodeError::Decode { label, source },
            err => NodeError::Network(anyhow!(err)),
        }
    }
}
