use std::time;

use anyhow::anyhow;
use async_trait::async_trait;
use derive_builder::Builder;
use jsonrpsee::{
    core::client::ClientT,
    core::traits::ToRpcParams,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use serde::de::DeserializeOwned;
use soroban_sender::{
    network::ChainMetadata,
    node::{NodeClient, NodeError, SimulationResult, SubmissionHandle, TransactionStatus},
    transaction::{SignedTransaction, Transaction},
};
use tracing::{debug, info, warn};
use url::Url;

use super::{
    api::{
        GetHealthResponse, GetLatestLedgerResponse, GetNetworkResponse, GetTransactionParams,
        GetTransactionResponse, SendTransactionResponse, SimulateTransactionResponse,
        TransactionParams,
    },
    error::{Result, RpcError},
};

#[derive(Debug, Builder, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SorobanRpcConfig {
    #[builder(default = "Url::parse(\"http://127.0.0.1:8000/soroban/rpc\").unwrap()")]
    pub url: Url,
    /// Network the server is expected to serve
    #[builder(default = "ChainMetadata::testnet()")]
    pub network: ChainMetadata,
    /// Seconds to wait for a single JSON-RPC call
    #[builder(default = "30")]
    pub request_timeout: u64,
    /// Seconds to wait for the server to report healthy
    #[builder(default = "90")]
    pub startup_timeout: u64,
}

impl SorobanRpcConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(url) = &self.url {
            match url.scheme() {
                "http" | "https" => Ok(()),
                scheme => Err(format!(
                    "Url scheme invalid in SorobanRpcConfig. Expected https/http, but got {}",
                    scheme,
                )),
            }
        } else {
            Ok(())
        }
    }
}

/// Soroban RPC client for simulating, submitting and tracking transactions
pub struct SorobanRpcClient {
    config: SorobanRpcConfig,
    client: HttpClient,
}

impl SorobanRpcClient {
    /// Connect once the server reports healthy, or fail after `startup_timeout` seconds
    pub async fn connect(config: SorobanRpcConfig) -> Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(time::Duration::from_secs(config.request_timeout))
            .build(config.url.as_str())?;
        let client = Self { config, client };

        let giveup_time =
            time::Instant::now() + time::Duration::from_secs(client.config.startup_timeout);

        let base = time::Duration::from_secs(1);
        let mut attempt = 0;
        loop {
            let health = client.get_health().await;
            if health.as_ref().map_or(false, GetHealthResponse::is_healthy) {
                client.check_network().await;
                return Ok(client);
            }

            if time::Instant::now() > giveup_time {
                return match health {
                    Err(err) => Err(RpcError::StartupError(anyhow!(
                        "health request failed: {:?}",
                        err
                    ))),
                    Ok(health) => Err(RpcError::StartupError(anyhow!(
                        "server unhealthy: {:?}",
                        health
                    ))),
                };
            }

            // Simple exponential backoff
            let wait_duration = base
                .checked_mul(2u32.pow(attempt))
                .ok_or(RpcError::StartupError(anyhow!("cannot wait any longer")))?;
            debug!(?wait_duration, attempt, "Soroban RPC not ready yet.");
            tokio::time::sleep(wait_duration).await;
            attempt += 1;
        }
    }

    pub fn get_config(&self) -> &SorobanRpcConfig {
        &self.config
    }

    /// Chain metadata of the configured network, pointing at this server
    pub fn chain(&self) -> ChainMetadata {
        ChainMetadata {
            soroban_rpc_url: Some(self.config.url.clone()),
            ..self.config.network.clone()
        }
    }

    pub async fn get_health(&self) -> Result<GetHealthResponse> {
        self.request("getHealth", rpc_params![]).await
    }

    pub async fn get_network(&self) -> Result<GetNetworkResponse> {
        self.request("getNetwork", rpc_params![]).await
    }

    pub async fn get_latest_ledger(&self) -> Result<GetLatestLedgerResponse> {
        self.request("getLatestLedger", rpc_params![]).await
    }

    async fn check_network(&self) {
        match self.get_network().await {
            Ok(network) if network.passphrase != self.config.network.network_passphrase => warn!(
                expected = %self.config.network.network_passphrase,
                found = %network.passphrase,
                "Soroban RPC serves another network."
            ),
            Ok(network) => info!(
                passphrase = %network.passphrase,
                protocol_version = network.protocol_version,
                "Connected to Soroban RPC."
            ),
            Err(err) => warn!(%err, "Couldn't query the network of Soroban RPC."),
        }
    }

    /// Make a request to Soroban JSON RPC
    async fn request<P, U>(&self, method: &str, params: P) -> Result<U>
    where
        U: DeserializeOwned,
        P: ToRpcParams + Send,
    {
        self.client.request(method, params).await.map_err(|err| {
            debug!(%err, method, "Soroban JSON RPC call error.");
            RpcError::JSONRpcError(err)
        })
    }
}

#[async_trait]
impl NodeClient for SorobanRpcClient {
    async fn simulate(&self, tx: &Transaction) -> std::result::Result<SimulationResult, NodeError> {
        debug!(hash = %tx.hash_hex(), "Simulating transaction");
        let params = TransactionParams {
            transaction: tx.to_xdr(),
        };

        let resp: SimulateTransactionResponse =
            self.request("simulateTransaction", params).await?;

        Ok(resp.try_into()?)
    }

    async fn submit(
        &self,
        tx: &SignedTransaction,
    ) -> std::result::Result<SubmissionHandle, NodeError> {
        debug!(hash = %tx.hash_hex(), "Submitting transaction");
        let params = TransactionParams {
            transaction: tx.to_xdr(),
        };

        let resp: SendTransactionResponse = self.request("sendTransaction", params).await?;
        debug!(status = %resp.status, latest_ledger = ?resp.latest_ledger, "Transaction sent");

        resp.try_into()
    }

    async fn get_status(
        &self,
        handle: &SubmissionHandle,
    ) -> std::result::Result<TransactionStatus, NodeError> {
        let params = GetTransactionParams {
            hash: handle.to_string(),
        };

        let resp: GetTransactionResponse = self.request("getTransaction", params).await?;
        debug!(%handle, status = %resp.status, latest_ledger = ?resp.latest_ledger, "Transaction status");

        resp.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SorobanRpcConfigBuilder::default().build().unwrap();

        assert_eq!(config.url.as_str(), "http://127.0.0.1:8000/soroban/rpc");
        assert_eq!(config.network, ChainMetadata::testnet());
        assert_eq!(config.startup_timeout, 90);
    }

    #[test]
    fn rejects_websocket_url() {
        let result = SorobanRpcConfigBuilder::default()
            .url(Url::parse("ws://127.0.0.1:8000").unwrap())
            .build();

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn chain_points_at_server() {
        let config = SorobanRpcConfigBuilder::default()
            .url(Url::parse("https://rpc.example.org/").unwrap())
            .network(ChainMetadata::futurenet())
            .build()
            .unwrap();
        let client = SorobanRpcClient {
            client: HttpClientBuilder::default().build(config.url.as_str()).unwrap(),
            config,
        };

        let chain = client.chain();
        assert_eq!(chain.id, "futurenet");
        assert_eq!(
            chain.soroban_rpc_url.map(String::from),
            Some("https://rpc.example.org/".to_string())
        );
    }
}
