use anyhow::anyhow;
use clap::Parser;
use soroban_sender::network::ChainMetadata;
use url::Url;

use crate::client::{SorobanRpcConfig, SorobanRpcConfigBuilder};

#[derive(Debug, Clone, Parser)]
pub struct RpcOpts {
    /// URL of the Soroban RPC server
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8000/soroban/rpc")]
    pub rpc_url: Url,

    /// Stellar network (public | testnet | futurenet | standalone)
    #[arg(long, value_name = "NETWORK", default_value = "testnet", value_parser = parse_network)]
    pub network: ChainMetadata,

    /// Seconds to wait for the server to report healthy
    #[arg(long, value_name = "SECONDS", default_value = "90")]
    pub startup_timeout: u64,
}

fn parse_network(id: &str) -> Result<ChainMetadata, String> {
    ChainMetadata::from_id(id).ok_or(format!("unknown network {}", id))
}

impl TryFrom<RpcOpts> for SorobanRpcConfig {
    type Error = anyhow::Error;
    fn try_from(opts: RpcOpts) -> Result<SorobanRpcConfig, anyhow::Error> {
        SorobanRpcConfigBuilder::default()
            .url(opts.rpc_url)
            .network(opts.network)
            .startup_timeout(opts.startup_timeout)
            .build()
            .map_err(|err| anyhow!("Couldn't build SorobanRpcConfig: {}", err))
    }
}
