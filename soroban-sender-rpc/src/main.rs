use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use soroban_sender::{
    clap::SendOpts, transaction::Transaction, utils::key_signer::KeySigner, SendOptions,
    SorobanContext, TxSender,
};
use soroban_sender_rpc::{clap::RpcOpts, SorobanRpcClient, SorobanRpcConfig};
use tracing::Level;

/// Simulate, sign, submit and await a Soroban transaction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File holding the unsigned transaction envelope (base64)
    #[arg(long, value_name = "FILE")]
    tx_file: PathBuf,

    #[command(flatten)]
    rpc: RpcOpts,

    #[command(flatten)]
    send: SendOpts,

    #[arg(long, short)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up tracing logger (logs to stderr, stdout carries the outcome).
    let collector = tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(collector)?;

    let config = SorobanRpcConfig::try_from(args.rpc)?;

    let tx_xdr = tokio::fs::read_to_string(&args.tx_file).await?;
    let tx = Transaction::from_xdr(tx_xdr.trim(), &config.network.network_passphrase)?;

    let client = SorobanRpcClient::connect(config).await?;
    let mut context = SorobanContext::new()
        .with_chain(client.chain())
        .with_server(Arc::new(client));

    // The local key is the only wallet a terminal has
    if let Some(secret_key) = &args.send.secret_key {
        context = context.with_connector(Arc::new(KeySigner::from_secret(secret_key)?));
    }

    let options = SendOptions {
        soroban_context: Some(context),
        ..SendOptions::from(args.send)
    };

    let outcome = TxSender::default()
        .send_transaction(Some(tx), Some(options))
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
