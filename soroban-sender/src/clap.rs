use std::time::Duration;

use clap::Parser;

use crate::options::SendOptions;

#[derive(Debug, Clone, Parser)]
pub struct SendOpts {
    /// Secret seed (S…) used to sign locally
    #[arg(long, value_name = "SECRET", env = "SOROBAN_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Total time to wait for the transaction to be applied, in milliseconds
    #[arg(long, value_name = "MILLIS", default_value = "60000")]
    pub timeout: u64,

    /// Delay between status lookups, in milliseconds (defaults to min(1000, timeout))
    #[arg(long, value_name = "MILLIS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,
}

impl From<SendOpts> for SendOptions {
    fn from(opts: SendOpts) -> SendOptions {
        SendOptions {
            timeout: Some(Duration::from_millis(opts.timeout)),
            poll_interval: opts.poll_interval.map(Duration::from_millis),
            skip_adding_footprint: None,
            secret_key: opts.secret_key,
            soroban_context: None,
        }
    }
}
