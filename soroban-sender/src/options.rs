//! Submission options and the context a transaction is sent in

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use derive_builder::Builder;

use crate::network::ChainMetadata;
use crate::node::NodeClient;
use crate::signer::WalletConnector;

/// Total polling budget when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Upper bound of the default poll interval
pub const MAX_DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Active network, wallet connector and node client
#[derive(Clone, Default)]
pub struct SorobanContext {
    pub active_chain: Option<ChainMetadata>,
    pub active_connector: Option<Arc<dyn WalletConnector>>,
    pub server: Option<Arc<dyn NodeClient>>,
}

impl SorobanContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain: ChainMetadata) -> Self {
        self.active_chain = Some(chain);
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn WalletConnector>) -> Self {
        self.active_connector = Some(connector);
        self
    }

    pub fn with_server(mut self, server: Arc<dyn NodeClient>) -> Self {
        self.server = Some(server);
        self
    }
}

impl fmt::Debug for SorobanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SorobanContext")
            .field("active_chain", &self.active_chain)
            .field(
                "active_connector",
                &self.active_connector.as_ref().map(|connector| connector.name()),
            )
            .field("server", &self.server.as_ref().map(|_| "NodeClient"))
            .finish()
    }
}

/// Options of a submission. Unset fields fall back to the sender's defaults, then to the
/// built-in defaults.
#[derive(Clone, Default, Builder)]
#[builder(default, setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct SendOptions {
    /// Total polling budget
    pub timeout: Option<Duration>,
    /// Delay between status lookups, defaults to `min(1s, timeout)`
    pub poll_interval: Option<Duration>,
    /// Reserved, has no effect
    pub skip_adding_footprint: Option<bool>,
    /// Sign locally with this `S…` secret seed instead of the wallet connector
    pub secret_key: Option<String>,
    pub soroban_context: Option<SorobanContext>,
}

impl SendOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.poll_interval {
            Some(Some(interval)) if interval.is_zero() => {
                Err("poll_interval must be greater than zero".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl SendOptions {
    /// Field-wise merge, values in `overrides` win
    pub fn merge(self, overrides: SendOptions) -> SendOptions {
        SendOptions {
            timeout: overrides.timeout.or(self.timeout),
            poll_interval: overrides.poll_interval.or(self.poll_interval),
            skip_adding_footprint: overrides
                .skip_adding_footprint
                .or(self.skip_adding_footprint),
            secret_key: overrides.secret_key.or(self.secret_key),
            soroban_context: overrides.soroban_context.or(self.soroban_context),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
            .unwrap_or_else(|| MAX_DEFAULT_POLL_INTERVAL.min(self.timeout()))
    }
}

impl fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendOptions")
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("skip_adding_footprint", &self.skip_adding_footprint)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("soroban_context", &self.soroban_context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_poll_interval() {
        assert_eq!(SendOptions::default().timeout(), DEFAULT_TIMEOUT);
        assert_eq!(
            SendOptions::default().poll_interval(),
            MAX_DEFAULT_POLL_INTERVAL
        );

        let short = SendOptionsBuilder::default()
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        assert_eq!(short.poll_interval(), Duration::from_millis(300));
    }

    #[test]
    fn per_call_options_win() {
        let defaults = SendOptionsBuilder::default()
            .timeout(Duration::from_secs(5))
            .secret_key("SDEFAULT")
            .build()
            .unwrap();
        let per_call = SendOptionsBuilder::default()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let merged = defaults.merge(per_call);

        assert_eq!(merged.timeout(), Duration::from_secs(2));
        assert_eq!(merged.secret_key.as_deref(), Some("SDEFAULT"));
        assert!(!format!("{:?}", merged).contains("SDEFAULT"));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        assert!(SendOptionsBuilder::default()
            .poll_interval(Duration::ZERO)
            .build()
            .is_err());
    }
}
