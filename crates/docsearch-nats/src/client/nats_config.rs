//! Connection settings for the NATS server holding the KV buckets.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_URL: &str = "nats://127.0.0.1:4222";

/// Upper bound of the reconnect backoff.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// NATS connection settings.
///
/// `nats_url` may list several cluster members separated by commas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct NatsConfig {
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-url", env = "NATS_URL", default_value = DEFAULT_URL)
    )]
    pub nats_url: String,

    #[cfg_attr(feature = "config", arg(long = "nats-token", env = "NATS_TOKEN"))]
    pub nats_token: Option<String>,

    /// Name reported to the server, visible in its connection list.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "nats-client-name",
            env = "NATS_CLIENT_NAME",
            default_value = "docsearch"
        )
    )]
    pub nats_client_name: String,

    #[cfg_attr(
        feature = "config",
        arg(
            long = "nats-connect-timeout",
            env = "NATS_CONNECT_TIMEOUT_SECS",
            default_value_t = 10
        )
    )]
    pub nats_connect_timeout_secs: u64,

    /// Reconnect attempts before the client gives up, 0 retries forever.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "nats-max-reconnects",
            env = "NATS_MAX_RECONNECTS",
            default_value_t = 10
        )
    )]
    pub nats_max_reconnects: usize,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            nats_url: DEFAULT_URL.to_owned(),
            nats_token: None,
            nats_client_name: "docsearch".to_owned(),
            nats_connect_timeout_secs: 10,
            nats_max_reconnects: 10,
        }
    }
}

impl NatsConfig {
    pub fn new(nats_url: impl Into<String>) -> Self {
        Self {
            nats_url: nats_url.into(),
            ..Self::default()
        }
    }

    pub fn servers(&self) -> impl Iterator<Item = &str> {
        self.nats_url.split(',').map(str::trim)
    }

    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.nats_connect_timeout_secs)
    }

    /// `None` when reconnects are unbounded.
    #[inline]
    pub fn max_reconnects(&self) -> Option<usize> {
        (self.nats_max_reconnects > 0).then_some(self.nats_max_reconnects)
    }

    /// Delay before reconnect attempt `attempt`: 500ms doubling up to 30s.
    pub fn reconnect_delay(attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.min(16)).unwrap_or(16);
        Duration::from_millis(500)
            .saturating_mul(2_u32.saturating_pow(exponent))
            .min(MAX_RECONNECT_DELAY)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(server) = self
            .servers()
            .find(|server| !(server.starts_with("nats://") || server.starts_with("tls://")))
        {
            return Err(Error::invalid_config(format!(
                "NATS server '{server}' must use the nats:// or tls:// scheme"
            )));
        }

        if self.nats_token.as_deref().is_some_and(str::is_empty) {
            return Err(Error::invalid_config("NATS token is set but empty"));
        }
        if self.nats_connect_timeout_secs == 0 {
            return Err(Error::invalid_config("NATS connect timeout must be positive"));
        }

        Ok(())
    }
}
