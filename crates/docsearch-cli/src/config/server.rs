//! Listener address and shutdown grace period.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Ports that can be bound without elevated privileges.
const UNPRIVILEGED_PORTS: RangeInclusive<u16> = 1024..=u16::MAX;

/// Accepted grace period for in-flight requests, in seconds.
const SHUTDOWN_GRACE_SECS: RangeInclusive<u64> = 1..=300;

/// Where the HTTP server listens and how long it drains on shutdown.
///
/// ```bash
/// docsearch --host 0.0.0.0 --port 8080 --shutdown-timeout 10
/// ```
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Interface to bind, `0.0.0.0` exposes the server on every interface.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    #[serde(default = "loopback")]
    pub host: IpAddr,

    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds in-flight requests get to finish after SIGINT or SIGTERM.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn loopback() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl ServerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            UNPRIVILEGED_PORTS.contains(&self.port),
            "port {} requires elevated privileges, pick one in {UNPRIVILEGED_PORTS:?}",
            self.port,
        );
        ensure!(
            SHUTDOWN_GRACE_SECS.contains(&self.shutdown_timeout),
            "shutdown timeout of {}s is outside {SHUTDOWN_GRACE_SECS:?}",
            self.shutdown_timeout,
        );
        Ok(())
    }

    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    #[must_use]
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: loopback(),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}
