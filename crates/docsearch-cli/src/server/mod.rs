//! HTTP listener with signal driven graceful shutdown.

mod lifecycle;
mod shutdown;

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use self::lifecycle::{ServeOutcome, report};
use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves `app` until SIGINT or SIGTERM, then drains for at most the
/// configured shutdown timeout.
///
/// Peer addresses are attached to requests for client IP resolution.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn serve(app: Router, config: ServerConfig) -> io::Result<()> {
    let addr = config.server_addr();
    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            %addr,
            "Listening on every interface"
        );
    }

    let started = Instant::now();
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => return report(Err(error), started),
    };
    tracing::info!(target: TRACING_TARGET_SERVER_STARTUP, %addr, "Listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let grace = config.shutdown_timeout();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.clone().cancelled_owned());

    let drain_deadline = async {
        shutdown.cancelled().await;
        tokio::time::sleep(grace).await;
    };

    let outcome = tokio::select! {
        result = server.into_future() => result.map(|()| ServeOutcome::Drained),
        () = drain_deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                grace_secs = grace.as_secs(),
                "Connections still open after the grace period, dropping them"
            );
            Ok(ServeOutcome::DeadlineElapsed)
        }
    };

    report(outcome, started)
}
