//! Process signals that start a graceful shutdown.

use std::io;

use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Resolves once `signal` fires, or never if its handler cannot be installed.
async fn on_signal(name: &'static str, signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => {
            tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, signal = name, "Draining connections");
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                signal = name,
                %error,
                "Signal handler unavailable"
            );
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(unix)]
async fn sigterm() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn sigterm() -> io::Result<()> {
    std::future::pending().await
}

/// Cancels `shutdown` on SIGINT or SIGTERM.
///
/// Returns early when `shutdown` is cancelled by someone else.
pub async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        () = on_signal("SIGINT", tokio::signal::ctrl_c()) => {}
        () = on_signal("SIGTERM", sigterm()) => {}
        () = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn returns_when_cancelled_elsewhere() {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(shutdown_signal(shutdown.clone()));

        shutdown.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(1), task).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }
}
