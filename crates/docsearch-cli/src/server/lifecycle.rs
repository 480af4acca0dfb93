//! Final log line of a server run.

use std::io;
use std::time::Instant;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// How a run that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Every connection finished within the grace period.
    Drained,
    /// Open connections were dropped at the deadline.
    DeadlineElapsed,
}

/// Logs how the run ended, measured from `started`, and passes errors on.
pub fn report(outcome: io::Result<ServeOutcome>, started: Instant) -> io::Result<()> {
    let uptime_secs = started.elapsed().as_secs();

    let error = match outcome {
        Ok(outcome) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs,
                ?outcome,
                "Server stopped"
            );
            return Ok(());
        }
        Err(error) => error,
    };

    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        uptime_secs,
        error = %error,
        kind = ?error.kind(),
        hint = bind_hint(error.kind()),
        "Server failed"
    );
    Err(error)
}

/// Operator hint for the IO errors a listener typically hits.
fn bind_hint(kind: io::ErrorKind) -> &'static str {
    match kind {
        io::ErrorKind::AddrInUse => "another process holds the port, stop it or change PORT",
        io::ErrorKind::AddrNotAvailable => "HOST is not assigned to any local interface",
        io::ErrorKind::PermissionDenied => "use a port of 1024 or above",
        _ => "none",
    }
}
