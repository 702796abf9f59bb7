//! Process signals that stop the HTTP listener.

use std::future::Future;
use std::time::Instant;
use tokio::signal;
use tracing::{info, warn};

/// Why the agent is stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Ctrl+C from an interactive terminal
    Interrupt,
    /// SIGTERM from a service manager or container runtime
    Terminate,
}

impl Shutdown {
    pub fn name(self) -> &'static str {
        match self {
            Shutdown::Interrupt => "SIGINT",
            Shutdown::Terminate => "SIGTERM",
        }
    }
}

/// Wait for the first stop request
///
/// A handler that fails to install is logged and never fires, leaving the other one active.
pub async fn wait_for_shutdown() -> Shutdown {
    let interrupt = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(error = %error, "cannot listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        Shutdown::Interrupt
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
        Shutdown::Terminate
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Shutdown>();

    tokio::select! {
        reason = interrupt => reason,
        reason = terminate => reason,
    }
}

/// Graceful-shutdown future for the snapshot server
///
/// Resolves on the first stop request; axum then stops accepting connections and lets
/// snapshot requests already running finish their tool invocations.
pub fn drain_on_shutdown(started: Instant) -> impl Future<Output = ()> + Send {
    async move {
        let reason = wait_for_shutdown().await;
        info!(
            signal = reason.name(),
            uptime = format!("{:.0?}", started.elapsed()),
            "stop requested, draining in-flight snapshot requests"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(Shutdown::Interrupt.name(), "SIGINT");
        assert_eq!(Shutdown::Terminate.name(), "SIGTERM");
    }
}
