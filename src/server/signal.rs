// Signal handling module
//
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use tokio::sync::watch;

use crate::logger;

/// Spawn a task that flips `shutdown` to `true` on SIGTERM or SIGINT.
pub fn start_signal_handler(shutdown: watch::Sender<bool>) {
    tokio::spawn(async move {
        let signal_name = wait_for_signal().await;
        logger::log_info(&format!(
            "[SIGNAL] {signal_name} received, initiating graceful shutdown"
        ));
        shutdown.send_replace(true);
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                logger::log_error(&format!(
                    "Failed to register signal handlers: {e}; falling back to Ctrl+C only"
                ));
                return ctrl_c().await;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        // Without any signal source, never trigger shutdown
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
