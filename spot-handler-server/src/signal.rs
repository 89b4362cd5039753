//! OS signal handling.
//!
//! On Unix SIGINT, SIGTERM and SIGQUIT are handled, with
//! [`tokio::signal::ctrl_c`] awaited as a fallback. Elsewhere only Ctrl-C.

use tokio_util::sync::CancellationToken;

/// Cancels `token` once the process is asked to shut down.
pub(crate) async fn cancel_on_shutdown(token: CancellationToken) {
    match wait_for_shutdown_signal().await {
        Ok(()) => {
            tracing::info!("Received shutdown signal");
            token.cancel();
        }
        Err(err) => tracing::error!(?err, "Failed to install signal handlers"),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
