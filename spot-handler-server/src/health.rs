use std::net::SocketAddr;

use axum::{Router, routing::get};
use tokio_util::sync::CancellationToken;

/// Serves `/healthz` on `port` until `token` is cancelled.
pub(crate) async fn serve(port: u16, token: CancellationToken) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, ?err, "Failed to start health server");
            return;
        }
    };
    tracing::info!("Listening on http://{addr}");

    if let Err(err) = axum::serve(listener, router())
        .with_graceful_shutdown(token.cancelled_owned())
        .await
    {
        tracing::error!(?err, "Health server failed");
    }
}

fn router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

async fn healthz() -> &'static str {
    "ok"
}
