use spot_handler::{Checker, SpotHandler};
use spot_handler_castai::CastClient;
use spot_handler_kubeapi::KubeApi;
use tokio_util::sync::CancellationToken;

use config::Config;

mod config;
mod health;
mod signal;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_COMMIT: &str = match option_env!("GIT_COMMIT") {
    Some(commit) => commit,
    None => "undefined",
};
const GIT_REF: &str = match option_env!("GIT_REF") {
    Some(git_ref) => git_ref,
    None => "no-ref",
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::parse_args();
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .init();

    let kubeapi = KubeApi::new().await?;
    let k8s_version = kubeapi.server_version().await?;
    tracing::info!(
        version = VERSION,
        git_commit = GIT_COMMIT,
        git_ref = GIT_REF,
        k8s_version = %k8s_version.git_version,
        "Starting spot handler"
    );

    let checker = Checker::new(config.provider, config.poll_interval())?;
    let cast = CastClient::new(&config.cast_config(VERSION))?;

    let token = CancellationToken::new();
    tokio::spawn(signal::cancel_on_shutdown(token.clone()));

    if let Some(port) = config.http_port {
        tokio::spawn(health::serve(port, token.clone()));
    }

    tracing::info!(
        provider = %checker.provider(),
        node = %config.node_name,
        poll_interval = ?config.poll_interval(),
        "Running spot handler"
    );
    let mut handler = SpotHandler::new(
        checker,
        kubeapi,
        cast,
        &config.node_name,
        config.poll_interval(),
    );
    handler
        .run(&token)
        .await
        .inspect_err(|err| tracing::error!(?err, "Spot handler failed"))?;

    tracing::info!("Spot handler stopped");
    Ok(())
}
