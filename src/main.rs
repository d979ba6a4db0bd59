use rummy_engine::api;
use rummy_engine::config::ServerConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    if let Err(e) = api::server::start_server(config).await {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
