use std::net::SocketAddr;
use std::sync::Arc;

use subscription_backend::{
    build_router, config::Config, services::billing_service::StripeBilling, AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let billing = StripeBilling::from_config(&config)?;
    let addr: SocketAddr = config.server_address.parse()?;
    let app = build_router(AppState::new(config, Arc::new(billing)));

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
