use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use demandtrack::config::Config;
use demandtrack::db::Db;
use demandtrack::http;
use demandtrack::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let db_path = match &config.db_path {
        Some(path) => path.clone(),
        None => Db::default_path()?,
    };
    tracing::info!(path = %db_path.display(), "opening database");
    let db = Db::open_at(db_path)?;

    let addr: SocketAddr = config.bind.parse()?;
    let state = Arc::new(AppState::new(db, config));
    let app = http::router(state);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
