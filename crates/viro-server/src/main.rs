use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use viro_infrastructure::ConfigService;
use viro_interaction::CohereApiAgent;
use viro_server::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_service = ConfigService::locate(None)?;
    let config = config_service.load()?;
    tracing::info!(config = %config_service.path().display(), "configuration loaded");

    let agent = CohereApiAgent::from_settings(&config.backend)?;
    tracing::info!(model = agent.model(), "generation backend ready");

    let app = build_router(AppState::new(Arc::new(agent)));
    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
