use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use pumpfiction::logging::{init_tracing, shutdown_tracer};
use pumpfiction::metrics::{init_metrics, metrics_app};
use pumpfiction::router::init_router;
use pumpfiction::state::init_app_state;
use pumpfiction_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let server = ServerConfig::from_env();

    if let Some(handle) = init_metrics()? {
        let metrics_addr = server.metrics_addr();
        let listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {metrics_addr}"))?;
        info!(addr = %metrics_addr, "Metrics available at /metrics");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let state = init_app_state(&server).await?;
    let app = init_router(state);

    let api_addr = server.api_addr();
    let listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("Failed to bind {api_addr}"))?;

    info!(addr = %api_addr, storage = %server.storage, "🚀 Server running");
    info!("📚 Swagger UI available at http://{api_addr}/swagger-ui");
    info!("📖 Scalar UI available at http://{api_addr}/scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    shutdown_tracer();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
