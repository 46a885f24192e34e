use anyhow::Context;
use cohort::logging::{init_tracing, shutdown_tracer};
use cohort::metrics::{init_metrics, metrics_app};
use cohort::router::init_router;
use cohort::state::init_app_state;
use cohort_config::ServerConfig;
use cohort_db::run_migrations;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;

    let state = init_app_state().await;
    run_migrations(&state.db)
        .await
        .context("Failed to run database migrations")?;

    let mut app = init_router(state);
    if let Some(handle) = init_metrics().context("Failed to install metrics recorder")? {
        app = app.merge(metrics_app(handle));
    }

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!("🚀 Server running on http://{}", address);
    info!("📚 Swagger UI available at http://{}/swagger-ui", address);
    info!("📖 Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    shutdown_tracer().await;
    Ok(())
}
