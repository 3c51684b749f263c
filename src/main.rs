/// API сервер для аналитического ядра

use business_insights_ml::api::{router, AppState};
use business_insights_ml::config::{AnalysisConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let server = ServerConfig::from_env()?;
    let app = router(AppState::new(AnalysisConfig::default()));

    let listener = tokio::net::TcpListener::bind(server.addr).await?;
    tracing::info!("Server listening on http://{}", server.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
