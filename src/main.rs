/// API сервер: считает результат один раз при старте и отдаёт его

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use wellbeing_pca::{api, dataset::RawTable, pipeline, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    // Ошибка здесь фатальна: неполный результат не отдаётся
    let table = RawTable::from_path(&config.server.data_path)
        .with_context(|| format!("failed to load {}", config.server.data_path.display()))?;
    let outcome = pipeline::run(&table, &config.analysis).context("analysis pipeline failed")?;

    if outcome.elbow.is_overridden() {
        tracing::info!(
            "Using configured k = {} (detected elbow: {:?})",
            outcome.elbow.selected,
            outcome.elbow.detected
        );
    }

    let state = api::AppState::new(outcome.payload).context("failed to serialize payload")?;
    let app = api::router(state, config.server.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!("Server listening on http://{}", config.server.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
