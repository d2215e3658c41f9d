use anyhow::Context;

use learnhub_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    learnhub_observability::init();

    let config = AppConfig::from_env()?;
    let app = learnhub_api::app::build_app(config.clone()).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
