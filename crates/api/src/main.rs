use anyhow::Context;

use airhouse_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    airhouse_observability::init(config.log_format);
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; using the development secret");
    }

    let app = airhouse_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        persistent = config.use_persistent_stores,
        low_quantity = config.low_quantity,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
