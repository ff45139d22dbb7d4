use std::sync::Arc;

use anyhow::Context;

use catalog_api::app;
use catalog_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables win anyway.
    let _ = dotenvy::dotenv();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    catalog_observability::init(config.log_format);

    let services = app::build_services(&config)
        .await
        .context("failed to initialise catalog store")?;
    let router = app::build_app(Arc::new(services), &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
