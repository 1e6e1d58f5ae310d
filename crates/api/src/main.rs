use std::sync::Arc;

use anyhow::Context;

use bookstore_api::app::{self, services};
use bookstore_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bookstore_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr.clone();

    let services = services::build_services(config).context("failed to seed reference data")?;
    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
