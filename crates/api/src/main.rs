use anyhow::Context;
use secrecy::ExposeSecret;

use idgate_api::app::{AppServices, build_app};
use idgate_api::config::AppConfig;
use idgate_infra::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    idgate_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let store = Store::connect(config.store_url.expose_secret())
        .await
        .context("failed to connect to store")?;
    tracing::info!(
        backend = store.backend(),
        credential_mode = %config.credentials.mode(),
        "store connected"
    );

    let app = build_app(AppServices::new(&store, config.credentials.scheme()));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
