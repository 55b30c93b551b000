use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use translation_handler::server::{router, shutdown_signal};
use translation_handler::{HandlerConfig, ServerConfig, TranslationHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "translation_handler=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handler_config = HandlerConfig::from_env().context("invalid handler configuration")?;
    let server_config = ServerConfig::from_env().context("invalid server configuration")?;

    info!(
        model = %handler_config.model,
        allow_origin = %handler_config.allow_origin,
        status_mapping = ?handler_config.status_mapping,
        "loaded configuration"
    );

    let handler = TranslationHandler::from_config(&handler_config)
        .context("failed to build translation handler")?;
    let app = router(Arc::new(handler), server_config.max_body_bytes);

    let addr = server_config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("translation server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("translation server stopped");
    Ok(())
}
