//! Runs the handler once against an API-Gateway style event.
//!
//! Usage: `invoke_event [EVENT_FILE]`. Reads the event JSON from the file, or
//! from stdin when no file is given, and prints the response JSON to stdout.

use std::io::Read;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use translation_handler::{HandlerConfig, HttpEvent, TranslationHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "translation_handler=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read event file {path}"))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read event from stdin")?;
            buffer
        }
    };

    let event: HttpEvent = serde_json::from_str(&raw).context("event is not valid JSON")?;

    let config = HandlerConfig::from_env().context("invalid handler configuration")?;
    let handler = TranslationHandler::from_config(&config)
        .context("failed to build translation handler")?;

    let response = handler.handle(&event).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("failed to encode response")?
    );

    Ok(())
}
