mod analyzer;
mod api_server;
mod chart;
mod config;
mod error;
mod llm_gateway;
mod poller;
mod result_parser;
mod schema;
mod ui;
mod uploader;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber so RUST_LOG can live there too.
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env()?;
    let client = llm_gateway::GeminiClient::new(&config)?;
    tracing::info!(
        model = %config.model,
        poll_interval = ?config.poll.interval,
        poll_max_attempts = config.poll.max_attempts,
        "starting sentiment analysis service"
    );

    api_server::start_api_server(&config, Arc::new(client)).await
}
