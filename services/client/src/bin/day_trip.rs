//! services/client/src/bin/day_trip.rs

use client_lib::{
    adapters::{FileCredentialStore, HttpGateway, StaticPrimeTokenizer},
    config::Config,
    error::ClientError,
    page::Page,
    protocol::PageUpdate,
    sink::JsonLinesSink,
};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    // Logs go to stderr; stdout carries the page updates.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Initialize Adapters ---
    let gateway = Arc::new(HttpGateway::new(&config.api_base_url, config.http_timeout)?);
    let store = Arc::new(FileCredentialStore::new(config.credential_path.clone()));
    let tokenizer = Arc::new(StaticPrimeTokenizer::new(config.card_prime.clone()));

    // --- 3. Start the Update Writer ---
    let (tx, mut rx) = mpsc::unbounded_channel::<PageUpdate>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(update) = rx.recv().await {
            let mut line = serde_json::to_vec(&update)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<(), ClientError>(())
    });

    // --- 4. Build the Page & Handle Shutdown ---
    let page = Page::new(gateway, store, tokenizer, Arc::new(JsonLinesSink::new(tx)));
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    // --- 5. Run the Event Loop ---
    page.load().await;
    info!("Page loaded. Reading events from stdin...");
    let result = page.run(tokio::io::stdin(), cancel).await;

    // Dropping the page closes the update channel so the writer can finish.
    drop(page);
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Update writer failed: {}", e),
        Err(e) => error!("Update writer panicked: {}", e),
    }
    info!("Client stopped.");
    result
}
