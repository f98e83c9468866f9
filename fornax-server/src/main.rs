use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use fornax_core::{GenerationService, ModelCell};
use hf_hub::api::tokio::Api;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fornax image generation demo")]
struct Args {
    /// Port to serve the UI on
    #[arg(long, default_value_t = 7860)]
    port: u16,
}

/// Loopback only; the demo is not meant to be exposed.
const HOST: &str = "127.0.0.1";

static SERVICE: ModelCell<GenerationService> = ModelCell::new();

/// The process-wide generation service, loading the pipeline on first use.
pub(crate) async fn service() -> Result<Arc<GenerationService>> {
    SERVICE
        .get_or_load(|| async { GenerationService::load(Api::new()?).await })
        .await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load the pipeline once at startup; a load failure is fatal.
    service().await?;

    let app = routes::router();
    let listener = TcpListener::bind((HOST, args.port)).await?;
    info!("serving on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
