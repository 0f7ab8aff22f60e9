mod analysis;
mod config;
mod errors;
mod llm_client;
mod ocr;
mod parse;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::LlmResumeAnalyzer;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::ocr::{OcrConfig, TesseractOcr};
use crate::parse::TextExtractor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fitcheck v{}", env!("CARGO_PKG_VERSION"));

    let ocr = TesseractOcr::new(OcrConfig {
        command: config.tesseract_cmd.clone(),
        language: config.ocr_lang.clone(),
    });
    info!(
        "OCR engine: {} ({})",
        config.tesseract_cmd.display(),
        config.ocr_lang
    );
    let extractor = Arc::new(TextExtractor::new(Arc::new(ocr)));

    let llm = LlmClient::new(config.openrouter_api_key.clone(), &config.llm_base_url)?;
    let analyzer = LlmResumeAnalyzer::new(Arc::new(llm), config.analysis_models());
    anyhow::ensure!(
        !analyzer.models().is_empty(),
        "At least one LLM must be configured for resume analysis"
    );
    info!("Analysis models: {}", analyzer.models().join(" -> "));

    let state = AppState {
        config: config.clone(),
        extractor,
        analyzer: Arc::new(analyzer),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
