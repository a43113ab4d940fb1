//! Server binary for edgequake-summarizer.
//!
//! A thin shim over the library crate that maps flags and environment
//! variables to `ServerConfig`, sets up logging, and serves.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_summarizer::{serve, AppState, CorsOrigins, ServerConfig};
use std::io;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"ENDPOINTS:
  GET  /health        Health check
  POST /summarize     JSON {"text": "...", "length": "short|medium|detailed"}
  POST /extract-pdf   multipart/form-data with a `file` field (PDF)

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY     Google Gemini API key (summarization disabled when unset)
  GEMINI_MODEL       Gemini model ID (default: gemini-1.5-flash)
  ALLOWED_ORIGINS    `*` or comma-separated CORS origins
  HOST / PORT        Bind address (default: 0.0.0.0:5000)
  DEBUG              `true` enables debug logging
  RUST_LOG           Overrides the log filter entirely
  PDFIUM_LIB_PATH    Path to an existing libpdfium; skips auto-download

SETUP:
  1. Get an API key:  https://makersuite.google.com/app/apikey
  2. Export it:       export GEMINI_API_KEY=...
  3. Start:           summarizer-server --port 5000
"#;

/// Summarize text with Gemini and extract text from PDFs over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "summarizer-server",
    version,
    about = "HTTP backend for Gemini summarization and PDF text extraction",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// TCP port.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// `true` (any case) enables debug logging.
    #[arg(long, env = "DEBUG", default_value = "False")]
    debug: String,

    /// `*` or comma-separated list of allowed CORS origins.
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*")]
    allowed_origins: String,

    /// Gemini model ID.
    #[arg(long, env = "GEMINI_MODEL", default_value = edgequake_summarizer::config::DEFAULT_MODEL)]
    model: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "MAX_UPLOAD_BYTES",
          default_value_t = edgequake_summarizer::config::DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,
}

fn debug_enabled(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Build config ─────────────────────────────────────────────────────
    let config = ServerConfig::builder()
        .host(cli.host)
        .port(cli.port)
        .debug(debug_enabled(&cli.debug))
        .allowed_origins(CorsOrigins::parse(&cli.allowed_origins))
        .gemini_api_key(std::env::var("GEMINI_API_KEY").ok())
        .model(cli.model)
        .max_upload_bytes(cli.max_upload_bytes)
        .build()
        .context("Invalid configuration")?;

    // ── Logging setup ────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .with_writer(io::stderr)
        .init();
    info!("{:?}", config);

    // ── Ensure PDFium engine is available ────────────────────────────────
    // First run downloads the library into the per-user cache. Failure is
    // not fatal: /extract-pdf reports it per request.
    if let Err(e) = tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None)) {
        warn!("PDFium unavailable, /extract-pdf will fail: {}", e);
    }

    let state = AppState::from_config(config);
    print_banner(&state);

    serve(state).await.context("Server failed")?;
    Ok(())
}

fn print_banner(state: &AppState) {
    info!("Gemini Summary Maker backend starting");
    info!("Endpoints available:");
    info!("   GET  /health      - Health check");
    info!("   POST /extract-pdf - Extract text from PDF");
    info!("   POST /summarize   - Gemini AI summarization");

    if state.model.is_some() {
        info!("Gemini AI is ready ({})", state.config.model);
    } else {
        warn!("Gemini AI not configured; /summarize will answer 400");
        warn!("   1. Get a free API key: https://makersuite.google.com/app/apikey");
        warn!("   2. Export it: GEMINI_API_KEY=your_key_here");
        warn!("   3. Restart the server");
    }
}
