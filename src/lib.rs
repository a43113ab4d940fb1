//! # edgequake-summarizer
//!
//! A thin HTTP backend that summarises text with Google Gemini and extracts
//! plain text from uploaded PDFs.
//!
//! ## Request Flow
//!
//! ```text
//! POST /summarize
//!  ├─ 1. Validate  body → SummaryRequest (no text / empty / < 50 chars)
//!  ├─ 2. Prompt    length-tiered instruction with a JSON output contract
//!  ├─ 3. Model     single Gemini call via edgequake-llm (no retry)
//!  └─ 4. Normalize tolerant JSON decode, ≤ 4 key points, quality metrics
//!
//! POST /extract-pdf
//!  ├─ 1. Validate  multipart `file`, non-empty name, `.pdf` extension
//!  └─ 2. Extract   per-page text via pdfium (spawn_blocking), joined by '\n'
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_summarizer::{serve, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder()
//!         .port(5000)
//!         .gemini_api_key(std::env::var("GEMINI_API_KEY").ok())
//!         .build()?;
//!     serve(AppState::from_config(config)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `summarizer-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CorsOrigins, GenerationOptions, LengthTier, ServerConfig, ServerConfigBuilder};
pub use error::{NormalizeError, SummarizerError};
pub use output::{ExtractResult, HealthStatus, QualityMetrics, SummarizeResponse, SummaryResult};
pub use pipeline::extract::{PdfTextExtractor, PdfiumExtractor};
pub use pipeline::llm::{ProviderModel, SummaryModel};
pub use pipeline::normalize::normalize;
pub use prompts::build_prompt;
pub use server::{router, serve, AppState};
pub use summarize::{summarize, SummaryRequest};
