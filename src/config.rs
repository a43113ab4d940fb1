//! Configuration types for the summarizer server.
//!
//! Everything the process needs is read once at startup and frozen into a
//! [`ServerConfig`], built via its [`ServerConfigBuilder`]. Handlers receive
//! it through shared state and never look at the environment themselves.

use crate::error::SummarizerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Minimum trimmed length (in characters) of text accepted by `/summarize`.
pub const MIN_TEXT_CHARS: usize = 50;

/// Gemini model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Value shipped in the sample `.env`; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

/// Default request-body cap for uploads: 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Configuration for the summarizer HTTP server.
///
/// # Example
/// ```rust
/// use edgequake_summarizer::{CorsOrigins, ServerConfig};
///
/// let config = ServerConfig::builder()
///     .port(8080)
///     .allowed_origins(CorsOrigins::parse("https://app.example.com"))
///     .build()
///     .unwrap();
/// assert!(!config.gemini_configured());
/// ```
#[derive(Clone)]
pub struct ServerConfig {
    /// Interface to bind. Default: `0.0.0.0`.
    pub host: String,

    /// TCP port. Default: 5000.
    pub port: u16,

    /// Enables debug-level logging. Default: false.
    pub debug: bool,

    /// Origins allowed by the CORS layer. Default: any.
    pub allowed_origins: CorsOrigins,

    /// Gemini API credential. `None`, empty or the placeholder disables
    /// summarization without preventing startup.
    pub gemini_api_key: Option<String>,

    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling parameters sent with every summarization call.
    pub generation: GenerationOptions,

    /// Maximum accepted request body size in bytes. Default: 16 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            debug: false,
            allowed_origins: CorsOrigins::default(),
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            generation: GenerationOptions::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .field("allowed_origins", &self.allowed_origins)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("model", &self.model)
            .field("generation", &self.generation)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// The trimmed API key, or `None` when it is missing, blank or the
    /// placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }

    /// `true` when a usable API key is present.
    pub fn gemini_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Resolve `host:port` into a bindable address.
    pub fn socket_addr(&self) -> Result<SocketAddr, SummarizerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                SummarizerError::InvalidConfig(format!(
                    "Cannot bind to '{}:{}': {}",
                    self.host, self.port, e
                ))
            })
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn debug(mut self, v: bool) -> Self {
        self.config.debug = v;
        self
    }

    pub fn allowed_origins(mut self, origins: CorsOrigins) -> Self {
        self.config.allowed_origins = origins;
        self
    }

    pub fn gemini_api_key(mut self, key: Option<String>) -> Self {
        self.config.gemini_api_key = key;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.generation.temperature = t;
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.generation.top_p = p;
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.generation.max_tokens = n;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, SummarizerError> {
        let c = &self.config;
        let g = &c.generation;
        if !(0.0..=2.0).contains(&g.temperature) {
            return Err(SummarizerError::InvalidConfig(format!(
                "Temperature must be 0.0–2.0, got {}",
                g.temperature
            )));
        }
        if !(0.0..=1.0).contains(&g.top_p) {
            return Err(SummarizerError::InvalidConfig(format!(
                "top_p must be 0.0–1.0, got {}",
                g.top_p
            )));
        }
        if g.max_tokens == 0 {
            return Err(SummarizerError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(SummarizerError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(SummarizerError::InvalidConfig("Model must not be empty".into()));
        }
        Ok(self.config)
    }
}

// ── Generation parameters ────────────────────────────────────────────────

/// Sampling parameters for the summarization call.
///
/// Low temperature keeps summaries close to the source and makes the JSON
/// output shape more reliable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Default: 0.3.
    pub temperature: f32,
    /// Default: 0.8.
    pub top_p: f32,
    /// Maximum output tokens. Default: 1000.
    pub max_tokens: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.8,
            max_tokens: 1000,
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Requested summary size and depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthTier {
    /// 2–3 sentences, main conclusion only.
    Short,
    /// 4–6 sentences. (default)
    #[default]
    Medium,
    /// 6–8 sentences covering every major section.
    Detailed,
}

impl LengthTier {
    /// Parse a tier label. Unrecognised labels fall back to [`LengthTier::Medium`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "short" => LengthTier::Short,
            "detailed" => LengthTier::Detailed,
            _ => LengthTier::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LengthTier::Short => "short",
            LengthTier::Medium => "medium",
            LengthTier::Detailed => "detailed",
        }
    }
}

impl fmt::Display for LengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origins accepted by the CORS layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Any origin (`*`). (default)
    #[default]
    Any,
    /// Exact origins, e.g. `https://app.example.com`.
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse the `ALLOWED_ORIGINS` value: `*` or a comma-separated list.
    ///
    /// Entries are trimmed and empty entries dropped.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "*" {
            return CorsOrigins::Any;
        }
        CorsOrigins::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}
