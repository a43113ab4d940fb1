//! Error types for the edgequake-summarizer library.
//!
//! Two error types reflect two distinct failure sources:
//!
//! * [`SummarizerError`]: the request cannot be served (bad input, missing
//!   credential, collaborator failure). Every variant's `Display` output is
//!   the exact message returned to the HTTP client in `{"error": ...}`.
//!
//! * [`NormalizeError`]: the model answered, but its text could not be
//!   turned into a [`crate::output::SummaryResult`]. Wrapped in
//!   [`SummarizerError::Normalize`] once it leaves the normalizer.
//!
//! Status-code mapping is the server layer's job; see
//! [`crate::server`].

use thiserror::Error;

/// All request-fatal errors returned by the summarizer library.
#[derive(Debug, Error)]
pub enum SummarizerError {
    // ── Summarize input errors ────────────────────────────────────────────
    /// Body missing, not a JSON object, or without a string `text` field.
    #[error("No text provided")]
    NoTextProvided,

    /// `text` was present but blank after trimming.
    #[error("Empty text provided")]
    EmptyText,

    /// Trimmed `text` is shorter than the minimum.
    #[error("Text too short to summarize (minimum {min} characters)")]
    TextTooShort { min: usize },

    // ── Model errors ──────────────────────────────────────────────────────
    /// No API key configured; the model was never constructed.
    #[error("Gemini AI not available. Please configure GEMINI_API_KEY and restart the server.")]
    AiUnavailable,

    /// The model answered but the text could not be normalised.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The provider call itself failed (network, quota, auth, ...).
    #[error("AI summarization failed: {message}")]
    LlmCallFailed { message: String },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// No multipart field named `file`.
    #[error("No file provided")]
    NoFileProvided,

    /// The `file` field carried an empty filename.
    #[error("No file selected")]
    NoFileSelected,

    /// Filename does not end in `.pdf`.
    #[error("File must be a PDF")]
    NotAPdf,

    /// Every page produced empty text.
    #[error("No text found in PDF. This might be a scanned document.")]
    NoTextInPdf,

    /// pdfium could not be bound, or the document could not be parsed.
    #[error("PDF extraction failed: {detail}")]
    PdfExtractionFailed { detail: String },

    /// Request body exceeded the configured upload limit.
    #[error("Request too large (maximum {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SummarizerError {
    /// `true` for errors the caller can fix by changing the request or the
    /// server configuration; `false` for collaborator and internal failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            SummarizerError::LlmCallFailed { .. }
                | SummarizerError::PdfExtractionFailed { .. }
                | SummarizerError::InvalidConfig(_)
                | SummarizerError::Internal(_)
        )
    }
}

/// Failure to turn raw model text into a summary.
///
/// Neither variant is retried. The detail strings are for server-side logs;
/// clients only see the fixed `Display` message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// No JSON object could be decoded from the text.
    #[error("Failed to parse AI response. Please try again.")]
    JsonParseFailed { detail: String },

    /// JSON decoded, but it is not an object with a non-empty `main_summary`.
    #[error("AI summarization failed: Invalid response structure from the model")]
    InvalidShape { reason: String },
}
