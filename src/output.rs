//! Response bodies produced by the summarizer.
//!
//! Every type here is built fresh per request and serialised straight into
//! the HTTP response; nothing is persisted.

use crate::config::LengthTier;
use serde::Serialize;

/// Label identifying the summarization path in responses.
pub const SUMMARY_METHOD: &str = "gemini-ai-pure";

/// `ai_engine` value reported by `/health`.
pub const HEALTH_ENGINE: &str = "gemini-pure";

/// `ai_engine` value reported by `/summarize`.
pub const SUMMARY_ENGINE: &str = "🤖 Pure Gemini AI";

/// Normalised model output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    /// Trimmed summary text.
    pub main_summary: String,
    /// At most four unique, non-empty points of at most 70 characters.
    pub key_points: Vec<String>,
    /// Tier the summary was requested at.
    pub structure: LengthTier,
    /// Always [`SUMMARY_METHOD`].
    pub method: String,
    pub quality_metrics: QualityMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QualityMetrics {
    /// Whitespace-delimited tokens in the summary.
    pub word_count: usize,
    /// Non-empty fragments when the summary is split on `.`.
    pub sentence_count: usize,
    pub key_points_count: usize,
}

/// Body of a successful `POST /summarize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub key_points: Vec<String>,
    pub structure: LengthTier,
    /// Characters in the trimmed input text.
    pub original_length: usize,
    /// Characters in the summary.
    pub summary_length: usize,
    pub sentence_count: usize,
    /// Non-empty fragments when the input is split on `.`.
    pub original_sentences: usize,
    pub quality_metrics: QualityMetrics,
    /// The `length` value exactly as the client sent it.
    pub length_setting: String,
    pub method: String,
    pub ai_engine: String,
}

impl SummarizeResponse {
    /// Combine a normalised result with metrics derived from the input.
    pub fn new(original_text: &str, length_setting: &str, result: SummaryResult) -> Self {
        Self {
            original_length: original_text.chars().count(),
            summary_length: result.main_summary.chars().count(),
            sentence_count: count_sentences(&result.main_summary),
            original_sentences: count_sentences(original_text),
            summary: result.main_summary,
            key_points: result.key_points,
            structure: result.structure,
            quality_metrics: result.quality_metrics,
            length_setting: length_setting.to_string(),
            method: result.method,
            ai_engine: SUMMARY_ENGINE.to_string(),
        }
    }
}

/// Body of a successful `POST /extract-pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractResult {
    /// Concatenated page text, trimmed.
    pub text: String,
    /// Page count of the document, including pages without text.
    pub pages: usize,
    pub character_count: usize,
    pub word_count: usize,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub ai_engine: String,
    pub gemini_available: bool,
    pub message: String,
}

impl HealthStatus {
    pub fn healthy(gemini_available: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            ai_engine: HEALTH_ENGINE.to_string(),
            gemini_available,
            message: "🤖 Pure Gemini AI Summary Maker is ready!".to_string(),
        }
    }
}

/// Number of non-blank fragments when `text` is split on `.`.
pub fn count_sentences(text: &str) -> usize {
    text.split('.').filter(|s| !s.trim().is_empty()).count()
}

/// Number of whitespace-delimited tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
