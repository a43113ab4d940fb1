//! Summarization entry points.
//!
//! [`SummaryRequest::from_json_body`] validates the client body in a fixed
//! order before anything else runs, so a rejected request never reaches the
//! model. [`summarize`] then drives prompt → model → normalizer and derives
//! the response metrics.

use crate::config::{GenerationOptions, LengthTier, MIN_TEXT_CHARS};
use crate::error::{NormalizeError, SummarizerError};
use crate::output::{SummarizeResponse, SummaryResult};
use crate::pipeline::llm::SummaryModel;
use crate::pipeline::normalize::normalize;
use crate::prompts::build_prompt;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info};

/// A validated `/summarize` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Trimmed input text, at least [`MIN_TEXT_CHARS`] characters.
    pub text: String,
    /// Tier used for the prompt; unknown labels become `medium`.
    pub length: LengthTier,
    /// The `length` value as sent (or `"medium"` when absent).
    pub length_setting: String,
}

impl SummaryRequest {
    /// Decode and validate a raw JSON body.
    ///
    /// Checks, in order: body is an object with a string `text` (else
    /// [`SummarizerError::NoTextProvided`]); trimmed text is non-empty (else
    /// [`SummarizerError::EmptyText`]); trimmed text has at least 50
    /// characters (else [`SummarizerError::TextTooShort`]).
    pub fn from_json_body(body: &[u8]) -> Result<Self, SummarizerError> {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let text = match value.get("text") {
            Some(Value::String(s)) => s.as_str(),
            _ => return Err(SummarizerError::NoTextProvided),
        };
        let length_setting = match value.get("length") {
            Some(Value::String(s)) => s.as_str(),
            _ => LengthTier::Medium.as_str(),
        };

        Self::new(text, length_setting)
    }

    /// Validate already-decoded fields.
    pub fn new(text: &str, length_setting: &str) -> Result<Self, SummarizerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SummarizerError::EmptyText);
        }
        if text.chars().count() < MIN_TEXT_CHARS {
            return Err(SummarizerError::TextTooShort {
                min: MIN_TEXT_CHARS,
            });
        }

        Ok(Self {
            text: text.to_string(),
            length: LengthTier::from_label(length_setting),
            length_setting: length_setting.to_string(),
        })
    }
}

/// Run a validated request through the model and build the response body.
///
/// # Errors
/// - [`SummarizerError::AiUnavailable`] when `model` is `None`
/// - [`SummarizerError::LlmCallFailed`] when the provider call fails
/// - [`SummarizerError::Normalize`] when the reply cannot be normalised
pub async fn summarize(
    model: Option<&dyn SummaryModel>,
    request: &SummaryRequest,
    options: &GenerationOptions,
) -> Result<SummarizeResponse, SummarizerError> {
    let result = generate_summary(model, request, options).await?;
    Ok(SummarizeResponse::new(
        &request.text,
        &request.length_setting,
        result,
    ))
}

/// Prompt the model once and normalise its reply.
pub async fn generate_summary(
    model: Option<&dyn SummaryModel>,
    request: &SummaryRequest,
    options: &GenerationOptions,
) -> Result<SummaryResult, SummarizerError> {
    let model = model.ok_or(SummarizerError::AiUnavailable)?;
    info!(
        "Summarizing {} chars with {} (length: {})",
        request.text.chars().count(),
        model.name(),
        request.length
    );

    let prompt = build_prompt(&request.text, request.length);
    debug!("Prompt: {} chars", prompt.chars().count());

    let start = Instant::now();
    let raw = model.generate(&prompt, options).await?;
    let raw = raw.trim();
    info!(
        "Model response received: {} characters in {}ms",
        raw.chars().count(),
        start.elapsed().as_millis()
    );

    normalize(raw, request.length).map_err(|e| {
        match &e {
            NormalizeError::JsonParseFailed { detail } => {
                error!("JSON parsing error: {}", detail);
                error!("Raw response: {}", raw);
            }
            NormalizeError::InvalidShape { reason } => {
                error!("Invalid response structure: {}", reason);
                error!("Raw response: {}", raw);
            }
        }
        SummarizerError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "This paragraph is comfortably longer than fifty characters in total.";

    fn body(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn missing_or_malformed_body_is_no_text() {
        let cases: [&[u8]; 5] = [b"", b"not json", b"[]", b"{}", br#"{"text": 5}"#];
        for raw in cases {
            let err = SummaryRequest::from_json_body(raw).unwrap_err();
            assert!(matches!(err, SummarizerError::NoTextProvided), "{raw:?}");
        }
    }

    #[test]
    fn blank_text_is_empty() {
        let err = SummaryRequest::from_json_body(&body(serde_json::json!({"text": "  \n\t "})))
            .unwrap_err();
        assert!(matches!(err, SummarizerError::EmptyText));
    }

    #[test]
    fn short_text_is_rejected_after_trimming() {
        let padded = format!("   {}   ", "x".repeat(49));
        let err = SummaryRequest::from_json_body(&body(serde_json::json!({"text": padded})))
            .unwrap_err();
        assert!(matches!(err, SummarizerError::TextTooShort { min: 50 }));

        let ok = SummaryRequest::new(&"x".repeat(50), "short").unwrap();
        assert_eq!(ok.text.len(), 50);
    }

    #[test]
    fn minimum_counts_characters_not_bytes() {
        // 30 two-byte characters: 60 bytes but only 30 characters.
        let err = SummaryRequest::new(&"é".repeat(30), "medium").unwrap_err();
        assert!(matches!(err, SummarizerError::TextTooShort { .. }));
    }

    #[test]
    fn length_defaults_and_echoes() {
        let r = SummaryRequest::from_json_body(&body(serde_json::json!({"text": LONG}))).unwrap();
        assert_eq!(r.length, LengthTier::Medium);
        assert_eq!(r.length_setting, "medium");

        let r = SummaryRequest::from_json_body(&body(serde_json::json!({
            "text": LONG,
            "length": "epic"
        })))
        .unwrap();
        assert_eq!(r.length, LengthTier::Medium);
        assert_eq!(r.length_setting, "epic");

        let r = SummaryRequest::from_json_body(&body(serde_json::json!({
            "text": LONG,
            "length": 3
        })))
        .unwrap();
        assert_eq!(r.length_setting, "medium");

        let r = SummaryRequest::from_json_body(&body(serde_json::json!({
            "text": LONG,
            "length": "detailed"
        })))
        .unwrap();
        assert_eq!(r.length, LengthTier::Detailed);
    }

    #[tokio::test]
    async fn missing_model_is_unavailable() {
        let req = SummaryRequest::new(LONG, "short").unwrap();
        let err = summarize(None, &req, &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::AiUnavailable));
    }
}
