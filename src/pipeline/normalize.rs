//! Response normalisation: turn raw model text into a [`SummaryResult`].
//!
//! Models asked for JSON do not always return bare JSON. The usual quirks are
//! a ```` ```json ```` fence around the object or a sentence of prose before
//! it. Decoding is therefore tolerant-then-strict:
//!
//! 1. decode the whole (trimmed) text;
//! 2. otherwise locate the first `{ … }` span using a fixed list of opening
//!    and closing markers and decode that;
//! 3. otherwise fail with [`NormalizeError::JsonParseFailed`].
//!
//! The span search stops at the first closing brace after the opening one,
//! so objects containing nested braces are not recovered from wrapped text.
//! Bare JSON is always decoded in full by step 1.

use crate::config::LengthTier;
use crate::error::NormalizeError;
use crate::output::{count_sentences, count_words, QualityMetrics, SummaryResult, SUMMARY_METHOD};
use serde_json::{Map, Value};
use tracing::debug;

/// Maximum number of key points kept.
pub const MAX_KEY_POINTS: usize = 4;

/// Maximum length of a key point, in characters.
pub const MAX_KEY_POINT_CHARS: usize = 70;

/// Length kept before the ellipsis when a point is cut.
const TRUNCATED_CHARS: usize = 67;

/// Derived points longer than this are cut.
const DERIVED_POINT_LIMIT: usize = 68;

const ELLIPSIS: &str = "...";

/// Opening markers, tried in order. The object starts at the marker's final `{`.
const START_MARKERS: [&str; 3] = ["{", "```json\n{", "```\n{"];

/// Closing markers, tried in order. The object ends at the marker's leading `}`.
const END_MARKERS: [&str; 3] = ["}", "}\n```", "}```"];

/// Normalise raw model output into a bounded [`SummaryResult`].
///
/// `requested` is echoed as `structure`; it does not influence parsing.
pub fn normalize(raw: &str, requested: LengthTier) -> Result<SummaryResult, NormalizeError> {
    let value = parse_response_json(raw.trim())?;

    let obj = value.as_object().ok_or_else(|| NormalizeError::InvalidShape {
        reason: format!("expected a JSON object, got {}", json_kind(&value)),
    })?;

    let raw_summary = main_summary(obj)?;
    let summary = raw_summary.trim().to_string();

    let key_points = match obj.get("key_points") {
        Some(Value::Array(items)) => clean_key_points(
            items
                .iter()
                .take(MAX_KEY_POINTS)
                .filter_map(Value::as_str),
        ),
        _ => {
            debug!("Model response has no key_points list; deriving from summary");
            let derived = derive_key_points(raw_summary);
            clean_key_points(derived.iter().map(String::as_str))
        }
    };

    let quality_metrics = QualityMetrics {
        word_count: count_words(&summary),
        sentence_count: count_sentences(&summary),
        key_points_count: key_points.len(),
    };

    Ok(SummaryResult {
        main_summary: summary,
        key_points,
        structure: requested,
        method: SUMMARY_METHOD.to_string(),
        quality_metrics,
    })
}

/// Decode `text` directly, falling back to the first marker-bounded span.
pub fn parse_response_json(text: &str) -> Result<Value, NormalizeError> {
    let direct_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let candidate = extract_json_candidate(text).ok_or_else(|| NormalizeError::JsonParseFailed {
        detail: format!("no JSON object found ({direct_err})"),
    })?;
    debug!(
        "Direct JSON decode failed ({}); trying {}-byte embedded span",
        direct_err,
        candidate.len()
    );

    serde_json::from_str(candidate).map_err(|e| NormalizeError::JsonParseFailed {
        detail: e.to_string(),
    })
}

/// Find the first `{ … }` span bounded by the opening and closing markers.
///
/// Returns the slice from the opening brace through the closing brace, or
/// `None` when no opening marker has a closing marker after it.
pub fn extract_json_candidate(text: &str) -> Option<&str> {
    for start_marker in START_MARKERS {
        let Some(start) = text.find(start_marker) else {
            continue;
        };
        for end_marker in END_MARKERS {
            if let Some(rel) = text[start..].find(end_marker) {
                let open = start + start_marker.len() - 1;
                let close = start + rel;
                if close >= open {
                    return Some(&text[open..=close]);
                }
            }
        }
    }
    None
}

/// Split a summary on `". "` into up to four non-empty key points.
///
/// Fragments longer than 68 characters are cut to 67 plus an ellipsis.
pub fn derive_key_points(summary: &str) -> Vec<String> {
    summary
        .split(". ")
        .filter(|s| !s.trim().is_empty())
        .take(MAX_KEY_POINTS)
        .map(|s| {
            if s.chars().count() > DERIVED_POINT_LIMIT {
                truncate_with_ellipsis(s)
            } else {
                s.to_string()
            }
        })
        .collect()
}

/// Bound and de-duplicate candidate key points, preserving order.
///
/// Each point is trimmed and loses trailing periods; points over 70
/// characters are cut to 67 plus an ellipsis; empty points and exact
/// duplicates are dropped. At most the first four candidates are considered.
pub fn clean_key_points<'a>(points: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(MAX_KEY_POINTS);
    for point in points.into_iter().take(MAX_KEY_POINTS) {
        let stripped = point.trim().trim_end_matches('.').trim_end();
        let bounded = if stripped.chars().count() > MAX_KEY_POINT_CHARS {
            truncate_with_ellipsis(stripped)
        } else {
            stripped.to_string()
        };
        if !bounded.is_empty() && !cleaned.contains(&bounded) {
            cleaned.push(bounded);
        }
    }
    cleaned
}

fn truncate_with_ellipsis(s: &str) -> String {
    let mut out: String = s.chars().take(TRUNCATED_CHARS).collect();
    out.push_str(ELLIPSIS);
    out
}

fn main_summary(obj: &Map<String, Value>) -> Result<&str, NormalizeError> {
    match obj.get("main_summary") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) => Err(NormalizeError::InvalidShape {
            reason: "main_summary is empty".into(),
        }),
        Some(other) => Err(NormalizeError::InvalidShape {
            reason: format!("main_summary is {}, expected a string", json_kind(other)),
        }),
        None => Err(NormalizeError::InvalidShape {
            reason: "main_summary is missing".into(),
        }),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
