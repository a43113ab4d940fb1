//! Prompt construction for Gemini summarization.
//!
//! All prompt text lives here so the normalizer and the handlers never need
//! to know how the model was asked. Unit tests inspect the rendered prompt
//! directly, without a model.

use crate::config::LengthTier;

/// Per-tier wording inserted into the summarization prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthProfile {
    /// Target sentence-count range, e.g. "2-3 sentences".
    pub sentences: &'static str,
    /// What the summary should concentrate on.
    pub focus: &'static str,
    /// Tone of the summary.
    pub style: &'static str,
}

pub const SHORT_PROFILE: LengthProfile = LengthProfile {
    sentences: "2-3 sentences",
    focus: "the absolute most critical insights and main conclusion",
    style: "concise and impactful",
};

pub const MEDIUM_PROFILE: LengthProfile = LengthProfile {
    sentences: "4-6 sentences",
    focus: "key themes, main applications, and important implications",
    style: "balanced and comprehensive",
};

pub const DETAILED_PROFILE: LengthProfile = LengthProfile {
    sentences: "6-8 sentences",
    focus: "all major sections, applications, benefits, concerns, and future outlook",
    style: "thorough and well-structured",
};

impl LengthTier {
    /// The immutable prompt profile for this tier.
    pub fn profile(self) -> &'static LengthProfile {
        match self {
            LengthTier::Short => &SHORT_PROFILE,
            LengthTier::Medium => &MEDIUM_PROFILE,
            LengthTier::Detailed => &DETAILED_PROFILE,
        }
    }
}

/// Render the summarization prompt for `text` at the given tier.
///
/// The prompt demands an exact sentence range, breadth across every major
/// theme, and a JSON reply with `main_summary` and up to four `key_points`
/// under 70 characters each. `text` is embedded verbatim.
pub fn build_prompt(text: &str, length: LengthTier) -> String {
    let p = length.profile();
    format!(
        r#"You are a world-class summarization expert. Analyze this text and create a professional, high-quality summary.

REQUIREMENTS:
- Create exactly {sentences} that capture {focus}
- Style: {style}
- Ensure BALANCED coverage across ALL major sections of the text
- Maintain the original tone and key conclusions
- Include both opportunities AND challenges mentioned
- Write in natural, flowing language (not choppy extracted sentences)

CRITICAL: Focus on BREADTH over depth - touch on all major themes rather than over-emphasizing one area.

TEXT TO ANALYZE:
{text}

Provide your response in this EXACT JSON format (ensure valid JSON):
{{
    "main_summary": "Your expertly crafted {sentences} summary here. Ensure it flows naturally and covers the full breadth of the content.",
    "key_points": [
        "First key insight (concise, under 70 chars)",
        "Second key insight (concise, under 70 chars)",
        "Third key insight (concise, under 70 chars)",
        "Fourth key insight (concise, under 70 chars)"
    ]
}}

Focus on creating a summary that someone could read and understand the full scope and balance of the original text."#,
        sentences = p.sentences,
        focus = p.focus,
        style = p.style,
        text = text,
    )
}
