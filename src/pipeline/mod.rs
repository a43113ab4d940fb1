//! Pipeline stages behind the HTTP handlers.
//!
//! Each submodule implements exactly one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! /summarize:    prompt ──▶ llm ──▶ normalize
//!                (text)     (Gemini) (JSON → SummaryResult)
//!
//! /extract-pdf:  extract
//!                (pdfium, per-page text → ExtractResult)
//! ```
//!
//! 1. [`llm`]: the only stage with network I/O; single attempt
//! 2. [`normalize`]: tolerant JSON decoding and bounding of the model reply
//! 3. [`extract`]: pdfium text extraction on the blocking pool

pub mod extract;
pub mod llm;
pub mod normalize;
