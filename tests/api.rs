//! HTTP-level tests for the summarizer router.
//!
//! The router is driven in-process through `tower::ServiceExt::oneshot`.
//! The model and the PDF extractor are replaced by canned implementations,
//! so these tests need neither network access nor a pdfium binary.
//!
//! Run with:
//!   cargo test --test api

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use edgequake_summarizer::{
    router, AppState, GenerationOptions, PdfTextExtractor, ServerConfig, SummarizerError,
    SummaryModel,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Model that returns a fixed reply and records every prompt it sees.
struct CannedModel {
    reply: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CannedModel {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummaryModel for CannedModel {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .map_err(|message| SummarizerError::LlmCallFailed { message })
    }
}

/// Extractor that returns fixed page texts and counts invocations.
struct CannedPages {
    pages: Result<Vec<String>, String>,
    calls: AtomicUsize,
}

impl CannedPages {
    fn with(pages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            pages: Ok(pages.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn corrupt(detail: &str) -> Arc<Self> {
        Arc::new(Self {
            pages: Err(detail.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PdfTextExtractor for CannedPages {
    fn page_texts(&self, _bytes: &[u8]) -> Result<Vec<String>, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .clone()
            .map_err(|detail| SummarizerError::PdfExtractionFailed { detail })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

const PARAGRAPH: &str = "Renewable energy adoption has accelerated across the globe over the \
last decade. Solar and wind installations now supply a growing share of electricity, \
driven by falling costs and supportive policy. However, grid integration, storage and \
supply-chain constraints remain significant challenges for the coming years.";

const MODEL_REPLY: &str =
    r#"{"main_summary": "A short summary.", "key_points": ["Point one.", "Point two."]}"#;

fn app(model: Option<Arc<CannedModel>>, extractor: Arc<CannedPages>) -> Router {
    let model = model.map(|m| m as Arc<dyn SummaryModel>);
    let state = AppState::new(ServerConfig::default(), model, extractor);
    router(state)
}

fn app_with_limit(
    limit: usize,
    model: Option<Arc<CannedModel>>,
    extractor: Arc<CannedPages>,
) -> Router {
    let config = ServerConfig::builder().max_upload_bytes(limit).build().unwrap();
    let model = model.map(|m| m as Arc<dyn SummaryModel>);
    router(AppState::new(config, model, extractor))
}

fn no_pages() -> Arc<CannedPages> {
    CannedPages::with(&[])
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn summarize_request(body: Value) -> Request<Body> {
    Request::post("/summarize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "summarizer-test-boundary";

/// Build a multipart body with one part per `(name, filename, content)`.
fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/extract-pdf")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ── /health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_model_availability() {
    let (status, body) = send(
        app(Some(CannedModel::replying(MODEL_REPLY)), no_pages()),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ai_engine"], "gemini-pure");
    assert_eq!(body["gemini_available"], true);
    assert!(body["message"].is_string());

    let (status, body) = send(
        app(None, no_pages()),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gemini_available"], false);
}

#[tokio::test]
async fn health_uses_key_from_config_not_environment() {
    std::env::remove_var("GEMINI_API_KEY");
    let config = ServerConfig::builder()
        .gemini_api_key(Some("AIza-config-only".into()))
        .build()
        .unwrap();
    let state = AppState::from_config(config);
    assert!(state.model.is_some());

    let (status, body) = send(
        router(state),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gemini_available"], true);
}

// ── /summarize ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn short_scenario_returns_normalised_summary() {
    let model = CannedModel::replying(MODEL_REPLY);
    let (status, body) = send(
        app(Some(model.clone()), no_pages()),
        summarize_request(json!({"text": PARAGRAPH, "length": "short"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["summary"], "A short summary.");
    assert_eq!(body["key_points"], json!(["Point one", "Point two"]));
    assert_eq!(body["structure"], "short");
    assert_eq!(body["length_setting"], "short");
    assert_eq!(body["method"], "gemini-ai-pure");
    assert_eq!(body["original_length"], PARAGRAPH.chars().count());
    assert_eq!(body["summary_length"], 16);
    assert_eq!(body["sentence_count"], 1);
    assert_eq!(body["original_sentences"], 3);
    assert_eq!(body["quality_metrics"]["word_count"], 3);
    assert_eq!(body["quality_metrics"]["key_points_count"], 2);
    assert!(body["ai_engine"].is_string());

    assert_eq!(model.calls(), 1);
    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].contains("2-3 sentences"));
    assert!(prompts[0].contains(PARAGRAPH));
}

#[tokio::test]
async fn fenced_reply_matches_bare_reply() {
    let bare = send(
        app(Some(CannedModel::replying(MODEL_REPLY)), no_pages()),
        summarize_request(json!({"text": PARAGRAPH})),
    )
    .await;
    let fenced = send(
        app(
            Some(CannedModel::replying(&format!("```json\n{MODEL_REPLY}\n```"))),
            no_pages(),
        ),
        summarize_request(json!({"text": PARAGRAPH})),
    )
    .await;

    assert_eq!(bare.0, StatusCode::OK);
    assert_eq!(bare, fenced);
    assert_eq!(bare.1["structure"], "medium");
}

#[tokio::test]
async fn short_or_missing_text_never_calls_model() {
    let cases = [
        (json!({}), "No text provided"),
        (json!({"content": PARAGRAPH}), "No text provided"),
        (json!({"text": "   "}), "Empty text provided"),
        (
            json!({"text": "Too short to bother."}),
            "Text too short to summarize (minimum 50 characters)",
        ),
        (
            json!({"text": format!("  {}  ", "y".repeat(49))}),
            "Text too short to summarize (minimum 50 characters)",
        ),
    ];

    for (payload, message) in cases {
        let model = CannedModel::replying(MODEL_REPLY);
        let (status, body) = send(
            app(Some(model.clone()), no_pages()),
            summarize_request(payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
        assert_eq!(model.calls(), 0);
    }
}

#[tokio::test]
async fn non_json_body_is_no_text() {
    let model = CannedModel::replying(MODEL_REPLY);
    let req = Request::post("/summarize")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(PARAGRAPH))
        .unwrap();
    let (status, body) = send(app(Some(model.clone()), no_pages()), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn unparseable_reply_is_bad_request() {
    let model = CannedModel::replying("Sorry, I can't help with that.");
    let (status, body) = send(
        app(Some(model.clone()), no_pages()),
        summarize_request(json!({"text": PARAGRAPH})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to parse AI response. Please try again.");
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn reply_without_summary_is_bad_request() {
    let (status, body) = send(
        app(Some(CannedModel::replying(r#"{"key_points": ["a"]}"#)), no_pages()),
        summarize_request(json!({"text": PARAGRAPH})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("AI summarization failed"));
}

#[tokio::test]
async fn unconfigured_model_is_bad_request() {
    let (status, body) = send(
        app(None, no_pages()),
        summarize_request(json!({"text": PARAGRAPH})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not available"));
}

#[tokio::test]
async fn provider_failure_is_server_error_with_message() {
    let model = CannedModel::failing("quota exceeded");
    let (status, body) = send(
        app(Some(model.clone()), no_pages()),
        summarize_request(json!({"text": PARAGRAPH})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "AI summarization failed: quota exceeded");
    assert_eq!(model.calls(), 1, "no retry after a provider failure");
}

#[tokio::test]
async fn oversized_summarize_body_is_json_413() {
    let model = CannedModel::replying(MODEL_REPLY);
    let (status, body) = send(
        app_with_limit(100, Some(model.clone()), no_pages()),
        summarize_request(json!({"text": PARAGRAPH})),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request too large (maximum 100 bytes)");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn key_points_stay_bounded() {
    let reply = json!({
        "main_summary": "Summary text. More summary.",
        "key_points": [
            "Same point.",
            "Same point",
            "z".repeat(120),
            "Another point",
            "Fifth point is dropped",
        ],
    })
    .to_string();
    let (status, body) = send(
        app(Some(CannedModel::replying(&reply)), no_pages()),
        summarize_request(json!({"text": PARAGRAPH, "length": "detailed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let points: Vec<String> = serde_json::from_value(body["key_points"].clone()).unwrap();
    assert_eq!(points.len(), 3);
    assert!(points.len() <= 4);
    assert!(points.iter().all(|p| p.chars().count() <= 70));
    let mut unique = points.clone();
    unique.dedup();
    assert_eq!(unique, points);
    assert_eq!(body["structure"], "detailed");
}

// ── /extract-pdf ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_page_pdf_is_joined() {
    let pages = CannedPages::with(&["Hello", "World"]);
    let (status, body) = send(
        app(None, pages.clone()),
        multipart_request(&[("file", Some("doc.pdf"), "%PDF-1.7 fake")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["text"], "Hello\nWorld");
    assert_eq!(body["pages"], 2);
    assert_eq!(body["word_count"], 2);
    assert_eq!(body["character_count"], 12);
    assert_eq!(pages.calls(), 1);
}

#[tokio::test]
async fn uppercase_extension_is_accepted() {
    let (status, _) = send(
        app(None, CannedPages::with(&["Text"])),
        multipart_request(&[("file", Some("SCAN.PDF"), "%PDF")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn upload_validation_never_reads_the_pdf() {
    let cases: [(&[(&str, Option<&str>, &str)], &str); 4] = [
        (&[("other", Some("doc.pdf"), "%PDF")], "No file provided"),
        (&[("file", None, "just a form value")], "No file provided"),
        (&[("file", Some(""), "")], "No file selected"),
        (&[("file", Some("notes.txt"), "plain text")], "File must be a PDF"),
    ];

    for (parts, message) in cases {
        let pages = CannedPages::with(&["Hello"]);
        let (status, body) = send(app(None, pages.clone()), multipart_request(parts)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(body["error"], message);
        assert_eq!(pages.calls(), 0);
    }
}

#[tokio::test]
async fn oversized_upload_is_json_413() {
    let pages = CannedPages::with(&["Hello"]);
    let big = "x".repeat(4096);
    let (status, body) = send(
        app_with_limit(512, None, pages.clone()),
        multipart_request(&[("file", Some("big.pdf"), big.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request too large (maximum 512 bytes)");
    assert_eq!(pages.calls(), 0);
}

#[tokio::test]
async fn non_multipart_upload_is_no_file() {
    let req = Request::post("/extract-pdf")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app(None, no_pages()), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn pdf_without_text_is_bad_request() {
    let (status, body) = send(
        app(None, CannedPages::with(&["", "", ""])),
        multipart_request(&[("file", Some("scan.pdf"), "%PDF")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "No text found in PDF. This might be a scanned document."
    );
}

#[tokio::test]
async fn parser_failure_is_server_error() {
    let (status, body) = send(
        app(None, CannedPages::corrupt("invalid xref table")),
        multipart_request(&[("file", Some("broken.pdf"), "garbage")]),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "PDF extraction failed: invalid xref table");
}
