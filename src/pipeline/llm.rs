//! Model interaction: send the summarization prompt and return raw text.
//!
//! The handlers only see the [`SummaryModel`] trait. Production wraps an
//! `edgequake-llm` provider in [`ProviderModel`]; tests substitute a canned
//! implementation so no request ever leaves the process.
//!
//! ## Failure Policy
//!
//! One attempt, no retry, no timeout beyond what the provider's HTTP client
//! enforces. Any provider error becomes [`SummarizerError::LlmCallFailed`]
//! carrying the provider's message.

use crate::config::{GenerationOptions, ServerConfig};
use crate::error::SummarizerError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, GeminiProvider, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Provider prefix used in model names.
pub const GEMINI_PROVIDER: &str = "gemini";

/// Text-in, text-out generative model.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Short identifier used in logs, e.g. `gemini/gemini-1.5-flash`.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SummarizerError>;
}

/// [`SummaryModel`] backed by an `edgequake-llm` chat provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    name: String,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>, name: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
        }
    }
}

#[async_trait]
impl SummaryModel for ProviderModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SummarizerError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];
        let opts = build_options(options);

        match self.provider.chat(&messages, Some(&opts)).await {
            Ok(response) => {
                debug!(
                    "{}: {} input tokens, {} output tokens, {:?}",
                    self.name,
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
            Err(e) => {
                error!("{}: call failed after {:?}: {}", self.name, start.elapsed(), e);
                Err(SummarizerError::LlmCallFailed {
                    message: e.to_string(),
                })
            }
        }
    }
}

/// Build the Gemini-backed model, or `None` when no API key is configured.
///
/// The key and model come from `config` alone; the process environment is
/// not consulted here.
pub fn create_gemini_model(config: &ServerConfig) -> Option<Arc<dyn SummaryModel>> {
    let Some(key) = config.api_key() else {
        warn!("GEMINI_API_KEY not configured; /summarize will report AI unavailable");
        return None;
    };

    let provider: Arc<dyn LLMProvider> =
        Arc::new(GeminiProvider::new(key).with_model(&config.model));
    info!("Gemini model '{}' initialised", config.model);
    Some(Arc::new(ProviderModel::new(
        provider,
        format!("{}/{}", GEMINI_PROVIDER, config.model),
    )))
}

/// Build `CompletionOptions` from the generation parameters.
fn build_options(options: &GenerationOptions) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(options.temperature),
        top_p: Some(options.top_p),
        max_tokens: Some(options.max_tokens),
        ..Default::default()
    }
}
