//! LLM client, the single point of entry for all language-model calls in JobMate.
//!
//! No other module may call the model provider directly. Every prompt goes
//! through `LlmClient::ask`, which discovers the provider's models, prefers
//! text-capable ones, and walks them in order:
//! - quota exhaustion: back off (doubling, or the server's delay if larger) and retry
//! - model not found / unsupported: skip to the next candidate
//! - anything else: abort immediately
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod gemini;

pub use gemini::GeminiProvider;

/// Substrings that mark a model as a likely text-generation model.
const PREFERRED_MODEL_KEYWORDS: [&str; 4] = ["gemini", "bison", "chat", "text"];

const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_RETRIES: u32 = 4;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quota exhausted: {message}")]
    QuotaExhausted {
        message: String,
        /// Delay suggested by the provider before the next attempt.
        retry_delay: Option<Duration>,
    },

    #[error("Model '{model}' not found or not supported: {message}")]
    ModelUnavailable { model: String, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Could not list models: {0}")]
    ListModels(#[source] Box<LlmError>),

    #[error("No usable model found. Tried: {tried:?}. Last error: {}", describe_last(.last))]
    Exhausted {
        tried: Vec<String>,
        last: Option<Box<LlmError>>,
    },
}

fn describe_last(last: &Option<Box<LlmError>>) -> String {
    last.as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl LlmError {
    /// Server-suggested wait for quota errors.
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            LlmError::QuotaExhausted { retry_delay, .. } => *retry_delay,
            _ => None,
        }
    }
}

/// A hosted model provider. Implement this to swap backends without touching
/// the retry loop or any caller.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Identifiers of every model the provider exposes, in provider order.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// Generates text for `prompt` with `model`, capped at `max_tokens` output tokens.
    ///
    /// Implementations must report quota errors as `QuotaExhausted` and missing
    /// or unsupported models as `ModelUnavailable`; the retry loop relies on it.
    async fn generate(&self, model: &str, prompt: &str, max_tokens: u32)
        -> Result<String, LlmError>;
}

/// Per-call knobs for `LlmClient::ask_with`.
#[derive(Debug, Clone)]
pub struct AskOptions {
    pub max_tokens: u32,
    /// Attempts per candidate model. Zero skips generation entirely.
    pub retries: u32,
    pub initial_backoff: Duration,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            retries: DEFAULT_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl AskOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// The single LLM client used by all services in JobMate.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn ModelProvider>,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    /// Client backed by the Gemini REST API.
    pub fn gemini(api_key: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self::new(Arc::new(GeminiProvider::new(api_key, base_url)?)))
    }

    /// Sends a prompt with default options (500 tokens, 4 attempts per model, 1s backoff).
    pub async fn ask(&self, prompt: &str) -> Result<String, LlmError> {
        self.ask_with(prompt, &AskOptions::default()).await
    }

    pub async fn ask_with(&self, prompt: &str, options: &AskOptions) -> Result<String, LlmError> {
        let available = self
            .provider
            .list_models()
            .await
            .map_err(|e| LlmError::ListModels(Box::new(e)))?;

        let candidates = select_candidates(available);
        debug!("Candidate models: {:?}", candidates);

        let mut last_error: Option<LlmError> = None;

        for model in &candidates {
            let mut backoff = options.initial_backoff;

            for attempt in 1..=options.retries {
                match self
                    .provider
                    .generate(model, prompt, options.max_tokens)
                    .await
                {
                    Ok(text) => {
                        info!("LLM call succeeded with model {model} on attempt {attempt}");
                        return Ok(text);
                    }
                    Err(err @ LlmError::QuotaExhausted { .. }) => {
                        let delay = err.retry_delay().map_or(backoff, |d| d.max(backoff));
                        warn!(
                            "Model {} quota exhausted (attempt {}/{}), retrying after {}ms...",
                            model,
                            attempt,
                            options.retries,
                            delay.as_millis()
                        );
                        last_error = Some(err);
                        tokio::time::sleep(delay).await;
                        backoff *= 2;
                    }
                    Err(err @ LlmError::ModelUnavailable { .. }) => {
                        warn!("Skipping model {model}: {err}");
                        last_error = Some(err);
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Err(LlmError::Exhausted {
            tried: candidates,
            last: last_error.map(Box::new),
        })
    }
}

/// Keeps models whose name contains a preferred keyword (case-insensitive),
/// preserving provider order. Falls back to the full list when nothing matches.
fn select_candidates(available: Vec<String>) -> Vec<String> {
    let preferred: Vec<String> = available
        .iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            PREFERRED_MODEL_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .cloned()
        .collect();

    if preferred.is_empty() {
        available
    } else {
        preferred
    }
}
