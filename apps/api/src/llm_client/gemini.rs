//! Gemini REST binding for the `ModelProvider` seam.
//!
//! Translates Google's error envelope into `LlmError` variants so the retry loop
//! never has to look at raw status codes or messages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LlmError, ModelProvider};

const API_VERSION: &str = "v1beta";
const LIST_PAGE_SIZE: u32 = 1000;
const RETRY_INFO_TYPE: &str = "type.googleapis.com/google.rpc.RetryInfo";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if it has any text.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// Gemini API over plain HTTPS with an API key.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn generate_url(&self, model: &str) -> String {
        let path = if model.contains('/') {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{API_VERSION}/{path}:generateContent", self.base_url)
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/{API_VERSION}/models", self.base_url);
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.api_key)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(error_from_response(None, response).await);
            }

            let page: ListModelsResponse = serde_json::from_str(&response.text().await?)?;
            names.extend(page.models.into_iter().map(|m| m.name));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Gemini listed {} models", names.len());
        Ok(names)
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
            },
        };

        let response = self
            .client
            .post(self.generate_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(Some(model), response).await);
        }

        let parsed: GenerateResponse = serde_json::from_str(&response.text().await?)?;
        parsed.text().ok_or(LlmError::EmptyContent)
    }
}

async fn error_from_response(model: Option<&str>, response: Response) -> LlmError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();
    classify_error(model, status, retry_after, &body)
}

/// Maps an error response to the variant the retry loop acts on.
fn classify_error(
    model: Option<&str>,
    status: u16,
    retry_after: Option<Duration>,
    body: &str,
) -> LlmError {
    let parsed = serde_json::from_str::<GoogleError>(body).ok().map(|e| e.error);
    let message = parsed
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let google_status = parsed.as_ref().and_then(|e| e.status.as_deref());

    if status == 429 || google_status == Some("RESOURCE_EXHAUSTED") {
        let retry_delay = parsed
            .as_ref()
            .and_then(|e| retry_info_delay(&e.details))
            .or(retry_after);
        return LlmError::QuotaExhausted {
            message,
            retry_delay,
        };
    }

    if let Some(model) = model {
        let lower = message.to_lowercase();
        if status == 404
            || google_status == Some("NOT_FOUND")
            || lower.contains("not found")
            || lower.contains("not supported")
        {
            return LlmError::ModelUnavailable {
                model: model.to_string(),
                message,
            };
        }
    }

    LlmError::Api { status, message }
}

fn retry_info_delay(details: &[serde_json::Value]) -> Option<Duration> {
    details
        .iter()
        .find(|d| d.get("@type").and_then(|t| t.as_str()) == Some(RETRY_INFO_TYPE))
        .and_then(|d| d.get("retryDelay"))
        .and_then(|v| v.as_str())
        .and_then(parse_proto_duration)
}

/// Parses protobuf JSON durations such as `"39s"` or `"0.250s"`.
fn parse_proto_duration(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().strip_suffix('s')?.parse().ok()?;
    // Rejects negative, non-finite and out-of-range values instead of panicking.
    Duration::try_from_secs_f64(secs).ok()
}
