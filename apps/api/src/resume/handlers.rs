use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::{Buf, Bytes};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::AskOptions;
use crate::resume::analysis::{analyze_resume, suggest_keywords, ResumeAnalysis};
use crate::resume::extract::extract_text_from_pdf;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub characters: usize,
}

#[derive(Debug, Deserialize)]
pub struct ResumeTextRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub text: String,
}

fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

/// Body-limit overruns become 413; any other malformed upload is a 400.
fn upload_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: {err}"))
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

/// POST /api/v1/resume/extract
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, "Invalid multipart body"))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| upload_error(e, "Failed to read upload"))?;
            upload = Some(bytes);
            break;
        }
    }

    let pdf = upload
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing PDF upload in field '{UPLOAD_FIELD}'")))?;
    info!("Extracting text from uploaded PDF ({} bytes)", pdf.len());

    // PDF parsing is CPU-bound; keep it off the async workers.
    let text = tokio::task::spawn_blocking(move || extract_text_from_pdf(pdf.reader()))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    Ok(Json(ExtractResponse {
        characters: text.chars().count(),
        text,
    }))
}

/// POST /api/v1/resume/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<ResumeTextRequest>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let resume_text = require_text(&req.resume_text, "resume_text")?;
    let analysis = analyze_resume(resume_text, &state.llm).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/resume/keywords
pub async fn handle_keywords(
    State(state): State<AppState>,
    Json(req): Json<ResumeTextRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    let resume_text = require_text(&req.resume_text, "resume_text")?;
    let keywords = suggest_keywords(resume_text, &state.llm).await?;
    Ok(Json(KeywordsResponse { keywords }))
}

/// POST /api/v1/llm/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let prompt = require_text(&req.prompt, "prompt")?;
    let result = match req.max_tokens {
        None => state.llm.ask(prompt).await,
        Some(0) => {
            return Err(AppError::Validation("max_tokens must be at least 1".to_string()));
        }
        Some(max_tokens) => {
            let opts = AskOptions::default().with_max_tokens(max_tokens);
            state.llm.ask_with(prompt, &opts).await
        }
    };

    let text = result.map_err(|e| AppError::Llm(e.to_string()))?;
    Ok(Json(AskResponse { text }))
}
