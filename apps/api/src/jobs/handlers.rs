use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jobs::{JobRecord, JobSource, DEFAULT_LOCATION, DEFAULT_ROWS};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkedinQuery {
    pub keyword: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_rows")]
    pub rows: u32,
}

#[derive(Debug, Deserialize)]
pub struct NaukriQuery {
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub source: &'static str,
    pub count: usize,
    pub jobs: Vec<JobRecord>,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_rows() -> u32 {
    DEFAULT_ROWS
}

fn require_keyword(keyword: &str) -> Result<&str, AppError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("keyword must not be empty".to_string()));
    }
    Ok(keyword)
}

fn jobs_response(source: JobSource, jobs: Vec<JobRecord>) -> Json<JobsResponse> {
    Json(JobsResponse {
        source: source.as_str(),
        count: jobs.len(),
        jobs,
    })
}

/// GET /api/v1/jobs/linkedin
pub async fn handle_linkedin_jobs(
    State(state): State<AppState>,
    Query(params): Query<LinkedinQuery>,
) -> Result<Json<JobsResponse>, AppError> {
    let keyword = require_keyword(&params.keyword)?;
    if params.rows == 0 {
        return Err(AppError::Validation("rows must be at least 1".to_string()));
    }

    let jobs = state
        .jobs
        .fetch_linkedin_jobs(keyword, params.location.trim(), params.rows)
        .await
        .map_err(|e| AppError::Scrape(format!("LinkedIn job fetch failed: {e}")))?;
    Ok(jobs_response(JobSource::Linkedin, jobs))
}

/// GET /api/v1/jobs/naukri
pub async fn handle_naukri_jobs(
    State(state): State<AppState>,
    Query(params): Query<NaukriQuery>,
) -> Result<Json<JobsResponse>, AppError> {
    let keyword = require_keyword(&params.keyword)?;

    let jobs = state
        .jobs
        .fetch_naukri_jobs(keyword)
        .await
        .map_err(|e| AppError::Scrape(format!("Naukri job fetch failed: {e}")))?;
    Ok(jobs_response(JobSource::Naukri, jobs))
}
