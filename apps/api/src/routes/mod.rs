pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Resume uploads larger than this are rejected before parsing.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route(
            "/api/v1/resume/extract",
            post(resume::handle_extract).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/resume/analyze", post(resume::handle_analyze))
        .route("/api/v1/resume/keywords", post(resume::handle_keywords))
        .route("/api/v1/llm/ask", post(resume::handle_ask))
        // Jobs API
        .route("/api/v1/jobs/linkedin", get(jobs::handle_linkedin_jobs))
        .route("/api/v1/jobs/naukri", get(jobs::handle_naukri_jobs))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::jobs::apify::ApifyClient;
    use crate::jobs::JobBoards;
    use crate::llm_client::{LlmClient, LlmError, ModelProvider};

    struct CannedProvider;

    #[async_trait]
    impl ModelProvider for CannedProvider {
        async fn list_models(&self) -> Result<Vec<String>, LlmError> {
            Ok(vec!["models/gemini-pro".to_string()])
        }

        async fn generate(&self, _: &str, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
            Ok(format!("{max_tokens}:{prompt}"))
        }
    }

    fn app() -> Router {
        // Job routes in these tests fail validation before any request is sent.
        let apify = ApifyClient::new("token".to_string(), "http://127.0.0.1:9").unwrap();
        build_router(AppState {
            llm: LlmClient::new(Arc::new(CannedProvider)),
            jobs: JobBoards::new(apify),
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_ask_returns_generated_text() {
        let response = app()
            .oneshot(post_json("/api/v1/llm/ask", json!({ "prompt": "hello", "max_tokens": 42 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["text"], "42:hello");
    }

    #[tokio::test]
    async fn test_ask_rejects_blank_prompt() {
        let response = app()
            .oneshot(post_json("/api/v1/llm/ask", json!({ "prompt": "   " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_keywords_route() {
        let response = app()
            .oneshot(post_json("/api/v1/resume/keywords", json!({ "resume_text": "Rust" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let keywords = body_json(response).await["keywords"].clone();
        assert!(keywords.as_array().is_some_and(|k| !k.is_empty()));
    }

    #[tokio::test]
    async fn test_linkedin_rejects_empty_keyword() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/jobs/linkedin?keyword=%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_linkedin_rejects_zero_rows() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/jobs/linkedin?keyword=rust&rows=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf_upload() {
        let body = "--BOUNDARY\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"resume.pdf\"\r\n\
            Content-Type: application/pdf\r\n\
            \r\n\
            not a pdf\r\n\
            --BOUNDARY--\r\n";
        let request = Request::post("/api/v1/resume/extract")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_extract_rejects_oversized_upload() {
        let mut body = String::from(
            "--BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"resume.pdf\"\r\n\
             Content-Type: application/pdf\r\n\
             \r\n",
        );
        body.push_str(&"a".repeat(MAX_UPLOAD_BYTES + 1));
        body.push_str("\r\n--BOUNDARY--\r\n");
        let request = Request::post("/api/v1/resume/extract")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_extract_requires_file_field() {
        let body = "--BOUNDARY\r\n\
            Content-Disposition: form-data; name=\"note\"\r\n\
            \r\n\
            hello\r\n\
            --BOUNDARY--\r\n";
        let request = Request::post("/api/v1/resume/extract")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
