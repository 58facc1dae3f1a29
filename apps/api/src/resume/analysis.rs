//! Resume analysis: summary, skill gaps, roadmap and job-search keywords via the LLM client.

use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::{AskOptions, LlmClient};
use crate::resume::prompts::{render, GAPS_PROMPT, KEYWORDS_PROMPT, ROADMAP_PROMPT, SUMMARY_PROMPT};

const SUMMARY_MAX_TOKENS: u32 = 1000;
const KEYWORDS_MAX_TOKENS: u32 = 100;

#[derive(Debug, Serialize)]
pub struct ResumeAnalysis {
    pub summary: String,
    pub gaps: String,
    pub roadmap: String,
}

/// Runs the three analysis prompts one after another.
pub async fn analyze_resume(resume_text: &str, llm: &LlmClient) -> Result<ResumeAnalysis, AppError> {
    let opts = AskOptions::default().with_max_tokens(SUMMARY_MAX_TOKENS);

    let summary = llm
        .ask_with(&render(SUMMARY_PROMPT, resume_text), &opts)
        .await
        .map_err(|e| AppError::Llm(format!("Resume summary failed: {e}")))?;
    let gaps = llm
        .ask_with(&render(GAPS_PROMPT, resume_text), &opts)
        .await
        .map_err(|e| AppError::Llm(format!("Skill gap analysis failed: {e}")))?;
    let roadmap = llm
        .ask_with(&render(ROADMAP_PROMPT, resume_text), &opts)
        .await
        .map_err(|e| AppError::Llm(format!("Roadmap generation failed: {e}")))?;

    Ok(ResumeAnalysis {
        summary,
        gaps,
        roadmap,
    })
}

/// Asks for job-search keywords and parses the comma-separated reply.
pub async fn suggest_keywords(resume_text: &str, llm: &LlmClient) -> Result<Vec<String>, AppError> {
    let opts = AskOptions::default().with_max_tokens(KEYWORDS_MAX_TOKENS);
    let reply = llm
        .ask_with(&render(KEYWORDS_PROMPT, resume_text), &opts)
        .await
        .map_err(|e| AppError::Llm(format!("Keyword suggestion failed: {e}")))?;
    Ok(parse_keyword_list(&reply))
}

/// Splits a comma/newline separated list, trimming bullets and quotes.
/// Duplicates are dropped case-insensitively, first occurrence wins.
fn parse_keyword_list(reply: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    reply
        .split([',', '\n'])
        .map(|k| {
            k.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .trim_matches(['"', '\''])
                .trim()
        })
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmError, ModelProvider};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Echoes a fixed reply and records every prompt it receives.
    struct RecordingProvider {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ModelProvider for RecordingProvider {
        async fn list_models(&self) -> Result<Vec<String>, LlmError> {
            Ok(vec!["models/gemini-pro".to_string()])
        }

        async fn generate(&self, _model: &str, prompt: &str, _max: u32) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn recording(reply: &str) -> Arc<RecordingProvider> {
        Arc::new(RecordingProvider {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_parse_keyword_list_trims_and_dedups() {
        let reply = "Rust Developer, Backend Engineer,\n- systems programmer, rust developer, , \"SRE\"";
        assert_eq!(
            parse_keyword_list(reply),
            vec!["Rust Developer", "Backend Engineer", "systems programmer", "SRE"]
        );
    }

    #[test]
    fn test_parse_keyword_list_empty_reply() {
        assert!(parse_keyword_list("  \n ").is_empty());
    }

    #[tokio::test]
    async fn test_analyze_resume_runs_three_prompts_in_order() {
        let provider = recording("ok");
        let llm = LlmClient::new(provider.clone());

        let analysis = analyze_resume("Jane Doe", &llm).await.unwrap();
        assert_eq!(analysis.summary, "ok");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].starts_with("Summarize this resume"));
        assert!(prompts[1].contains("missing skills"));
        assert!(prompts[2].contains("roadmap"));
        assert!(prompts.iter().all(|p| p.ends_with("Jane Doe")));
    }

    #[tokio::test]
    async fn test_suggest_keywords_parses_reply() {
        let llm = LlmClient::new(recording("Data Analyst, BI Developer"));
        let keywords = suggest_keywords("resume", &llm).await.unwrap();
        assert_eq!(keywords, vec!["Data Analyst", "BI Developer"]);
    }
}
