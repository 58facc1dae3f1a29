use anyhow::{anyhow, Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_APIFY_API_BASE: &str = "https://api.apify.com";

/// Application configuration loaded from environment variables.
/// Fails at startup if a required credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    /// `GOOGLE_API_KEY`, derived from `GEMINI_API_KEY` when unset. The process
    /// environment is never written back.
    pub google_api_key: String,
    pub apify_token: String,
    pub gemini_api_base: String,
    pub apify_api_base: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = get("GEMINI_API_KEY").context(
            "GEMINI_API_KEY not set. Add GEMINI_API_KEY=<your_key> to .env or the environment",
        )?;
        let google_api_key = get("GOOGLE_API_KEY").unwrap_or_else(|| gemini_api_key.clone());

        let apify_token = get("APIFY_API_TOKEN")
            .or_else(|| get("APIFY_API_KEY"))
            .ok_or_else(|| {
                anyhow!(
                    "Apify API token not set. Add APIFY_API_TOKEN=<your_token> \
                     (or APIFY_API_KEY=<your_token>) to .env or the environment"
                )
            })?;

        Ok(Config {
            gemini_api_key,
            google_api_key,
            apify_token,
            gemini_api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            apify_api_base: get("APIFY_API_BASE")
                .unwrap_or_else(|| DEFAULT_APIFY_API_BASE.to_string()),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
