//! Job fetchers: LinkedIn and Naukri listings scraped through Apify actors.
//!
//! Records are passed through exactly as the actor wrote them; nothing here
//! looks inside a job record.

use serde_json::{json, Map, Value};
use tracing::info;

pub mod apify;
pub mod handlers;

use crate::jobs::apify::{ApifyClient, ScrapeError};

/// A job listing as stored in the actor's dataset.
pub type JobRecord = Map<String, Value>;

pub const LINKEDIN_ACTOR_ID: &str = "BHzefUZlZRKWxkTck";
pub const NAUKRI_ACTOR_ID: &str = "alpcnRV9YI9lYVPWk";

pub const DEFAULT_LOCATION: &str = "india";
pub const DEFAULT_ROWS: u32 = 60;
const NAUKRI_MAX_JOBS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSource {
    Linkedin,
    Naukri,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Linkedin => "linkedin",
            JobSource::Naukri => "naukri",
        }
    }

    pub fn actor_id(&self) -> &'static str {
        match self {
            JobSource::Linkedin => LINKEDIN_ACTOR_ID,
            JobSource::Naukri => NAUKRI_ACTOR_ID,
        }
    }
}

/// Run input for the LinkedIn jobs actor. Residential proxies are required by the actor.
pub fn linkedin_run_input(search_query: &str, location: &str, rows: u32) -> Value {
    json!({
        "title": search_query,
        "location": location,
        "rows": rows,
        "proxy": {
            "useApifyProxy": true,
            "apifyProxyGroups": ["RESIDENTIAL"],
        }
    })
}

/// Run input for the Naukri jobs actor. Location and row count are not configurable.
pub fn naukri_run_input(search_query: &str) -> Value {
    json!({
        "keyword": search_query,
        "maxJobs": NAUKRI_MAX_JOBS,
        "freshness": "all",
        "sortBy": "relevance",
        "experience": "all",
    })
}

/// Entry point for fetching job listings from both boards.
#[derive(Clone)]
pub struct JobBoards {
    apify: ApifyClient,
}

impl JobBoards {
    pub fn new(apify: ApifyClient) -> Self {
        Self { apify }
    }

    pub async fn fetch_linkedin_jobs(
        &self,
        search_query: &str,
        location: &str,
        rows: u32,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        let input = linkedin_run_input(search_query, location, rows);
        self.run_source(JobSource::Linkedin, &input).await
    }

    pub async fn fetch_naukri_jobs(&self, search_query: &str) -> Result<Vec<JobRecord>, ScrapeError> {
        let input = naukri_run_input(search_query);
        self.run_source(JobSource::Naukri, &input).await
    }

    async fn run_source(&self, source: JobSource, input: &Value) -> Result<Vec<JobRecord>, ScrapeError> {
        let run = self.apify.call_actor(source.actor_id(), input).await?;
        let jobs = self.apify.dataset_items(&run.default_dataset_id).await?;
        info!("Fetched {} {} jobs", jobs.len(), source.as_str());
        Ok(jobs)
    }
}
