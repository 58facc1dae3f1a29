//! Minimal Apify platform client: start an actor run, wait for it, read its dataset.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::JobRecord;

/// Seconds the platform may hold a run-status request open before answering.
const WAIT_FOR_FINISH_SECS: u32 = 60;
const DATASET_PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Apify API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Actor run {run_id} finished with status {status}")]
    RunFailed { run_id: String, status: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An actor run as reported by the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRun {
    pub id: String,
    pub status: String,
    pub default_dataset_id: String,
}

impl ActorRun {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_str(),
            "SUCCEEDED" | "FAILED" | "ABORTED" | "TIMED-OUT"
        )
    }

    pub fn succeeded(&self) -> bool {
        self.status == "SUCCEEDED"
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ApifyError {
    error: ApifyErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApifyErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct ApifyClient {
    client: Client,
    token: String,
    base_url: String,
    page_size: usize,
}

impl ApifyClient {
    pub fn new(token: String, base_url: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            // Run-status requests are held open for up to WAIT_FOR_FINISH_SECS.
            client: Client::builder()
                .timeout(Duration::from_secs(u64::from(WAIT_FOR_FINISH_SECS) + 60))
                .build()?,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: DATASET_PAGE_SIZE,
        })
    }

    #[cfg(test)]
    fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Starts `actor_id` with `input` and waits until the run reaches a terminal status.
    pub async fn call_actor(&self, actor_id: &str, input: &Value) -> Result<ActorRun, ScrapeError> {
        let url = format!("{}/v2/acts/{actor_id}/runs", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        let mut run: ActorRun = read_data(response).await?;
        info!("Started actor {actor_id} (run {})", run.id);

        while !run.is_terminal() {
            debug!("Run {} is {}, waiting...", run.id, run.status);
            run = self.wait_for_run(&run.id).await?;
        }

        if !run.succeeded() {
            return Err(ScrapeError::RunFailed {
                run_id: run.id,
                status: run.status,
            });
        }

        info!("Actor {actor_id} run {} succeeded", run.id);
        Ok(run)
    }

    async fn wait_for_run(&self, run_id: &str) -> Result<ActorRun, ScrapeError> {
        let url = format!("{}/v2/actor-runs/{run_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("waitForFinish", WAIT_FOR_FINISH_SECS)])
            .send()
            .await?;
        read_data(response).await
    }

    /// Reads every item of a dataset, in dataset order.
    pub async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<JobRecord>, ScrapeError> {
        let url = format!("{}/v2/datasets/{dataset_id}/items", self.base_url);
        let mut items: Vec<JobRecord> = Vec::new();

        loop {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .query(&[
                    ("format", "json".to_string()),
                    ("offset", items.len().to_string()),
                    ("limit", self.page_size.to_string()),
                ])
                .send()
                .await?;
            let page: Vec<JobRecord> = read_json(response).await?;
            let page_len = page.len();
            items.extend(page);

            if page_len < self.page_size {
                break;
            }
        }

        debug!("Read {} items from dataset {dataset_id}", items.len());
        Ok(items)
    }
}

async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, ScrapeError> {
    read_json::<DataEnvelope<T>>(response).await.map(|e| e.data)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ScrapeError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApifyError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(ScrapeError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
