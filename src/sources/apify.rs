// src/sources/apify.rs
//! Apify Indeed scraper integration. The actor runs asynchronously on the
//! Apify platform: submit a run, poll its status under a fixed budget, then
//! fetch the result dataset. A run that never reaches SUCCEEDED inside the
//! budget contributes nothing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::JobSource;
use crate::job::Job;

const APIFY_BASE_URL: &str = "https://api.apify.com/v2";
const INDEED_SCRAPER_ACTOR: &str = "apify~indeed-scraper";
const FETCH_TIMEOUT_SECS: u64 = 30;
const POLL_INTERVAL_SECS: u64 = 2;
const MAX_POLLS: u32 = 10;

fn default_country() -> String {
    "mx".to_string()
}

fn default_items_limit() -> u32 {
    30
}

fn default_max_pages() -> u32 {
    1
}

/// The `apify` section of config.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct ApifyConfig {
    #[serde(default)]
    pub queries: Vec<ApifyQuery>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_items_limit")]
    pub items_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApifyQuery {
    pub query: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActorInput {
    search_query: String,
    location_query: String,
    country: String,
    jobs_limit: u32,
    max_pages: u32,
    save_only_unique_items: bool,
}

/// Envelope every Apify API response wraps its payload in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunData {
    id: String,
    status: String,
    #[serde(default)]
    default_dataset_id: Option<String>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    finished_at: Option<DateTime<Utc>>,
}

fn is_terminal(status: &str) -> bool {
    matches!(status, "SUCCEEDED" | "FAILED" | "ABORTED" | "TIMED-OUT")
}

fn first_text(record: &Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        match record.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(text)) if text.is_empty() => continue,
            Some(Value::String(text)) => return text.clone(),
            Some(other) => return other.to_string(),
        }
    }
    String::new()
}

/// One dataset item to one Job. The scraper has shipped several field
/// namings over time, hence the fallback keys.
fn normalize_item(item: &Value) -> Option<Job> {
    let record = item.as_object()?;

    Some(Job::new(
        first_text(record, &["title"]),
        first_text(record, &["companyName", "company"]),
        first_text(record, &["location"]),
        first_text(record, &["url", "shareLink"]),
        first_text(record, &["jobDescription", "description"]),
    ))
}

pub struct ApifySource {
    client: reqwest::Client,
    token: String,
    config: ApifyConfig,
}

impl ApifySource {
    pub fn new(config: ApifyConfig, token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token,
            config,
        })
    }

    async fn start_run(&self, query: &ApifyQuery) -> Result<RunData> {
        let input = ActorInput {
            search_query: query.query.clone(),
            location_query: query.location.clone(),
            country: self.config.country.clone(),
            jobs_limit: self.config.items_limit,
            max_pages: query.max_pages,
            save_only_unique_items: true,
        };

        let url = format!("{}/acts/{}/runs", APIFY_BASE_URL, INDEED_SCRAPER_ACTOR);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&input)
            .send()
            .await
            .context("Failed to submit Apify actor run")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Apify run submission returned status {}: {}", status, body);
        }

        let envelope: ApiResponse<RunData> = response
            .json()
            .await
            .context("Failed to parse Apify run response")?;

        Ok(envelope.data)
    }

    /// Poll run status at a fixed interval under a fixed budget. Returns the
    /// run once it reports a terminal status, or None when the budget runs
    /// out first - exhaustion is "no result", never a stale status.
    async fn poll_run(&self, run_id: &str) -> Result<Option<RunData>> {
        let url = format!("{}/actor-runs/{}", APIFY_BASE_URL, run_id);

        for attempt in 0..MAX_POLLS {
            if attempt > 0 {
                tokio::time::sleep(std::time::Duration::from_secs(POLL_INTERVAL_SECS)).await;
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await
                .context("Failed to poll Apify run status")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Apify run poll returned status {}: {}", status, body);
            }

            let envelope: ApiResponse<RunData> = response
                .json()
                .await
                .context("Failed to parse Apify run status")?;

            if is_terminal(&envelope.data.status) {
                return Ok(Some(envelope.data));
            }

            debug!(
                "Apify run {} still {}, poll {}/{}",
                run_id,
                envelope.data.status,
                attempt + 1,
                MAX_POLLS
            );
        }

        Ok(None)
    }

    async fn fetch_dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}/datasets/{}/items?format=json",
            APIFY_BASE_URL, dataset_id
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to fetch Apify dataset items")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Apify dataset fetch returned status {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse Apify dataset items")
    }

    async fn fetch_query(&self, query: &ApifyQuery) -> Result<Vec<Job>> {
        let run = self.start_run(query).await?;
        info!("Apify run {} started for query '{}'", run.id, query.query);

        let finished = match self.poll_run(&run.id).await? {
            Some(run) => run,
            None => {
                warn!(
                    "Apify run {} did not reach a terminal status within {} polls, skipping",
                    run.id, MAX_POLLS
                );
                return Ok(Vec::new());
            }
        };

        if finished.status != "SUCCEEDED" {
            warn!("Apify run {} ended as {}, skipping", finished.id, finished.status);
            return Ok(Vec::new());
        }

        if let (Some(started), Some(ended)) = (finished.started_at, finished.finished_at) {
            debug!(
                "Apify run {} finished in {}s",
                finished.id,
                (ended - started).num_seconds()
            );
        }

        let dataset_id = match finished.default_dataset_id {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(Vec::new()),
        };

        let items = self.fetch_dataset_items(&dataset_id).await?;
        Ok(items.iter().filter_map(normalize_item).collect())
    }
}

#[async_trait]
impl JobSource for ApifySource {
    fn name(&self) -> &str {
        "apify-indeed"
    }

    async fn fetch(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        for query in &self.config.queries {
            match self.fetch_query(query).await {
                Ok(mut found) => jobs.append(&mut found),
                Err(e) => warn!("Apify query '{}' failed, skipping: {:#}", query.query, e),
            }
        }

        Ok(jobs)
    }
}
