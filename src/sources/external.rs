// src/sources/external.rs
//! Generic JSON feed adapter for third-party job APIs (RapidAPI connectors
//! and similar). Each configured feed names an endpoint plus optional
//! headers, query params, a response data key, and field-name mappings.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

use super::JobSource;
use crate::job::Job;

const FETCH_TIMEOUT_SECS: u64 = 25;

fn default_title_key() -> String {
    "title".to_string()
}

fn default_company_key() -> String {
    "company".to_string()
}

fn default_location_key() -> String {
    "location".to_string()
}

fn default_url_key() -> String {
    "url".to_string()
}

fn default_description_key() -> String {
    "description".to_string()
}

/// One generic feed descriptor from config.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub endpoint: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub data_key: Option<String>,
    #[serde(default = "default_title_key")]
    pub title_key: String,
    #[serde(default = "default_company_key")]
    pub company_key: String,
    #[serde(default = "default_location_key")]
    pub location_key: String,
    #[serde(default = "default_url_key")]
    pub url_key: String,
    #[serde(default = "default_description_key")]
    pub description_key: String,
}

pub struct ExternalFeedSource {
    client: reqwest::Client,
    feeds: Vec<FeedConfig>,
}

/// Pick the record list out of a feed payload: the payload itself when it is
/// already an array, the configured data key when it names one, and the
/// conventional `results` key as the fallback.
fn select_records(payload: Value, data_key: Option<&str>) -> Vec<Value> {
    match payload {
        Value::Array(records) => records,
        Value::Object(mut map) => {
            if let Some(key) = data_key {
                if let Some(Value::Array(records)) = map.remove(key) {
                    return records;
                }
            }
            if let Some(Value::Array(records)) = map.remove("results") {
                return records;
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn field_text(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn record_to_job(record: &Value, feed: &FeedConfig) -> Option<Job> {
    let record = record.as_object()?;

    Some(Job::new(
        field_text(record, &feed.title_key),
        field_text(record, &feed.company_key),
        field_text(record, &feed.location_key),
        field_text(record, &feed.url_key),
        field_text(record, &feed.description_key),
    ))
}

impl ExternalFeedSource {
    pub fn new(feeds: Vec<FeedConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, feeds })
    }

    async fn fetch_feed(&self, feed: &FeedConfig) -> Result<Vec<Job>> {
        let mut request = self.client.get(&feed.endpoint);

        for (name, value) in &feed.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !feed.params.is_empty() {
            request = request.query(&feed.params);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed {}", feed.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Feed {} returned status {}", feed.endpoint, status);
        }

        let payload: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse feed payload from {}", feed.endpoint))?;

        let records = select_records(payload, feed.data_key.as_deref());
        Ok(records
            .iter()
            .filter_map(|record| record_to_job(record, feed))
            .collect())
    }
}

#[async_trait]
impl JobSource for ExternalFeedSource {
    fn name(&self) -> &str {
        "external"
    }

    async fn fetch(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        for feed in &self.feeds {
            match self.fetch_feed(feed).await {
                Ok(mut found) => jobs.append(&mut found),
                Err(e) => warn!("Feed {} failed, skipping: {:#}", feed.endpoint, e),
            }
        }

        Ok(jobs)
    }
}
