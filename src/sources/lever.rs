// src/sources/lever.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::JobSource;
use crate::job::Job;

const POSTINGS_API: &str = "https://api.lever.co/v0/postings";
const FETCH_TIMEOUT_SECS: u64 = 15;

/// Lever public-postings adapter, one configured company slug per board.
pub struct LeverSource {
    client: reqwest::Client,
    companies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LeverPosting {
    text: Option<String>,
    company: Option<String>,
    categories: Option<LeverCategories>,
    #[serde(rename = "hostedUrl")]
    hosted_url: Option<String>,
    #[serde(rename = "applyUrl")]
    apply_url: Option<String>,
    #[serde(rename = "descriptionPlain")]
    description_plain: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LeverCategories {
    location: Option<String>,
}

fn first_non_empty(candidates: Vec<Option<String>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

impl LeverPosting {
    fn into_job(self, company_slug: &str) -> Job {
        let company = self
            .company
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| company_slug.to_string());

        let location = self
            .categories
            .and_then(|c| c.location)
            .unwrap_or_default();

        let url = first_non_empty(vec![self.hosted_url, self.apply_url]);
        let description = first_non_empty(vec![self.description_plain, self.description]);

        Job::new(
            self.text.unwrap_or_default(),
            company,
            location,
            url,
            description,
        )
    }
}

impl LeverSource {
    pub fn new(companies: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, companies })
    }

    async fn fetch_company(&self, company: &str) -> Result<Vec<Job>> {
        let url = format!("{}/{}?mode=json", POSTINGS_API, company);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch Lever postings for {}", company))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Lever postings for {} returned status {}", company, status);
        }

        let postings: Vec<LeverPosting> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Lever payload for {}", company))?;

        Ok(postings
            .into_iter()
            .map(|posting| posting.into_job(company))
            .collect())
    }
}

#[async_trait]
impl JobSource for LeverSource {
    fn name(&self) -> &str {
        "lever"
    }

    async fn fetch(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        for company in &self.companies {
            match self.fetch_company(company).await {
                Ok(mut found) => jobs.append(&mut found),
                Err(e) => warn!("Lever company {} failed, skipping: {:#}", company, e),
            }
        }

        Ok(jobs)
    }
}
