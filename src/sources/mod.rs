// src/sources/mod.rs
//! Job-board source adapters. Each provider family gets one JobSource
//! implementation that normalizes its payloads into Job records.

pub mod apify;
pub mod external;
pub mod greenhouse;
pub mod lever;

pub use apify::{ApifyConfig, ApifySource};
pub use external::{ExternalFeedSource, FeedConfig};
pub use greenhouse::GreenhouseSource;
pub use lever::LeverSource;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::job::Job;

/// A job-listing provider. One implementation per provider family lets the
/// orchestrator treat every source uniformly, and lets tests substitute
/// doubles for the network-backed ones.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Job>>;
}

/// Build the adapter set the configuration asks for. The Apify adapter only
/// joins when APIFY_TOKEN is present in the environment, mirroring how the
/// other adapters only exist when their provider list is non-empty.
pub fn build_sources(config: &AppConfig) -> Result<Vec<Box<dyn JobSource>>> {
    let mut sources: Vec<Box<dyn JobSource>> = Vec::new();

    if !config.greenhouse_boards.is_empty() {
        sources.push(Box::new(GreenhouseSource::new(
            config.greenhouse_boards.clone(),
        )?));
    }

    if !config.lever_companies.is_empty() {
        sources.push(Box::new(LeverSource::new(config.lever_companies.clone())?));
    }

    if !config.external_sources.is_empty() {
        sources.push(Box::new(ExternalFeedSource::new(
            config.external_sources.clone(),
        )?));
    }

    if let Some(apify_config) = &config.apify {
        match std::env::var("APIFY_TOKEN") {
            Ok(token) if !token.is_empty() => {
                sources.push(Box::new(ApifySource::new(apify_config.clone(), token)?));
            }
            _ => info!("APIFY_TOKEN not set, skipping the Apify source"),
        }
    }

    Ok(sources)
}

/// Fetch from every source in sequence. A failing source is logged and
/// contributes zero jobs; the remaining sources still run. One bad board
/// never aborts the whole collection.
pub async fn collect_jobs(sources: &[Box<dyn JobSource>]) -> Vec<Job> {
    let mut jobs = Vec::new();

    for source in sources {
        match source.fetch().await {
            Ok(mut found) => {
                info!("Source {} returned {} jobs", source.name(), found.len());
                jobs.append(&mut found);
            }
            Err(e) => {
                warn!("Source {} failed, skipping: {:#}", source.name(), e);
            }
        }
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        jobs: Vec<Job>,
    }

    #[async_trait]
    impl JobSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self) -> Result<Vec<Job>> {
            Ok(self.jobs.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl JobSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self) -> Result<Vec<Job>> {
            anyhow::bail!("connection reset by peer")
        }
    }

    fn job(url: &str) -> Job {
        Job::new("Dev", "acme", "Monterrey", url, "")
    }

    #[tokio::test]
    async fn test_failing_source_does_not_abort_collection() {
        let sources: Vec<Box<dyn JobSource>> = vec![
            Box::new(FixedSource {
                jobs: vec![job("https://example.com/j/1")],
            }),
            Box::new(BrokenSource),
            Box::new(FixedSource {
                jobs: vec![job("https://example.com/j/2")],
            }),
        ];

        let jobs = collect_jobs(&sources).await;
        assert_eq!(jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_collection_preserves_source_order() {
        let sources: Vec<Box<dyn JobSource>> = vec![
            Box::new(FixedSource {
                jobs: vec![job("https://example.com/j/1"), job("https://example.com/j/2")],
            }),
            Box::new(FixedSource {
                jobs: vec![job("https://example.com/j/3")],
            }),
        ];

        let jobs = collect_jobs(&sources).await;
        let urls: Vec<&str> = jobs.iter().map(|j| j.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/j/1",
                "https://example.com/j/2",
                "https://example.com/j/3"
            ]
        );
    }
}
