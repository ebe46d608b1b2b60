// src/pipeline.rs
//! End-to-end run orchestration: collect -> filter -> link check -> dedup
//! -> limit -> report -> deliver -> mark seen. Ordering is the contract:
//! the cheap text filter runs before any per-job network call, and nothing
//! is marked seen until the whole report has been delivered.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::filters::{self, FilterConfig};
use crate::job::Job;
use crate::link_check::LinkValidator;
use crate::notify::Notifier;
use crate::report::Reporter;
use crate::sources;
use crate::storage::SeenStore;

/// What one run did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Jobs emitted by all adapters together.
    pub collected: usize,
    /// Jobs that survived filtering, the link check, and dedup.
    pub matched: usize,
    /// Jobs actually notified after the send limit.
    pub delivered: usize,
    /// Report chunks sent to the transport.
    pub chunks: usize,
}

pub async fn run(config: &AppConfig) -> Result<RunSummary> {
    // Resolve the transport first: a misconfigured destination must fail
    // before any fetch or state mutation.
    let notifier = Notifier::from_config(&config.notify)?;

    let adapters = sources::build_sources(config)?;
    info!("Collecting jobs from {} sources", adapters.len());
    let jobs = sources::collect_jobs(&adapters).await;
    let collected = jobs.len();
    info!("Collected {} jobs", collected);

    let mut store = SeenStore::load(&config.seen_store_path);
    let validator = LinkValidator::new()?;

    let selected = select_jobs(jobs, &config.filters, &validator, &store).await;
    let matched = selected.len();

    let selected = apply_send_limit(selected, config.filters.send_limit);
    let delivered = selected.len();

    if selected.is_empty() {
        info!("No new jobs to notify");
        return Ok(RunSummary {
            collected,
            matched,
            delivered: 0,
            chunks: 0,
        });
    }

    let reporter = Reporter::new(config.report.clone());
    let chunks = reporter.render(&selected);
    for chunk in &chunks {
        notifier.send(chunk).await?;
    }

    // Only after every chunk is delivered does any job count as notified; a
    // failed delivery leaves the store untouched so the batch is retried on
    // the next run.
    for job in &selected {
        store.mark_seen(&job.url)?;
    }

    info!("Notified {} jobs in {} chunks", delivered, chunks.len());
    Ok(RunSummary {
        collected,
        matched,
        delivered,
        chunks: chunks.len(),
    })
}

/// Narrow collected jobs in input order: text filter, then link existence,
/// then novelty against the seen store.
async fn select_jobs(
    jobs: Vec<Job>,
    filter: &FilterConfig,
    validator: &LinkValidator,
    store: &SeenStore,
) -> Vec<Job> {
    let mut selected = Vec::new();

    for job in jobs {
        if !filters::passes(&job, filter) {
            continue;
        }

        if !validator.is_reachable(&job.url).await {
            debug!("Link check failed for '{}' ({})", job.title, job.url);
            continue;
        }

        if store.contains(&job.url) {
            debug!("Already notified {}, skipping", job.url);
            continue;
        }

        selected.push(job);
    }

    selected
}

fn apply_send_limit(mut jobs: Vec<Job>, limit: Option<usize>) -> Vec<Job> {
    if let Some(limit) = limit {
        if jobs.len() > limit {
            info!("Truncating {} matches to the send limit of {}", jobs.len(), limit);
            jobs.truncate(limit);
        }
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Loopback server answering 200 to everything, standing in for live
    // job postings during selection tests.
    async fn serve_ok() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                        )
                        .await;
                });
            }
        });

        format!("http://{}", addr)
    }

    fn matching_filter() -> FilterConfig {
        FilterConfig {
            titles: vec!["developer".to_string()],
            locations: vec!["monterrey".to_string()],
            levels: vec!["junior".to_string()],
            exclusions: Vec::new(),
            max_years: 3,
            send_limit: None,
        }
    }

    fn job(url: &str) -> Job {
        Job::new(
            "Junior Developer",
            "acme",
            "Monterrey",
            url,
            "puesto junior",
        )
    }

    #[tokio::test]
    async fn test_empty_url_job_is_excluded_before_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::load(dir.path().join("seen.json"));
        let validator = LinkValidator::new().unwrap();

        // Passes every text rule but carries no URL; the link stage must
        // drop it without a network call.
        let selected = select_jobs(vec![job("")], &matching_filter(), &validator, &store).await;
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_filtered_job_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::load(dir.path().join("seen.json"));
        let validator = LinkValidator::new().unwrap();

        let mut senior = job("");
        senior.title = "Staff Engineer".to_string();

        let selected = select_jobs(vec![senior], &matching_filter(), &validator, &store).await;
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_reachable_novel_job_is_selected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenStore::load(dir.path().join("seen.json"));
        let validator = LinkValidator::new().unwrap();

        let base = serve_ok().await;
        let url = format!("{}/jobs/1", base);

        let selected = select_jobs(vec![job(&url)], &matching_filter(), &validator, &store).await;
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].url, url);
    }

    #[tokio::test]
    async fn test_second_run_skips_already_notified_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let validator = LinkValidator::new().unwrap();

        let base = serve_ok().await;
        let url = format!("{}/jobs/1", base);

        // First run: the job is novel, gets selected, and is marked seen
        // after delivery.
        let mut store = SeenStore::load(&path);
        let first = select_jobs(vec![job(&url)], &matching_filter(), &validator, &store).await;
        assert_eq!(first.len(), 1);
        for selected in &first {
            store.mark_seen(&selected.url).unwrap();
        }

        // Second run against the unchanged feed, fresh store instance:
        // nothing new to notify.
        let reloaded = SeenStore::load(&path);
        let second = select_jobs(vec![job(&url)], &matching_filter(), &validator, &reloaded).await;
        assert!(second.is_empty());
    }

    #[test]
    fn test_send_limit_truncates_preserving_order() {
        let jobs = vec![
            job("https://example.com/j/1"),
            job("https://example.com/j/2"),
            job("https://example.com/j/3"),
        ];

        let limited = apply_send_limit(jobs, Some(2));
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].url, "https://example.com/j/1");
        assert_eq!(limited[1].url, "https://example.com/j/2");
    }

    #[test]
    fn test_missing_send_limit_keeps_everything() {
        let jobs = vec![job("https://example.com/j/1"), job("https://example.com/j/2")];
        assert_eq!(apply_send_limit(jobs, None).len(), 2);
    }
}
