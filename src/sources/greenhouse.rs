// src/sources/greenhouse.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::JobSource;
use crate::job::Job;

const BOARDS_API: &str = "https://boards-api.greenhouse.io/v1/boards";
const FETCH_TIMEOUT_SECS: u64 = 15;

/// Greenhouse hosted-board adapter. Each configured board token is one
/// company's public job board; the token doubles as the company name since
/// the board payload does not carry one.
pub struct GreenhouseSource {
    client: reqwest::Client,
    boards: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<BoardJob>,
}

#[derive(Debug, Deserialize)]
struct BoardJob {
    title: Option<String>,
    location: Option<BoardLocation>,
    absolute_url: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardLocation {
    name: Option<String>,
}

impl BoardJob {
    fn into_job(self, board: &str) -> Job {
        Job::new(
            self.title.unwrap_or_default(),
            board,
            self.location.and_then(|l| l.name).unwrap_or_default(),
            self.absolute_url.unwrap_or_default(),
            self.content.unwrap_or_default(),
        )
    }
}

impl GreenhouseSource {
    pub fn new(boards: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, boards })
    }

    async fn fetch_board(&self, board: &str) -> Result<Vec<Job>> {
        let url = format!("{}/{}/jobs?content=true", BOARDS_API, board);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch Greenhouse board {}", board))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Greenhouse board {} returned status {}", board, status);
        }

        let payload: BoardResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Greenhouse payload for {}", board))?;

        Ok(payload
            .jobs
            .into_iter()
            .map(|job| job.into_job(board))
            .collect())
    }
}

#[async_trait]
impl JobSource for GreenhouseSource {
    fn name(&self) -> &str {
        "greenhouse"
    }

    async fn fetch(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        for board in &self.boards {
            match self.fetch_board(board).await {
                Ok(mut found) => jobs.append(&mut found),
                Err(e) => warn!("Greenhouse board {} failed, skipping: {:#}", board, e),
            }
        }

        Ok(jobs)
    }
}
