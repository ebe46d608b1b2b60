// src/link_check.rs
use anyhow::{Context, Result};
use tracing::debug;

const LINK_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = "jobscout/1.0";

/// Lightweight existence check for job URLs. Postings vanish between the
/// board listing and the notification, so every kept job gets one GET
/// before it is reported.
pub struct LinkValidator {
    client: reqwest::Client,
}

impl LinkValidator {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(LINK_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// True iff the URL answers with a status in [200, 400) after following
    /// redirects. Timeouts, DNS failures, and refused connections all count
    /// as unreachable; nothing propagates. An empty URL is unreachable
    /// without a network call.
    pub async fn is_reachable(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }

        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                (200..400).contains(&status)
            }
            Err(e) => {
                debug!("Link check failed for {}: {}", url, e);
                false
            }
        }
    }
}
