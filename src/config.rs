// src/config.rs
//! Whole-document configuration loading. One config.yaml drives the run:
//! provider lists, filter rules, report settings, and the notify method.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::filters::FilterConfig;
use crate::notify::NotifyConfig;
use crate::report::ReportConfig;
use crate::sources::{ApifyConfig, FeedConfig};

fn default_seen_store_path() -> PathBuf {
    PathBuf::from("seen_jobs.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub greenhouse_boards: Vec<String>,
    #[serde(default)]
    pub lever_companies: Vec<String>,
    #[serde(default)]
    pub external_sources: Vec<FeedConfig>,
    #[serde(default)]
    pub apify: Option<ApifyConfig>,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub report: ReportConfig,
    pub notify: NotifyConfig,
    #[serde(default = "default_seen_store_path")]
    pub seen_store_path: PathBuf,
}

impl AppConfig {
    /// Load the configuration document. A missing file is a hard startup
    /// failure - the bot cannot guess which boards to poll or where to
    /// deliver.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found: {}. The bot cannot run without one.",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
