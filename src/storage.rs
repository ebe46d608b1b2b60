// src/storage.rs
//! Durable record of job URLs already notified, used for deduplication
//! across runs.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The set of previously-notified URLs, backed by a JSON file holding a
/// sorted array of strings.
///
/// Loading never fails: a missing, unreadable, or corrupt file degrades to
/// an empty set so a damaged state file costs duplicate notifications, not
/// a crash. Writing is another story - a failed persist propagates, because
/// a dedup set that silently stops recording is worse than no run at all.
pub struct SeenStore {
    path: PathBuf,
    seen: BTreeSet<String>,
}

impl SeenStore {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let seen = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeSet<String>>(&content) {
                Ok(urls) => urls,
                Err(e) => {
                    warn!(
                        "Seen store at {} is not a valid URL array, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                warn!(
                    "Failed to read seen store at {}, starting empty: {}",
                    path.display(),
                    e
                );
                BTreeSet::new()
            }
        };

        debug!("Loaded {} seen URLs from {}", seen.len(), path.display());
        Self { path, seen }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Record a URL and rewrite the whole file immediately. The process is
    /// short-lived and may be interrupted at any point, so durability wins
    /// over batching.
    pub fn mark_seen(&mut self, url: &str) -> Result<()> {
        self.seen.insert(url.to_string());
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        // BTreeSet serializes in sorted order, keeping the file diff-stable.
        let content = serde_json::to_string_pretty(&self.seen)
            .context("Failed to serialize seen URL set")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write seen store: {}", self.path.display()))
    }
}
