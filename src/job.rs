// src/job.rs
use serde::{Deserialize, Serialize};

/// A normalized job posting, as emitted by every source adapter.
///
/// Every field is plain trimmed text. A field the provider did not send is
/// the empty string, never an Option, so the filter engine can match on any
/// field without null checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub description: String,
}

impl Job {
    pub fn new(
        title: impl AsRef<str>,
        company: impl AsRef<str>,
        location: impl AsRef<str>,
        url: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            company: company.as_ref().trim().to_string(),
            location: location.as_ref().trim().to_string(),
            url: url.as_ref().trim().to_string(),
            description: description.as_ref().trim().to_string(),
        }
    }
}
