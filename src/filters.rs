// src/filters.rs
//! Declarative job filtering - every rule is case-insensitive substring
//! containment, and all rules must pass for a job to survive.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::job::Job;

const DEFAULT_MAX_YEARS: u32 = 3;

/// Matching rules loaded from the `filters` section of config.yaml.
///
/// Empty allowed-lists match nothing: a config without title keywords
/// rejects every job rather than letting everything through.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub titles: Vec<String>,
    pub locations: Vec<String>,
    pub levels: Vec<String>,
    pub exclusions: Vec<String>,
    pub max_years: u32,
    pub send_limit: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            titles: Vec::new(),
            locations: Vec::new(),
            levels: Vec::new(),
            exclusions: Vec::new(),
            max_years: DEFAULT_MAX_YEARS,
            send_limit: None,
        }
    }
}

/// Evaluate a job against the filter rules. Pure function, short-circuits
/// on the first failing rule; the rules are conjunctive so order only
/// affects how much work is done, not the outcome.
pub fn passes(job: &Job, config: &FilterConfig) -> bool {
    let title = job.title.to_lowercase();
    let location = job.location.to_lowercase();
    let combined = format!("{}\n{}", title, job.description.to_lowercase());

    if !contains_any(&location, &config.locations) {
        return false;
    }

    if !contains_any(&title, &config.titles) {
        return false;
    }

    // Level keywords are matched against title + description together; this
    // doubles as the seniority gate when the list holds junior/mid terms.
    if !contains_any(&combined, &config.levels) {
        return false;
    }

    if contains_any(&combined, &config.exclusions) {
        return false;
    }

    if exceeds_years(&job.description, config.max_years) {
        return false;
    }

    true
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| text.contains(&keyword.to_lowercase()))
}

static YEARS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn years_pattern() -> &'static Regex {
    YEARS_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(?:\+|mas|más|more)?\s*(?:años|anos|years?)\b")
            .expect("invalid years pattern")
    })
}

/// Heuristic years-of-experience scan: a number, an optional `+`/`más`/`more`
/// qualifier, then a years-unit word in Spanish or English. Any stated figure
/// at or above the threshold rejects the job.
pub fn exceeds_years(description: &str, threshold: u32) -> bool {
    if description.is_empty() {
        return false;
    }

    for captures in years_pattern().captures_iter(description) {
        let years = match captures[1].parse::<u32>() {
            Ok(value) => value,
            Err(_) => continue,
        };
        if years >= threshold {
            return true;
        }
    }

    false
}
