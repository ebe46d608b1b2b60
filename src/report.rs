// src/report.rs
//! Renders matched jobs into transport-sized text chunks, each job entry
//! carrying a short synthesized outreach message.

use serde::Deserialize;

use crate::job::Job;

const DEFAULT_MAX_KEYWORDS: usize = 4;
const DEFAULT_MAX_MESSAGE_CHARS: usize = 300;
const DEFAULT_MAX_CHUNK_CHARS: usize = 3500;

/// Formatter settings from the `report` section of config.yaml. The
/// technology keyword list lives here rather than as module state so tests
/// and alternate profiles can inject their own.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub keywords: Vec<String>,
    pub max_keywords: usize,
    pub max_message_chars: usize,
    pub max_chunk_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            max_keywords: DEFAULT_MAX_KEYWORDS,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

fn default_keywords() -> Vec<String> {
    [
        "Python",
        "Django",
        "React",
        "JavaScript",
        "SQL",
        "MySQL",
        "Kotlin",
        "Android",
        "Git",
        "REST",
        "REST API",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Render a count header plus one entry per job, then split the result
    /// into chunks no longer than the configured maximum, breaking only at
    /// line boundaries.
    pub fn render(&self, jobs: &[Job]) -> Vec<String> {
        if jobs.is_empty() {
            return Vec::new();
        }

        let header = format!("Encontré {} vacantes (links verificados):", jobs.len());
        let entries: Vec<String> = jobs.iter().map(|job| self.format_entry(job)).collect();
        let report = format!("{}\n\n{}", header, entries.join("\n\n"));
        chunk_lines(&report, self.config.max_chunk_chars)
    }

    fn format_entry(&self, job: &Job) -> String {
        format!(
            "Título: {}\nEmpresa: {}\nUbicación: {}\nLink: {}\nMensaje: {}",
            job.title,
            job.company,
            job.location,
            job.url,
            self.outreach_message(job)
        )
    }

    /// Short personalized pitch, built from the technologies the posting
    /// itself mentions and hard-capped so it stays pasteable anywhere.
    fn outreach_message(&self, job: &Job) -> String {
        let found = self.extract_keywords(&job.description);
        let stack = if found.is_empty() {
            "tu stack".to_string()
        } else {
            found.join(", ")
        };

        let message = format!(
            "Hola, vi la vacante de {} en {}. Tengo experiencia con {} y proyectos remotos. \
             ¿Te parece si conectamos para platicar y ver si encaja?",
            job.title, job.company, stack
        );

        truncate_chars(&message, self.config.max_message_chars)
    }

    fn extract_keywords(&self, description: &str) -> Vec<String> {
        let lowered = description.to_lowercase();
        self.config
            .keywords
            .iter()
            .filter(|keyword| lowered.contains(&keyword.to_lowercase()))
            .take(self.config.max_keywords)
            .cloned()
            .collect()
    }
}

/// Split text into chunks of at most `max_chars` characters, never breaking
/// inside a line. Each chunk is a contiguous run of whole input lines, so
/// joining the chunks back with newlines reproduces the input exactly. A
/// single line longer than the limit becomes its own oversized chunk rather
/// than being split.
pub fn chunk_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_chars = 0usize;

    for line in text.split('\n') {
        let line_chars = line.chars().count();
        let separator = if current.is_empty() { 0 } else { 1 };

        if !current.is_empty() && current_chars + separator + line_chars > max_chars {
            chunks.push(current.join("\n"));
            current.clear();
            current.push(line);
            current_chars = line_chars;
        } else {
            current.push(line);
            current_chars += separator + line_chars;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    chunks
}

// Counts chars rather than bytes; a byte slice could land inside a
// multi-byte character like 'ñ' and panic.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> Reporter {
        Reporter::new(ReportConfig::default())
    }

    fn sample_job(description: &str) -> Job {
        Job::new(
            "Junior Developer",
            "acme",
            "Monterrey",
            "https://example.com/j/1",
            description,
        )
    }

    #[test]
    fn test_extract_keywords_is_case_insensitive_and_capped() {
        let reporter = reporter();
        let found = reporter
            .extract_keywords("experiencia con PYTHON, django, react, sql, mysql y kotlin");
        assert_eq!(found, vec!["Python", "Django", "React", "SQL"]);
    }

    #[test]
    fn test_outreach_message_without_keywords_uses_fallback_stack() {
        let reporter = reporter();
        let message = reporter.outreach_message(&sample_job("puesto de oficina"));
        assert!(message.contains("tu stack"));
    }

    #[test]
    fn test_outreach_message_is_capped_with_ellipsis() {
        let reporter = reporter();
        let mut job = sample_job("Python");
        job.title = "Desarrollador ".repeat(30).trim().to_string();

        let message = reporter.outreach_message(&job);
        assert_eq!(message.chars().count(), 300);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_entry_contains_all_lines() {
        let reporter = reporter();
        let chunks = reporter.render(&[sample_job("con Python y Django")]);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("Encontré 1 vacantes (links verificados):"));
        assert!(chunks[0].contains("Título: Junior Developer"));
        assert!(chunks[0].contains("Empresa: acme"));
        assert!(chunks[0].contains("Ubicación: Monterrey"));
        assert!(chunks[0].contains("Link: https://example.com/j/1"));
        assert!(chunks[0].contains("Mensaje: Hola, vi la vacante"));
    }

    #[test]
    fn test_render_empty_jobs_yields_no_chunks() {
        assert!(reporter().render(&[]).is_empty());
    }

    #[test]
    fn test_chunking_splits_and_reassembles_exactly() {
        let text = (0..40)
            .map(|i| format!("línea número {}", i))
            .collect::<Vec<_>>()
            .join("\n");

        let chunks = chunk_lines(&text, 100);
        assert!(chunks.len() >= 2);
        assert_eq!(chunks.join("\n"), text);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_chunking_never_splits_a_line() {
        let text = "corta\nuna línea bastante más larga que el límite configurado\ncorta";
        let chunks = chunk_lines(text, 20);

        // The oversized line survives whole, as its own chunk.
        assert!(chunks.contains(&"una línea bastante más larga que el límite configurado".to_string()));
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_chunking_preserves_blank_lines() {
        let text = "uno\n\ndos\n\ntres";
        let chunks = chunk_lines(text, 8);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_multi_job_report_exceeding_limit_yields_multiple_chunks() {
        let reporter = Reporter::new(ReportConfig {
            max_chunk_chars: 200,
            ..ReportConfig::default()
        });

        let jobs: Vec<Job> = (0..5)
            .map(|i| {
                Job::new(
                    format!("Junior Developer {}", i),
                    "acme",
                    "Monterrey",
                    format!("https://example.com/j/{}", i),
                    "con Python y Django",
                )
            })
            .collect();

        let chunks = reporter.render(&jobs);
        assert!(chunks.len() >= 2);

        let reassembled = chunks.join("\n");
        assert!(reassembled.starts_with("Encontré 5 vacantes"));
        for i in 0..5 {
            assert!(reassembled.contains(&format!("Título: Junior Developer {}", i)));
        }
    }
}
