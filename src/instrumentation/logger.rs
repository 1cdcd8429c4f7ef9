use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::material::{GenerationOutcome, MaterialKind, MaterialRequest};

const RUNS_FILE: &str = "runs.jsonl";

/// Metadata for one generate attempt. The generated text itself is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub id: String,
    pub timestamp: String,
    pub kind: String,
    pub topic: String,
    pub audience: String,
    pub model: String,
    pub grounded: bool,
    pub prompt_chars: usize,
    pub text_chars: usize,
    pub num_sources: usize,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl RunLog {
    pub fn new(
        request: &MaterialRequest,
        model: &str,
        prompt: &str,
        result: Result<&GenerationOutcome, String>,
        latency_ms: u64,
    ) -> Self {
        let (text_chars, num_sources, error) = match result {
            Ok(outcome) => (outcome.text.chars().count(), outcome.num_sources(), None),
            Err(message) => (0, 0, Some(message)),
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: kind_name(request.kind).to_string(),
            topic: request.topic.clone(),
            audience: request.audience.clone(),
            model: model.to_string(),
            grounded: request.kind.uses_grounding(),
            prompt_chars: prompt.chars().count(),
            text_chars,
            num_sources,
            latency_ms,
            error,
        }
    }

    pub fn summary(&self) -> String {
        let status = match &self.error {
            Some(_) => "failed",
            None => "ok",
        };
        format!(
            "Kind: {} | Status: {} | Latency: {:.1}s | Prompt chars: {} | Output chars: {} | Sources: {}",
            self.kind,
            status,
            self.latency_ms as f64 / 1000.0,
            self.prompt_chars,
            self.text_chars,
            self.num_sources,
        )
    }
}

fn kind_name(kind: MaterialKind) -> &'static str {
    match kind {
        MaterialKind::LessonPlan => "lesson_plan",
        MaterialKind::StudyGuide => "study_guide",
        MaterialKind::Quiz => "quiz",
        MaterialKind::FindResources => "find_resources",
    }
}

/// Appends one JSON object per run to `<dir>/runs.jsonl`.
pub struct RunLogger {
    path: PathBuf,
}

impl RunLogger {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create run log directory: {}", dir.display()))?;
        Ok(Self {
            path: dir.join(RUNS_FILE),
        })
    }

    pub fn write(&self, run_log: &RunLog) -> Result<()> {
        let mut line = serde_json::to_vec(run_log).context("Failed to serialize run log")?;
        line.push(b'\n');

        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(&line))
            .with_context(|| format!("Failed to append to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Citation;

    fn request() -> MaterialRequest {
        MaterialRequest::new(MaterialKind::FindResources, "Optics", "Undergraduates")
    }

    #[test]
    fn test_run_log_from_success() {
        let outcome = GenerationOutcome {
            text: "Résumé".into(),
            sources: Some(vec![Citation {
                uri: "https://a.edu".into(),
                title: "A".into(),
            }]),
        };
        let prompt = "x".repeat(420);
        let log = RunLog::new(&request(), "gemini-test", &prompt, Ok(&outcome), 1500);

        assert_eq!(log.kind, "find_resources");
        assert!(log.grounded);
        assert_eq!(log.text_chars, 6);
        assert_eq!(log.num_sources, 1);
        assert_eq!(log.error, None);
        assert_eq!(
            log.summary(),
            "Kind: find_resources | Status: ok | Latency: 1.5s | Prompt chars: 420 | Output chars: 6 | Sources: 1"
        );
    }

    #[test]
    fn test_prompt_and_text_counted_in_chars() {
        let outcome = GenerationOutcome {
            text: "Ünïcödé".into(),
            sources: None,
        };
        let log = RunLog::new(&request(), "gemini-test", "Thème: «Énergie»", Ok(&outcome), 1);
        assert_eq!(log.prompt_chars, 16);
        assert_eq!(log.text_chars, 7);
    }

    #[test]
    fn test_run_log_from_failure() {
        let log = RunLog::new(&request(), "gemini-test", "prompt", Err("boom".into()), 10);
        assert_eq!(log.error.as_deref(), Some("boom"));
        assert_eq!(log.text_chars, 0);
        assert!(log.summary().contains("Status: failed"));
    }

    #[test]
    fn test_logger_appends_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RunLogger::new(dir.path()).unwrap();
        let log = RunLog::new(&request(), "gemini-test", "p", Err("x".into()), 1);

        logger.write(&log).unwrap();
        logger.write(&log).unwrap();

        let contents = fs::read_to_string(dir.path().join(RUNS_FILE)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: RunLog = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.id, log.id);
        assert!(!contents.contains("\"text\""));
    }
}
