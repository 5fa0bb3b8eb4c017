//! Run manifest: one JSON line per finished experiment, appended to `runs.jsonl`.
//!
//! Result documents are overwritten on every run; the manifest keeps the history.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::ScoringMode;

pub const MANIFEST_FILE: &str = "runs.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub experiment: String,
    pub scoring: ScoringMode,
    pub scorer_backend: String,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub api_calls: u64,
    pub output: PathBuf,
}

impl RunManifest {
    pub fn duration_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Appends `manifest` as one line to `<dir>/runs.jsonl`, creating the file if needed.
pub fn append_manifest(dir: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(MANIFEST_FILE))?;
    let line = serde_json::to_string(manifest)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Reads every manifest line, oldest first. A missing file is an empty history.
#[cfg(test)]
pub fn read_manifests(dir: &Path) -> Result<Vec<RunManifest>, AppError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(AppError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn manifest(experiment: &str) -> RunManifest {
        let started_at = Utc::now();
        RunManifest {
            run_id: Uuid::new_v4(),
            experiment: experiment.to_string(),
            scoring: ScoringMode::Reward,
            scorer_backend: "heuristic_reward".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            started_at,
            finished_at: started_at + Duration::seconds(90),
            api_calls: 250,
            output: PathBuf::from("experiments/baseline_zero_shot_reward.json"),
        }
    }

    #[test]
    fn test_append_and_read_back_in_order() {
        let tmp = TempDir::new().unwrap();
        append_manifest(tmp.path(), &manifest("zero_shot")).unwrap();
        append_manifest(tmp.path(), &manifest("few_shot")).unwrap();

        let runs = read_manifests(tmp.path()).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].experiment, "zero_shot");
        assert_eq!(runs[1].experiment, "few_shot");
        assert_eq!(runs[1].duration_secs(), 90);
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_manifests(tmp.path()).unwrap().is_empty());
    }
}
