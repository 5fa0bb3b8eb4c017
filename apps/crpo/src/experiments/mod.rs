// Experiment runners: the two baselines and the two CRPO variants.
// Each run writes one JSON document under the experiments directory and
// appends a line to the run manifest.

pub mod baselines;
pub mod crpo_runs;
pub mod manifest;
pub mod templates;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::datasets::{DatasetLoader, Domain, Example};
use crate::errors::AppError;
use crate::evaluation::{Evaluator, ResponseScorer, ScoringMode};
use crate::llm_client::LlmClient;
use manifest::{append_manifest, RunManifest};

/// HumanEval problems loaded for the code benchmark; the first half is skipped.
const HUMANEVAL_LOADED: usize = 50;
const HUMANEVAL_HELD_OUT_FROM: usize = 25;

// ────────────────────────────────────────────────────────────────────────────
// Benchmarks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Benchmark {
    Gsm8k,
    BbhNavigate,
    BbhBoolean,
    Liar,
    Code,
}

impl Benchmark {
    pub const ALL: [Benchmark; 5] = [
        Benchmark::Gsm8k,
        Benchmark::BbhNavigate,
        Benchmark::BbhBoolean,
        Benchmark::Liar,
        Benchmark::Code,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Benchmark::Gsm8k => "gsm8k",
            Benchmark::BbhNavigate => "bbh_navigate",
            Benchmark::BbhBoolean => "bbh_boolean",
            Benchmark::Liar => "liar",
            Benchmark::Code => "code",
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Benchmark::Gsm8k => Domain::Math,
            Benchmark::BbhNavigate | Benchmark::BbhBoolean => Domain::Reasoning,
            Benchmark::Liar => Domain::FactVerification,
            Benchmark::Code => Domain::Code,
        }
    }

    /// Examples evaluated per baseline run. Reward scoring runs on smaller samples.
    pub fn baseline_limit(&self, mode: ScoringMode) -> usize {
        match (self, mode) {
            (Benchmark::Code, _) => 25,
            (Benchmark::Gsm8k, ScoringMode::Correctness) => 200,
            (_, ScoringMode::Correctness) => 100,
            (Benchmark::Gsm8k, ScoringMode::Reward) => 100,
            (_, ScoringMode::Reward) => 50,
        }
    }

    /// Examples evaluated per CRPO run.
    pub fn crpo_limit(&self) -> usize {
        match self {
            Benchmark::Gsm8k => 100,
            Benchmark::Code => 25,
            _ => 50,
        }
    }

    /// Held-out set a CRPO prompt for `domain` is evaluated on.
    pub fn crpo_eval_set(domain: Domain) -> Benchmark {
        match domain {
            Domain::Math => Benchmark::Gsm8k,
            Domain::Reasoning => Benchmark::BbhNavigate,
            Domain::FactVerification => Benchmark::Liar,
            Domain::Code => Benchmark::Code,
        }
    }

    /// Loads the evaluation split of this benchmark.
    pub fn load(&self, loader: &DatasetLoader) -> Result<Vec<Example>, AppError> {
        match self {
            Benchmark::Gsm8k => loader.load_gsm8k("test"),
            Benchmark::BbhNavigate => Ok(loader.load_bbh("navigate")?.1),
            Benchmark::BbhBoolean => Ok(loader.load_bbh("boolean")?.1),
            Benchmark::Liar => loader.load_liar("test"),
            Benchmark::Code => Ok(loader
                .load_humaneval(HUMANEVAL_LOADED)?
                .into_iter()
                .skip(HUMANEVAL_HELD_OUT_FROM)
                .collect()),
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Result documents
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    ZeroShot,
    FewShot,
    SingleDomainCrpo,
    MultiDomainCrpo,
}

impl ExperimentKind {
    fn stem(&self) -> &'static str {
        match self {
            ExperimentKind::ZeroShot => "baseline_zero_shot",
            ExperimentKind::FewShot => "baseline_few_shot",
            ExperimentKind::SingleDomainCrpo => "single_domain_crpo",
            ExperimentKind::MultiDomainCrpo => "multi_domain_crpo",
        }
    }

    /// e.g. `baseline_zero_shot_reward.json`.
    pub fn file_name(&self, mode: ScoringMode) -> String {
        format!("{}{}.json", self.stem(), mode.file_suffix())
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Pretty-prints `value` to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Reads a result document produced by an earlier run.
pub fn read_results<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    if !path.exists() {
        return Err(AppError::MissingResults(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Runner
// ────────────────────────────────────────────────────────────────────────────

/// Shared wiring for every experiment: one LLM client, one dataset loader, one scorer.
pub struct ExperimentRunner {
    llm: LlmClient,
    loader: DatasetLoader,
    scorer: Arc<dyn ResponseScorer>,
    request_delay: Duration,
    experiments_dir: PathBuf,
}

impl ExperimentRunner {
    pub fn new(
        llm: LlmClient,
        loader: DatasetLoader,
        scorer: Arc<dyn ResponseScorer>,
        request_delay: Duration,
        experiments_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            llm,
            loader,
            scorer,
            request_delay,
            experiments_dir: experiments_dir.into(),
        }
    }

    pub fn scoring_mode(&self) -> ScoringMode {
        self.scorer.mode()
    }

    pub fn output_path(&self, kind: ExperimentKind) -> PathBuf {
        self.experiments_dir.join(kind.file_name(self.scoring_mode()))
    }

    fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.llm.clone(), self.scorer.clone(), self.request_delay)
    }

    /// Writes the result document and records the run in the manifest.
    fn finish<T: Serialize>(
        &self,
        kind: ExperimentKind,
        document: &T,
        started_at: DateTime<Utc>,
        api_calls_at_start: u64,
    ) -> Result<PathBuf, AppError> {
        let output = self.output_path(kind);
        write_json(&output, document)?;

        let manifest = RunManifest {
            run_id: Uuid::new_v4(),
            experiment: kind.to_string(),
            scoring: self.scoring_mode(),
            scorer_backend: self.scorer.backend().to_string(),
            model: self.llm.model().to_string(),
            started_at,
            finished_at: Utc::now(),
            api_calls: self.llm.api_calls().saturating_sub(api_calls_at_start),
            output: output.clone(),
        };
        append_manifest(&self.experiments_dir, &manifest)?;

        info!(
            "Saved {} ({} API calls, {}s)",
            output.display(),
            manifest.api_calls,
            manifest.duration_secs()
        );
        Ok(output)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use serde_json::json;

    pub fn write(dir: &Path, rel: &str, value: serde_json::Value) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    /// Small copy of every raw dataset the runners read.
    pub fn seed_data_dir(dir: &Path) {
        let gsm8k: Vec<_> = (0..4)
            .map(|i| json!({"question": format!("What is {i} + 2?"), "answer": format!("#### {}", i + 2)}))
            .collect();
        write(dir, "gsm8k/test.json", json!(gsm8k));

        let bbh: Vec<_> = (0..10)
            .map(|i| json!({"input": format!("Take {i} steps. Back at start?"), "target": "Yes"}))
            .collect();
        write(dir, "bbh/navigate.json", json!(bbh));
        write(dir, "bbh/boolean.json", json!(bbh));

        let liar: Vec<_> = (0..3)
            .map(|i| json!({"statement": format!("Claim number {i}."), "label": 4}))
            .collect();
        write(dir, "liar/test.json", json!(liar));

        let humaneval: Vec<_> = (0..30)
            .map(|i| json!({"prompt": format!("def f{i}(x):"), "canonical_solution": "    return x"}))
            .collect();
        write(dir, "humaneval/samples.json", json!(humaneval));

        let helpsteer: Vec<_> = (0..16)
            .map(|i| json!({"prompt": format!("help prompt {i}"), "response": "r", "helpfulness": (i % 5) as f64}))
            .collect();
        write(dir, "helpsteer2/full.json", json!(helpsteer));
    }
}
