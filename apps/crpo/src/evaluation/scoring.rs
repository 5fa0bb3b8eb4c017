//! Response Scoring: pluggable, trait-based scorer for a single model response.
//!
//! `CorrectnessScorer` applies the rule-based domain heuristics (1.0 / 0.0).
//! Reward backends live in `evaluation::reward`.
//!
//! The evaluator holds an `Arc<dyn ResponseScorer>`, picked at startup from `--scoring`.

use std::fmt;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::datasets::Domain;
use crate::evaluation::correctness::check_correctness;

/// How responses are turned into scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Rule-based correctness heuristics per domain
    #[default]
    Correctness,
    /// Reward-model quality score in [0, 1]
    Reward,
}

impl ScoringMode {
    /// Suffix appended to experiment/result file stems.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ScoringMode::Correctness => "",
            ScoringMode::Reward => "_reward",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Correctness => f.write_str("correctness"),
            ScoringMode::Reward => f.write_str("reward"),
        }
    }
}

/// The response scorer trait. Implement this to swap backends without touching
/// the evaluator or the experiment runners.
#[async_trait]
pub trait ResponseScorer: Send + Sync {
    fn mode(&self) -> ScoringMode;

    /// Backend label recorded in reports, for transparency.
    fn backend(&self) -> &'static str;

    /// Scores `response` to the filled `prompt`. `expected` and `domain` describe the
    /// reference answer. Never fails: backends that can fail degrade to a heuristic.
    async fn score(&self, prompt: &str, response: &str, expected: &str, domain: Domain) -> f64;
}

/// Pure-Rust correctness scorer. Fast, deterministic, no network.
pub struct CorrectnessScorer;

#[async_trait]
impl ResponseScorer for CorrectnessScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Correctness
    }

    fn backend(&self) -> &'static str {
        "heuristic_correctness"
    }

    async fn score(&self, _prompt: &str, response: &str, expected: &str, domain: Domain) -> f64 {
        if check_correctness(response, expected, domain) {
            1.0
        } else {
            0.0
        }
    }
}
