//! Reward scoring backends.
//!
//! `RemoteRewardScorer` posts `"{prompt} {response}"` to a sequence-classification
//! endpoint (e.g. a text-embeddings-inference `/predict` route serving a
//! reward-model checkpoint) and normalizes the raw logit into [0, 1].
//! `HeuristicRewardScorer` is the no-model fallback; the remote scorer degrades
//! to it on any failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::datasets::Domain;
use crate::evaluation::scoring::{ResponseScorer, ScoringMode};

/// Typical reward-model logits sit in [-5, 5].
const LOGIT_OFFSET: f64 = 5.0;
const LOGIT_SPAN: f64 = 10.0;

const LENGTH_SATURATION_CHARS: f64 = 500.0;
const REASONING_KEYWORDS: [&str; 6] = ["step", "therefore", "because", "first", "second", "finally"];
const REASONING_SATURATION_HITS: f64 = 3.0;
const LENGTH_WEIGHT: f64 = 0.6;
const REASONING_WEIGHT: f64 = 0.4;

const REWARD_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Length + reasoning-keyword heuristic. Longer, more explicitly reasoned answers score higher.
pub fn heuristic_reward(response: &str) -> f64 {
    let length_score = (response.chars().count() as f64 / LENGTH_SATURATION_CHARS).min(1.0);

    let lower = response.to_lowercase();
    let hits = REASONING_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count();
    let reasoning_score = (hits as f64 / REASONING_SATURATION_HITS).min(1.0);

    LENGTH_WEIGHT * length_score + REASONING_WEIGHT * reasoning_score
}

/// Maps a raw reward-model logit into [0, 1].
pub fn normalize_logit(raw: f64) -> f64 {
    ((raw + LOGIT_OFFSET) / LOGIT_SPAN).clamp(0.0, 1.0)
}

/// Scorer used when no reward model is configured.
pub struct HeuristicRewardScorer;

#[async_trait]
impl ResponseScorer for HeuristicRewardScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Reward
    }

    fn backend(&self) -> &'static str {
        "heuristic_reward"
    }

    async fn score(&self, _prompt: &str, response: &str, _expected: &str, _domain: Domain) -> f64 {
        heuristic_reward(response)
    }
}

#[derive(Debug, Error)]
pub enum RewardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reward endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Reward endpoint returned no score")]
    NoScore,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    truncate: bool,
    raw_scores: bool,
}

#[derive(Debug, Deserialize)]
struct ScoredLabel {
    score: f64,
}

/// Endpoints disagree on nesting; accept all the common shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Single(ScoredLabel),
    Flat(Vec<ScoredLabel>),
    Batched(Vec<Vec<ScoredLabel>>),
}

impl PredictResponse {
    fn first_score(&self) -> Option<f64> {
        match self {
            PredictResponse::Single(s) => Some(s.score),
            PredictResponse::Flat(v) => v.first().map(|s| s.score),
            PredictResponse::Batched(v) => v.first().and_then(|inner| inner.first()).map(|s| s.score),
        }
    }
}

/// Reward-model scorer backed by an HTTP inference endpoint.
pub struct RemoteRewardScorer {
    client: Client,
    endpoint: String,
}

impl RemoteRewardScorer {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RewardError> {
        Ok(Self {
            client: Client::builder().timeout(REWARD_REQUEST_TIMEOUT).build()?,
            endpoint: endpoint.into(),
        })
    }

    /// Raw, un-normalized model output for `text`.
    async fn raw_score(&self, text: &str) -> Result<f64, RewardError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest {
                inputs: text,
                truncate: true,
                raw_scores: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RewardError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictResponse = response.json().await?;
        parsed.first_score().ok_or(RewardError::NoScore)
    }
}

#[async_trait]
impl ResponseScorer for RemoteRewardScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Reward
    }

    fn backend(&self) -> &'static str {
        "reward_model"
    }

    async fn score(&self, prompt: &str, response: &str, _expected: &str, _domain: Domain) -> f64 {
        let text = format!("{prompt} {response}");
        match self.raw_score(&text).await {
            Ok(raw) => normalize_logit(raw),
            Err(e) => {
                warn!("Reward model scoring failed, using heuristic fallback: {e}");
                heuristic_reward(response)
            }
        }
    }
}
