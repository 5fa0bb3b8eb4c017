// Evaluation: correctness heuristics, reward scoring, and the dataset evaluator.
// All LLM calls go through llm_client.

pub mod correctness;
pub mod evaluator;
pub mod reward;
pub mod scoring;
pub mod stats;

use std::sync::Arc;

use tracing::info;

pub use evaluator::{EvaluationReport, EvaluationSummary, Evaluator};
pub use scoring::{ResponseScorer, ScoringMode};

use crate::errors::AppError;
use reward::{HeuristicRewardScorer, RemoteRewardScorer};
use scoring::CorrectnessScorer;

/// Picks the scorer backend for `mode`. Reward mode without an endpoint uses the heuristic.
pub fn build_scorer(
    mode: ScoringMode,
    reward_model_url: Option<&str>,
) -> Result<Arc<dyn ResponseScorer>, AppError> {
    let scorer: Arc<dyn ResponseScorer> = match (mode, reward_model_url) {
        (ScoringMode::Correctness, _) => Arc::new(CorrectnessScorer),
        (ScoringMode::Reward, Some(url)) => {
            info!("Reward model endpoint: {url}");
            Arc::new(
                RemoteRewardScorer::new(url)
                    .map_err(|e| AppError::Internal(anyhow::anyhow!("reward client: {e}")))?,
            )
        }
        (ScoringMode::Reward, None) => {
            info!("No REWARD_MODEL_URL set, using heuristic reward scoring");
            Arc::new(HeuristicRewardScorer)
        }
    };
    Ok(scorer)
}
