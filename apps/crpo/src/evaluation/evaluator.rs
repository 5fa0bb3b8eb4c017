//! Evaluator: runs a prompt template over a benchmark and scores every response.
//!
//! Flow per example: fill template → LLM completion → scorer → record outcome.
//! A failed example is logged and recorded with its error; evaluation continues.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::datasets::{Domain, Example};
use crate::evaluation::scoring::{ResponseScorer, ScoringMode};
use crate::evaluation::stats;
use crate::llm_client::prompts::{fill_template, truncate_chars};
use crate::llm_client::{CompletionParams, LlmClient};

const PROGRESS_EVERY: usize = 10;
const DETAIL_PREVIEW_CHARS: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-example record kept in the report (texts truncated for readability).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleOutcome {
    Scored {
        example_id: String,
        prompt: String,
        expected: String,
        response: String,
        score: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        correct: Option<bool>,
    },
    Failed {
        example_id: String,
        error: String,
    },
}

/// Full evaluation report for one template on one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub domain: Domain,
    pub scoring: ScoringMode,
    pub scorer_backend: String,
    /// correct / total, counting failed examples as incorrect. Correctness mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<usize>,
    pub average_score: f64,
    pub std_dev: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Examples that produced a score.
    pub num_examples: usize,
    /// Examples attempted.
    pub total: usize,
    /// Cumulative calls made by this evaluator so far.
    pub api_calls_used: u64,
    pub details: Vec<ExampleOutcome>,
}

/// Condensed view embedded in CRPO result documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub average_score: f64,
    pub std_dev: f64,
    pub api_calls_used: u64,
}

impl From<&EvaluationReport> for EvaluationSummary {
    fn from(report: &EvaluationReport) -> Self {
        Self {
            average_score: report.average_score,
            std_dev: report.std_dev,
            api_calls_used: report.api_calls_used,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluator
// ────────────────────────────────────────────────────────────────────────────

pub struct Evaluator {
    llm: LlmClient,
    scorer: Arc<dyn ResponseScorer>,
    request_delay: Duration,
    api_calls: u64,
}

impl Evaluator {
    pub fn new(llm: LlmClient, scorer: Arc<dyn ResponseScorer>, request_delay: Duration) -> Self {
        Self {
            llm,
            scorer,
            request_delay,
            api_calls: 0,
        }
    }

    /// Evaluates `template` on at most `max_examples` items of `dataset`.
    pub async fn evaluate_dataset(
        &mut self,
        template: &str,
        dataset: &[Example],
        domain: Domain,
        max_examples: Option<usize>,
    ) -> EvaluationReport {
        let limit = max_examples.unwrap_or(dataset.len()).min(dataset.len());
        let dataset = &dataset[..limit];
        let total = dataset.len();
        let mode = self.scorer.mode();

        info!("Evaluating {domain} on {total} examples ({mode} scoring)");

        let mut scores = Vec::with_capacity(total);
        let mut correct = 0usize;
        let mut details = Vec::with_capacity(total);

        for (i, example) in dataset.iter().enumerate() {
            if i % PROGRESS_EVERY == 0 {
                info!("  Progress: {i}/{total}");
            }

            let full_prompt = fill_template(template, &example.prompt);

            match self.llm.complete(&full_prompt, CompletionParams::EVALUATION).await {
                Ok(response) => {
                    self.api_calls += 1;
                    let score = self
                        .scorer
                        .score(&full_prompt, &response, &example.answer, domain)
                        .await;
                    scores.push(score);

                    let is_correct = (mode == ScoringMode::Correctness).then_some(score >= 1.0);
                    if is_correct == Some(true) {
                        correct += 1;
                    }

                    details.push(ExampleOutcome::Scored {
                        example_id: example.id.clone(),
                        prompt: truncate_chars(&example.prompt, DETAIL_PREVIEW_CHARS).to_string(),
                        expected: truncate_chars(&example.answer, DETAIL_PREVIEW_CHARS).to_string(),
                        response: truncate_chars(&response, DETAIL_PREVIEW_CHARS).to_string(),
                        score,
                        correct: is_correct,
                    });
                }
                Err(e) => {
                    warn!("Error on example {i} ({}): {e}", example.id);
                    details.push(ExampleOutcome::Failed {
                        example_id: example.id.clone(),
                        error: e.to_string(),
                    });
                }
            }

            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        let (accuracy, correct) = match mode {
            ScoringMode::Correctness => {
                let accuracy = if total > 0 {
                    correct as f64 / total as f64
                } else {
                    0.0
                };
                (Some(accuracy), Some(correct))
            }
            ScoringMode::Reward => (None, None),
        };

        EvaluationReport {
            domain,
            scoring: mode,
            scorer_backend: self.scorer.backend().to_string(),
            accuracy,
            correct,
            average_score: stats::mean(&scores),
            std_dev: stats::population_std(&scores),
            min_score: stats::min(&scores),
            max_score: stats::max(&scores),
            num_examples: scores.len(),
            total,
            api_calls_used: self.api_calls,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::reward::HeuristicRewardScorer;
    use crate::evaluation::scoring::CorrectnessScorer;
    use crate::llm_client::test_support::{completion_body, mock_client};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn math_examples() -> Vec<Example> {
        vec![
            Example {
                id: "gsm8k_0".to_string(),
                prompt: "What is 6 times 7?".to_string(),
                answer: "6 * 7 = 42".to_string(),
                domain: Domain::Math,
            },
            Example {
                id: "gsm8k_1".to_string(),
                prompt: "What is 10 plus 5?".to_string(),
                answer: "#### 15".to_string(),
                domain: Domain::Math,
            },
            Example {
                id: "gsm8k_2".to_string(),
                prompt: "What is 3 minus 1?".to_string(),
                answer: "#### 2".to_string(),
                domain: Domain::Math,
            },
        ]
    }

    #[tokio::test]
    async fn test_correctness_evaluation_counts_failures_in_total() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("6 times 7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("The answer is 42.")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("10 plus 5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("It is 16.")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("3 minus 1"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let mut evaluator = Evaluator::new(
            mock_client(&server),
            Arc::new(CorrectnessScorer),
            Duration::ZERO,
        );
        let report = evaluator
            .evaluate_dataset("Q: {question}\nA:", &math_examples(), Domain::Math, None)
            .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.num_examples, 2);
        assert_eq!(report.correct, Some(1));
        assert!((report.accuracy.unwrap() - 1.0 / 3.0).abs() < 1e-9);
        assert!((report.average_score - 0.5).abs() < 1e-9);
        assert_eq!(report.api_calls_used, 2);
        assert!(matches!(report.details[2], ExampleOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_max_examples_truncates_dataset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("42")))
            .expect(2)
            .mount(&server)
            .await;

        let mut evaluator = Evaluator::new(
            mock_client(&server),
            Arc::new(CorrectnessScorer),
            Duration::ZERO,
        );
        let report = evaluator
            .evaluate_dataset("{question}", &math_examples(), Domain::Math, Some(2))
            .await;
        assert_eq!(report.total, 2);
        assert_eq!(report.details.len(), 2);
    }

    #[tokio::test]
    async fn test_reward_evaluation_has_no_accuracy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("First, multiply. Therefore 42.")),
            )
            .mount(&server)
            .await;

        let mut evaluator = Evaluator::new(
            mock_client(&server),
            Arc::new(HeuristicRewardScorer),
            Duration::ZERO,
        );
        let report = evaluator
            .evaluate_dataset("{question}", &math_examples(), Domain::Math, Some(1))
            .await;

        assert!(report.accuracy.is_none());
        assert_eq!(report.scoring, ScoringMode::Reward);
        assert!(report.average_score > 0.0);
        assert_eq!(report.std_dev, 0.0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("accuracy").is_none());
        assert!(json["details"][0].get("correct").is_none());
    }

    #[tokio::test]
    async fn test_api_calls_accumulate_across_datasets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("0")))
            .mount(&server)
            .await;

        let mut evaluator = Evaluator::new(
            mock_client(&server),
            Arc::new(CorrectnessScorer),
            Duration::ZERO,
        );
        evaluator
            .evaluate_dataset("{question}", &math_examples(), Domain::Math, Some(1))
            .await;
        let second = evaluator
            .evaluate_dataset("{question}", &math_examples(), Domain::Math, Some(2))
            .await;
        assert_eq!(second.api_calls_used, 3);
    }

    #[tokio::test]
    async fn test_empty_dataset_yields_zeros() {
        let server = MockServer::start().await;
        let mut evaluator = Evaluator::new(
            mock_client(&server),
            Arc::new(CorrectnessScorer),
            Duration::ZERO,
        );
        let report = evaluator
            .evaluate_dataset("{question}", &[], Domain::Code, Some(25))
            .await;
        assert_eq!(report.total, 0);
        assert_eq!(report.accuracy, Some(0.0));
        assert_eq!(report.average_score, 0.0);
    }

    #[test]
    fn test_summary_from_report() {
        let report = EvaluationReport {
            domain: Domain::Code,
            scoring: ScoringMode::Reward,
            scorer_backend: "heuristic_reward".to_string(),
            accuracy: None,
            correct: None,
            average_score: 0.61,
            std_dev: 0.1,
            min_score: 0.4,
            max_score: 0.8,
            num_examples: 25,
            total: 25,
            api_calls_used: 40,
            details: vec![],
        };
        let summary = EvaluationSummary::from(&report);
        assert_eq!(summary.average_score, 0.61);
        assert_eq!(summary.api_calls_used, 40);
    }
}
