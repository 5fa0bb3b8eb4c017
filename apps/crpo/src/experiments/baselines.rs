//! Zero-shot and few-shot baselines over all five benchmarks.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::EvaluationReport;
use crate::experiments::templates::{few_shot_template, ZERO_SHOT_TEMPLATE};
use crate::experiments::{Benchmark, ExperimentKind, ExperimentRunner};

/// Baseline document: one report per benchmark key.
pub type BaselineResults = BTreeMap<String, EvaluationReport>;

impl ExperimentRunner {
    pub async fn run_zero_shot(&self) -> Result<BaselineResults, AppError> {
        self.run_baseline(ExperimentKind::ZeroShot).await
    }

    pub async fn run_few_shot(&self) -> Result<BaselineResults, AppError> {
        self.run_baseline(ExperimentKind::FewShot).await
    }

    async fn run_baseline(&self, kind: ExperimentKind) -> Result<BaselineResults, AppError> {
        let started_at = Utc::now();
        let calls_at_start = self.llm.api_calls();
        let mode = self.scoring_mode();
        let mut evaluator = self.evaluator();
        let mut results = BaselineResults::new();

        info!("Running {kind} baseline ({mode} scoring)");

        for benchmark in Benchmark::ALL {
            let examples = benchmark.load(&self.loader)?;
            let domain = benchmark.domain();
            let template = match kind {
                ExperimentKind::FewShot => few_shot_template(domain),
                _ => ZERO_SHOT_TEMPLATE,
            };

            let report = evaluator
                .evaluate_dataset(template, &examples, domain, Some(benchmark.baseline_limit(mode)))
                .await;
            info!(
                "{benchmark}: average score {:.3} over {} examples",
                report.average_score, report.num_examples
            );
            results.insert(benchmark.key().to_string(), report);
        }

        self.finish(kind, &results, started_at, calls_at_start)?;
        Ok(results)
    }
}

/// Stdout summary printed after a baseline run.
pub fn format_baseline_summary(kind: ExperimentKind, results: &BaselineResults) -> String {
    let mut out = format!("{kind} results:\n");
    for (key, report) in results {
        match report.accuracy {
            Some(accuracy) => out.push_str(&format!(
                "  {key:<14} accuracy {:.3} ({}/{})\n",
                accuracy,
                report.correct.unwrap_or(0),
                report.total
            )),
            None => out.push_str(&format!(
                "  {key:<14} score {:.3} ± {:.3} (n={})\n",
                report.average_score, report.std_dev, report.num_examples
            )),
        }
    }
    out
}
