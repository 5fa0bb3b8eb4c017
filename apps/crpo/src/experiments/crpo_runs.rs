//! Single- and multi-domain CRPO runs: optimize on HelpSteer2 references,
//! then evaluate the optimized prompt on each domain's held-out set.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use crate::datasets::Domain;
use crate::errors::AppError;
use crate::evaluation::{stats, EvaluationReport, Evaluator};
use crate::experiments::templates::{crpo_evaluation_template, single_domain_task};
use crate::experiments::{Benchmark, ExperimentKind, ExperimentRunner};
use crate::optimizer::{
    CrossDomainTasks, MultiDomainOptimizer, MultiDomainResult, SingleDomainOptimizer,
    SingleDomainResult,
};

/// Single-domain document, keyed by CRPO domain key.
pub type SingleDomainResults = BTreeMap<String, SingleDomainResult>;

impl ExperimentRunner {
    /// Evaluates `optimized_prompt` on the held-out set for `domain`.
    async fn evaluate_optimized(
        &self,
        evaluator: &mut Evaluator,
        optimized_prompt: &str,
        domain: Domain,
    ) -> Result<EvaluationReport, AppError> {
        let benchmark = Benchmark::crpo_eval_set(domain);
        let examples = benchmark.load(&self.loader)?;
        let template = crpo_evaluation_template(optimized_prompt, domain);

        Ok(evaluator
            .evaluate_dataset(&template, &examples, domain, Some(benchmark.crpo_limit()))
            .await)
    }

    /// One optimizer and one evaluator serve all four domains, so the call
    /// counts in the document are running totals in `Domain::ALL` order.
    pub async fn run_single_domain(&self) -> Result<SingleDomainResults, AppError> {
        let started_at = Utc::now();
        let calls_at_start = self.llm.api_calls();
        let references = self.loader.load_helpsteer2()?;
        info!("Loaded {} reference examples", references.len());

        let mut optimizer = SingleDomainOptimizer::new(self.llm.clone());
        let mut evaluator = self.evaluator();
        let mut results = SingleDomainResults::new();
        for domain in Domain::ALL {
            info!("── {} ──", domain.crpo_key().to_uppercase());
            let mut result = optimizer
                .optimize(single_domain_task(domain), &references, domain)
                .await?;

            let report = self
                .evaluate_optimized(&mut evaluator, &result.optimized_prompt, domain)
                .await?;
            info!("{domain}: average score {:.3}", report.average_score);
            result.evaluation = Some((&report).into());

            results.insert(domain.crpo_key().to_string(), result);
        }

        self.finish(ExperimentKind::SingleDomainCrpo, &results, started_at, calls_at_start)?;
        Ok(results)
    }

    pub async fn run_multi_domain(&self) -> Result<MultiDomainResult, AppError> {
        let started_at = Utc::now();
        let calls_at_start = self.llm.api_calls();
        let references = self.loader.load_helpsteer2()?;
        info!("Loaded {} reference examples", references.len());

        let mut optimizer = MultiDomainOptimizer::new(self.llm.clone());
        let mut result = optimizer
            .optimize_multidomain(&references, &CrossDomainTasks::default())
            .await?;

        let mut evaluator = self.evaluator();
        let mut averages = Vec::with_capacity(Domain::ALL.len());
        for domain in Domain::ALL {
            let report = self
                .evaluate_optimized(&mut evaluator, &result.optimized_prompt, domain)
                .await?;
            info!("{domain}: average score {:.3}", report.average_score);
            averages.push(report.average_score);
            result
                .evaluations
                .insert(domain.crpo_key().to_string(), (&report).into());
        }

        result.average_score = Some(stats::mean(&averages));
        result.robustness = Some(stats::population_std(&averages));

        self.finish(ExperimentKind::MultiDomainCrpo, &result, started_at, calls_at_start)?;
        Ok(result)
    }
}

pub fn format_single_domain_summary(results: &SingleDomainResults) -> String {
    let mut out = String::from("Single-domain CRPO results:\n");
    for (key, result) in results {
        let score = result
            .evaluation
            .map(|e| format!("{:.3}", e.average_score))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!("  {key:<10} {score}  ({} optimizer calls)\n", result.api_calls));
    }
    out
}

pub fn format_multi_domain_summary(result: &MultiDomainResult) -> String {
    let mut out = String::from("Multi-domain CRPO results:\n");
    for (key, summary) in &result.evaluations {
        out.push_str(&format!("  {key:<10} {:.3}\n", summary.average_score));
    }
    if let (Some(avg), Some(robustness)) = (result.average_score, result.robustness) {
        out.push_str(&format!("  average    {avg:.3}\n"));
        out.push_str(&format!("  robustness {robustness:.3} (std dev, lower is better)\n"));
    }
    out
}
