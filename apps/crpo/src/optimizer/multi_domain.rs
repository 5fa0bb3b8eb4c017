//! Multi-domain CRPO: one template meant to hold up across every domain.
//!
//! The reference pool carries no domain labels, so each pseudo-domain draws its
//! contrastive pair from a different quality tier of the sorted pool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::datasets::ReferenceExample;
use crate::evaluation::EvaluationSummary;
use crate::llm_client::prompts::{normalize_template, truncate_chars};
use crate::llm_client::{CompletionParams, LlmClient, LlmError};
use crate::optimizer::prompts::{
    MULTI_DOMAIN_GENERATION_TEMPLATE, MULTI_DOMAIN_PREVIEW_CHARS, MULTI_DOMAIN_REASONING_TEMPLATE,
};
use crate::optimizer::{py_slice, sort_by_quality};

/// References retrieved per tier per pseudo-domain.
pub const DEFAULT_K: usize = 3;
const PSEUDO_DOMAINS: [&str; 4] = ["math", "reasoning", "fact", "code"];

/// One task description per domain, in prompt order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossDomainTasks {
    pub math: String,
    pub reasoning: String,
    pub fact: String,
    pub code: String,
}

impl Default for CrossDomainTasks {
    fn default() -> Self {
        Self {
            math: "Solve grade-school math word problems".to_string(),
            reasoning: "Solve logical reasoning tasks".to_string(),
            fact: "Verify statement truthfulness".to_string(),
            code: "Generate correct Python code".to_string(),
        }
    }
}

impl CrossDomainTasks {
    pub fn domains(&self) -> Vec<String> {
        PSEUDO_DOMAINS.iter().map(|d| d.to_string()).collect()
    }
}

/// Contrastive references for one pseudo-domain.
#[derive(Debug, Clone)]
pub struct DomainContrast {
    pub domain: &'static str,
    pub high: Vec<ReferenceExample>,
    pub low: Vec<ReferenceExample>,
}

/// Output of the multi-domain optimization, plus evaluations once the runner adds them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiDomainResult {
    pub optimization_type: String,
    pub domains: Vec<String>,
    pub tasks: CrossDomainTasks,
    pub reasoning: String,
    pub optimized_prompt: String,
    pub api_calls: u64,
    /// Keyed by CRPO domain key (`math`, `reasoning`, `fact`, `code`).
    #[serde(default)]
    pub evaluations: BTreeMap<String, EvaluationSummary>,
    /// Mean of per-domain average scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    /// Population std dev of per-domain average scores (lower is more robust).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robustness: Option<f64>,
}

pub struct MultiDomainOptimizer {
    llm: LlmClient,
    api_calls: u64,
}

impl MultiDomainOptimizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm, api_calls: 0 }
    }

    /// Slices the quality-sorted pool into four tiered contrastive pairs.
    ///
    /// With `c = n / 4`: math takes `[0:k]` / `[-k:]`, reasoning `[c:c+k]` /
    /// `[-(c+k):-c]`, fact `[2c:2c+k]` / `[-(2c+k):-c]`, code `[3c:3c+k]` /
    /// `[-(3c+k):-2c]`. A pool smaller than four gives every domain `[-k:]` as low.
    pub fn retrieve_multidomain_examples(
        &self,
        references: &[ReferenceExample],
        k: usize,
    ) -> Vec<DomainContrast> {
        let sorted = sort_by_quality(references);
        let c = (sorted.len() / 4) as isize;
        let k = k as isize;

        let bottom_k = || {
            if k == 0 {
                Vec::new()
            } else {
                py_slice(&sorted, -k, None)
            }
        };
        let low = |start: isize, end: isize| {
            if c > 0 {
                py_slice(&sorted, start, Some(end))
            } else {
                bottom_k()
            }
        };

        vec![
            DomainContrast {
                domain: "math",
                high: py_slice(&sorted, 0, Some(k)),
                low: bottom_k(),
            },
            DomainContrast {
                domain: "reasoning",
                high: py_slice(&sorted, c, Some(c + k)),
                low: low(-(c + k), -c),
            },
            DomainContrast {
                domain: "fact",
                high: py_slice(&sorted, 2 * c, Some(2 * c + k)),
                low: low(-(2 * c + k), -c),
            },
            DomainContrast {
                domain: "code",
                high: py_slice(&sorted, 3 * c, Some(3 * c + k)),
                low: low(-(3 * c + k), -2 * c),
            },
        ]
    }

    /// Asks the model which prompt properties generalize across every domain.
    pub async fn multidomain_contrastive_reasoning(
        &mut self,
        tasks: &CrossDomainTasks,
        contrasts: &[DomainContrast],
    ) -> Result<String, LlmError> {
        let prompt = build_reasoning_prompt(tasks, contrasts);
        let reasoning = self
            .llm
            .complete(&prompt, CompletionParams::MULTI_DOMAIN_REASONING)
            .await?;
        self.api_calls += 1;
        Ok(reasoning)
    }

    /// Turns the cross-domain rationale into a normalized `{question}` template.
    pub async fn generate_multidomain_optimized_prompt(
        &mut self,
        reasoning: &str,
    ) -> Result<String, LlmError> {
        let prompt = MULTI_DOMAIN_GENERATION_TEMPLATE.replace("{reasoning}", reasoning);
        let raw = self
            .llm
            .complete(&prompt, CompletionParams::MULTI_DOMAIN_GENERATION)
            .await?;
        self.api_calls += 1;
        Ok(normalize_template(&raw))
    }

    /// Full multi-domain pipeline.
    pub async fn optimize_multidomain(
        &mut self,
        references: &[ReferenceExample],
        tasks: &CrossDomainTasks,
    ) -> Result<MultiDomainResult, LlmError> {
        info!("Multi-domain CRPO across: {}", PSEUDO_DOMAINS.join(", "));

        let contrasts = self.retrieve_multidomain_examples(references, DEFAULT_K);
        info!("Step 1: retrieved examples for {} domains", contrasts.len());

        let reasoning = self
            .multidomain_contrastive_reasoning(tasks, &contrasts)
            .await?;
        info!(
            "Step 2: generated reasoning ({} chars): {}...",
            reasoning.chars().count(),
            truncate_chars(&reasoning, 200)
        );

        let optimized_prompt = self
            .generate_multidomain_optimized_prompt(&reasoning)
            .await?;
        info!(
            "Step 3: generated prompt ({} chars): {}...",
            optimized_prompt.chars().count(),
            truncate_chars(&optimized_prompt, 300)
        );

        info!(
            "Multi-domain optimization complete, total API calls: {}",
            self.api_calls
        );

        Ok(MultiDomainResult {
            optimization_type: "multi_domain".to_string(),
            domains: tasks.domains(),
            tasks: tasks.clone(),
            reasoning,
            optimized_prompt,
            api_calls: self.api_calls,
            evaluations: BTreeMap::new(),
            average_score: None,
            robustness: None,
        })
    }
}

/// Only the best example of each tier is shown to the model.
fn preview(examples: &[ReferenceExample]) -> String {
    examples
        .first()
        .map(|e| format!("{}...", truncate_chars(&e.prompt, MULTI_DOMAIN_PREVIEW_CHARS)))
        .unwrap_or_else(|| "(no example available)".to_string())
}

fn build_reasoning_prompt(tasks: &CrossDomainTasks, contrasts: &[DomainContrast]) -> String {
    let examples_text: String = contrasts
        .iter()
        .map(|c| {
            format!(
                "\n{} DOMAIN:\n  High quality: {}\n  Low quality: {}\n",
                c.domain.to_uppercase(),
                preview(&c.high),
                preview(&c.low)
            )
        })
        .collect();

    MULTI_DOMAIN_REASONING_TEMPLATE
        .replace("{math_task}", &tasks.math)
        .replace("{reasoning_task}", &tasks.reasoning)
        .replace("{fact_task}", &tasks.fact)
        .replace("{code_task}", &tasks.code)
        .replace("{examples_text}", &examples_text)
}
