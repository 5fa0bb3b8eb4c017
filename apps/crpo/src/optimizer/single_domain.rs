//! Single-domain CRPO: optimizes one template for one task description.
//!
//! Flow: retrieve_reference_examples → contrastive_reasoning →
//!       generate_optimized_prompt → SingleDomainResult.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::datasets::{Domain, ReferenceExample};
use crate::evaluation::EvaluationSummary;
use crate::llm_client::prompts::{normalize_template, truncate_chars};
use crate::llm_client::{CompletionParams, LlmClient, LlmError};
use crate::optimizer::prompts::{
    SINGLE_DOMAIN_GENERATION_TEMPLATE, SINGLE_DOMAIN_PREVIEW_CHARS,
    SINGLE_DOMAIN_REASONING_TEMPLATE, SINGLE_DOMAIN_SHOWN_EXAMPLES,
};
use crate::optimizer::{py_slice, sort_by_quality};

/// High- and low-quality references retrieved per run.
pub const DEFAULT_K: usize = 5;

/// Output of one single-domain optimization, optionally with its held-out evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleDomainResult {
    pub task: String,
    pub domain: Domain,
    pub reasoning: String,
    pub optimized_prompt: String,
    pub api_calls: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationSummary>,
}

pub struct SingleDomainOptimizer {
    llm: LlmClient,
    api_calls: u64,
}

impl SingleDomainOptimizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm, api_calls: 0 }
    }

    #[cfg(test)]
    pub fn api_calls(&self) -> u64 {
        self.api_calls
    }

    /// Top `k` and bottom `k` references by quality score.
    pub fn retrieve_reference_examples(
        &self,
        references: &[ReferenceExample],
        k: usize,
    ) -> (Vec<ReferenceExample>, Vec<ReferenceExample>) {
        let sorted = sort_by_quality(references);
        let high = py_slice(&sorted, 0, Some(k as isize));
        let low = if k == 0 {
            Vec::new()
        } else {
            py_slice(&sorted, -(k as isize), None)
        };
        (high, low)
    }

    /// Asks the model why the high-quality references beat the low-quality ones for `task`.
    pub async fn contrastive_reasoning(
        &mut self,
        task: &str,
        high: &[ReferenceExample],
        low: &[ReferenceExample],
    ) -> Result<String, LlmError> {
        let prompt = build_reasoning_prompt(task, high, low);
        let reasoning = self
            .llm
            .complete(&prompt, CompletionParams::SINGLE_DOMAIN_REASONING)
            .await?;
        self.api_calls += 1;
        Ok(reasoning)
    }

    /// Turns the rationale into a normalized `{question}` template.
    pub async fn generate_optimized_prompt(
        &mut self,
        task: &str,
        reasoning: &str,
    ) -> Result<String, LlmError> {
        let prompt = SINGLE_DOMAIN_GENERATION_TEMPLATE
            .replace("{task}", task)
            .replace("{reasoning}", reasoning);
        let raw = self
            .llm
            .complete(&prompt, CompletionParams::SINGLE_DOMAIN_GENERATION)
            .await?;
        self.api_calls += 1;
        Ok(normalize_template(&raw))
    }

    /// Full single-domain pipeline.
    pub async fn optimize(
        &mut self,
        task: &str,
        references: &[ReferenceExample],
        domain: Domain,
    ) -> Result<SingleDomainResult, LlmError> {
        info!("Single-domain CRPO: task='{task}' domain={domain}");

        let (high, low) = self.retrieve_reference_examples(references, DEFAULT_K);
        info!(
            "Step 1: retrieved {} high-quality and {} low-quality examples",
            high.len(),
            low.len()
        );

        let reasoning = self.contrastive_reasoning(task, &high, &low).await?;
        info!(
            "Step 2: generated reasoning ({} chars): {}...",
            reasoning.chars().count(),
            truncate_chars(&reasoning, 200)
        );

        let optimized_prompt = self.generate_optimized_prompt(task, &reasoning).await?;
        info!(
            "Step 3: generated prompt ({} chars): {}...",
            optimized_prompt.chars().count(),
            truncate_chars(&optimized_prompt, 300)
        );

        info!("Optimization complete, total API calls: {}", self.api_calls);

        Ok(SingleDomainResult {
            task: task.to_string(),
            domain,
            reasoning,
            optimized_prompt,
            api_calls: self.api_calls,
            evaluation: None,
        })
    }
}

fn format_examples(examples: &[ReferenceExample], tier: &str) -> String {
    examples
        .iter()
        .take(SINGLE_DOMAIN_SHOWN_EXAMPLES)
        .enumerate()
        .map(|(i, e)| {
            format!(
                "Example {}: {}... → Response quality: {tier}",
                i + 1,
                truncate_chars(&e.prompt, SINGLE_DOMAIN_PREVIEW_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_reasoning_prompt(task: &str, high: &[ReferenceExample], low: &[ReferenceExample]) -> String {
    SINGLE_DOMAIN_REASONING_TEMPLATE
        .replace("{task}", task)
        .replace("{high_text}", &format_examples(high, "HIGH"))
        .replace("{low_text}", &format_examples(low, "LOW"))
}
