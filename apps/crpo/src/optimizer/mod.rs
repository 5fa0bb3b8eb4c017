// Contrastive Reasoning Prompt Optimization (CRPO).
// Three sequential LLM steps: retrieve contrastive references → elicit a
// rationale → synthesize a generic `{question}` template from it.

pub mod multi_domain;
pub mod prompts;
pub mod single_domain;

pub use multi_domain::{CrossDomainTasks, MultiDomainOptimizer, MultiDomainResult};
pub use single_domain::{SingleDomainOptimizer, SingleDomainResult};

use crate::datasets::ReferenceExample;

/// References sorted by quality, best first. Ties keep their input order.
pub(crate) fn sort_by_quality(references: &[ReferenceExample]) -> Vec<ReferenceExample> {
    let mut sorted = references.to_vec();
    sorted.sort_by(|a, b| b.quality_score.total_cmp(&a.quality_score));
    sorted
}

/// `items[start:end]` with Python slice semantics: negative indices count from
/// the end, out-of-range bounds clamp, `end = None` means "to the end".
pub(crate) fn py_slice<T: Clone>(items: &[T], start: isize, end: Option<isize>) -> Vec<T> {
    let len = items.len() as isize;
    let resolve = |idx: isize| -> usize {
        let idx = if idx < 0 { idx + len } else { idx };
        idx.clamp(0, len) as usize
    };

    let start = resolve(start);
    let end = end.map(resolve).unwrap_or(items.len());
    if start >= end {
        return Vec::new();
    }
    items[start..end].to_vec()
}

#[cfg(test)]
pub(crate) fn reference(id: usize, quality: f64) -> ReferenceExample {
    ReferenceExample {
        id: format!("help_{id}"),
        prompt: format!("reference prompt {id}"),
        response: format!("reference response {id}"),
        quality_score: quality,
    }
}
