//! Final analysis across all four methods: per-domain scores, averages, and
//! robustness (sample std dev of per-domain scores, lower is better).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::{stats, ScoringMode};
use crate::experiments::baselines::BaselineResults;
use crate::experiments::crpo_runs::SingleDomainResults;
use crate::experiments::{read_results, write_json, Benchmark, ExperimentKind};
use crate::optimizer::MultiDomainResult;
use crate::reports::{crpo_key, display_label, format_table, missing_entry, write_csv, METHODS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Zero-Shot")]
    pub zero_shot: f64,
    #[serde(rename = "Few-Shot")]
    pub few_shot: f64,
    #[serde(rename = "Single-Domain CRPO")]
    pub single_domain_crpo: f64,
    #[serde(rename = "Multi-Domain CRPO")]
    pub multi_domain_crpo: f64,
}

impl DomainScores {
    /// Scores in `METHODS` order.
    pub fn scores(&self) -> [f64; 4] {
        [
            self.zero_shot,
            self.few_shot,
            self.single_domain_crpo,
            self.multi_domain_crpo,
        ]
    }
}

/// One value per method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodStats {
    #[serde(rename = "Zero-Shot")]
    pub zero_shot: f64,
    #[serde(rename = "Few-Shot")]
    pub few_shot: f64,
    #[serde(rename = "Single-Domain CRPO")]
    pub single_domain_crpo: f64,
    #[serde(rename = "Multi-Domain CRPO")]
    pub multi_domain_crpo: f64,
}

impl MethodStats {
    fn from_columns(rows: &[DomainScores], reduce: fn(&[f64]) -> f64) -> Self {
        let column = |i: usize| -> Vec<f64> { rows.iter().map(|r| r.scores()[i]).collect() };
        Self {
            zero_shot: reduce(&column(0)),
            few_shot: reduce(&column(1)),
            single_domain_crpo: reduce(&column(2)),
            multi_domain_crpo: reduce(&column(3)),
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [
            self.zero_shot,
            self.few_shot,
            self.single_domain_crpo,
            self.multi_domain_crpo,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAnalysis {
    pub per_domain: Vec<DomainScores>,
    pub averages: MethodStats,
    pub robustness: MethodStats,
    /// How much lower multi-domain std dev is than single-domain, in percent.
    pub robustness_improvement_percent: f64,
}

/// Uses the first benchmark of each CRPO domain, so `bbh_boolean` is left out.
pub fn build_final_analysis(
    zero_shot: &BaselineResults,
    few_shot: &BaselineResults,
    single: &SingleDomainResults,
    multi: &MultiDomainResult,
) -> Result<FinalAnalysis, AppError> {
    let mut seen = HashSet::new();
    let mut per_domain = Vec::new();

    for benchmark in Benchmark::ALL {
        let domain_key = crpo_key(benchmark);
        if !seen.insert(domain_key) {
            continue;
        }
        let key = benchmark.key();

        let zero = zero_shot
            .get(key)
            .ok_or_else(|| missing_entry(ExperimentKind::ZeroShot, key))?;
        let few = few_shot
            .get(key)
            .ok_or_else(|| missing_entry(ExperimentKind::FewShot, key))?;
        let single_eval = single
            .get(domain_key)
            .and_then(|r| r.evaluation)
            .ok_or_else(|| missing_entry(ExperimentKind::SingleDomainCrpo, domain_key))?;
        let multi_eval = multi
            .evaluations
            .get(domain_key)
            .ok_or_else(|| missing_entry(ExperimentKind::MultiDomainCrpo, domain_key))?;

        per_domain.push(DomainScores {
            domain: display_label(key),
            zero_shot: zero.average_score,
            few_shot: few.average_score,
            single_domain_crpo: single_eval.average_score,
            multi_domain_crpo: multi_eval.average_score,
        });
    }

    let averages = MethodStats::from_columns(&per_domain, stats::mean);
    let robustness = MethodStats::from_columns(&per_domain, stats::sample_std);
    let robustness_improvement_percent = if robustness.single_domain_crpo > 0.0 {
        (1.0 - robustness.multi_domain_crpo / robustness.single_domain_crpo) * 100.0
    } else {
        0.0
    };

    Ok(FinalAnalysis {
        per_domain,
        averages,
        robustness,
        robustness_improvement_percent,
    })
}

pub fn format_final_analysis(analysis: &FinalAnalysis) -> String {
    let mut header = vec!["Domain"];
    header.extend(METHODS);
    let rows: Vec<Vec<String>> = analysis
        .per_domain
        .iter()
        .map(|r| {
            std::iter::once(r.domain.clone())
                .chain(r.scores().into_iter().map(|s| format!("{s:.3}")))
                .collect()
        })
        .collect();

    let mut out = String::from("PER-DOMAIN SCORES:\n");
    out.push_str(&format_table(&header, &rows));

    out.push_str("\nAVERAGE SCORES BY METHOD:\n");
    for (method, avg) in METHODS.iter().zip(analysis.averages.values()) {
        out.push_str(&format!("  {method}: {avg:.3}\n"));
    }

    out.push_str("\nROBUSTNESS (std dev across domains, lower is better):\n");
    for (method, std) in METHODS.iter().zip(analysis.robustness.values()) {
        out.push_str(&format!("  {method}: {std:.4}\n"));
    }

    out.push_str(&format!(
        "\nROBUSTNESS IMPROVEMENT: {:.1}%\n",
        analysis.robustness_improvement_percent
    ));
    out
}

pub fn final_analysis_path(results_dir: &Path, mode: ScoringMode) -> PathBuf {
    results_dir.join(format!("final_analysis{}.json", mode.file_suffix()))
}

/// Reads the analysis saved by `create_final_analysis`.
pub fn read_final_analysis(results_dir: &Path, mode: ScoringMode) -> Result<FinalAnalysis, AppError> {
    read_results(&final_analysis_path(results_dir, mode))
}

/// Loads all four documents, writes `final_results_table[_reward].csv` and
/// `final_analysis[_reward].json`.
pub fn create_final_analysis(
    experiments_dir: &Path,
    results_dir: &Path,
    mode: ScoringMode,
) -> Result<FinalAnalysis, AppError> {
    let zero_shot: BaselineResults =
        read_results(&experiments_dir.join(ExperimentKind::ZeroShot.file_name(mode)))?;
    let few_shot: BaselineResults =
        read_results(&experiments_dir.join(ExperimentKind::FewShot.file_name(mode)))?;
    let single: SingleDomainResults =
        read_results(&experiments_dir.join(ExperimentKind::SingleDomainCrpo.file_name(mode)))?;
    let multi: MultiDomainResult =
        read_results(&experiments_dir.join(ExperimentKind::MultiDomainCrpo.file_name(mode)))?;

    let analysis = build_final_analysis(&zero_shot, &few_shot, &single, &multi)?;

    let mut header = vec!["Domain"];
    header.extend(METHODS);
    let rows: Vec<Vec<String>> = analysis
        .per_domain
        .iter()
        .map(|r| {
            std::iter::once(r.domain.clone())
                .chain(r.scores().into_iter().map(|s| s.to_string()))
                .collect()
        })
        .collect();
    write_csv(
        &results_dir.join(format!("final_results_table{}.csv", mode.file_suffix())),
        &header,
        &rows,
    )?;
    write_json(&final_analysis_path(results_dir, mode), &analysis)?;
    info!("Final analysis saved to {}", results_dir.display());

    Ok(analysis)
}
