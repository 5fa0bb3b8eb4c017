//! Baseline comparison: zero-shot vs few-shot vs single-domain CRPO, per benchmark.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::ScoringMode;
use crate::experiments::baselines::BaselineResults;
use crate::experiments::crpo_runs::SingleDomainResults;
use crate::experiments::{read_results, write_json, Benchmark, ExperimentKind};
use crate::reports::{crpo_key, display_label, format_table, missing_entry, write_csv};

const HEADER: [&str; 4] = ["Domain", "Zero-Shot", "Few-Shot", "Single-Domain CRPO"];

/// One table row. Scores are pre-formatted to three decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRow {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Zero-Shot")]
    pub zero_shot: String,
    #[serde(rename = "Few-Shot")]
    pub few_shot: String,
    #[serde(rename = "Single-Domain CRPO")]
    pub single_domain_crpo: String,
}

impl BaselineRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.domain.clone(),
            self.zero_shot.clone(),
            self.few_shot.clone(),
            self.single_domain_crpo.clone(),
        ]
    }
}

pub fn build_baseline_table(
    zero_shot: &BaselineResults,
    few_shot: &BaselineResults,
    single: &SingleDomainResults,
) -> Result<Vec<BaselineRow>, AppError> {
    Benchmark::ALL
        .iter()
        .map(|&benchmark| {
            let key = benchmark.key();
            let zero = zero_shot
                .get(key)
                .ok_or_else(|| missing_entry(ExperimentKind::ZeroShot, key))?;
            let few = few_shot
                .get(key)
                .ok_or_else(|| missing_entry(ExperimentKind::FewShot, key))?;
            let crpo = single
                .get(crpo_key(benchmark))
                .and_then(|r| r.evaluation)
                .ok_or_else(|| missing_entry(ExperimentKind::SingleDomainCrpo, crpo_key(benchmark)))?;

            Ok(BaselineRow {
                domain: display_label(key),
                zero_shot: format!("{:.3}", zero.average_score),
                few_shot: format!("{:.3}", few.average_score),
                single_domain_crpo: format!("{:.3}", crpo.average_score),
            })
        })
        .collect()
}

pub fn format_baseline_table(rows: &[BaselineRow]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(BaselineRow::cells).collect();
    format_table(&HEADER, &cells)
}

fn output_stem(results_dir: &Path, mode: ScoringMode) -> PathBuf {
    results_dir.join(format!("baseline_comparison{}", mode.file_suffix()))
}

/// Loads the three documents, writes `baseline_comparison[_reward].{csv,json}`.
pub fn create_baseline_table(
    experiments_dir: &Path,
    results_dir: &Path,
    mode: ScoringMode,
) -> Result<Vec<BaselineRow>, AppError> {
    let zero_shot: BaselineResults =
        read_results(&experiments_dir.join(ExperimentKind::ZeroShot.file_name(mode)))?;
    let few_shot: BaselineResults =
        read_results(&experiments_dir.join(ExperimentKind::FewShot.file_name(mode)))?;
    let single: SingleDomainResults =
        read_results(&experiments_dir.join(ExperimentKind::SingleDomainCrpo.file_name(mode)))?;

    let rows = build_baseline_table(&zero_shot, &few_shot, &single)?;

    let stem = output_stem(results_dir, mode);
    let cells: Vec<Vec<String>> = rows.iter().map(BaselineRow::cells).collect();
    write_csv(&stem.with_extension("csv"), &HEADER, &cells)?;
    write_json(&stem.with_extension("json"), &rows)?;
    info!("Baseline table saved to {}", results_dir.display());

    Ok(rows)
}
