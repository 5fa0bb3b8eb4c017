// Reports built from saved experiment documents: the baseline comparison
// table, the final cross-method analysis, and the figures.

pub mod analysis;
pub mod baseline_table;
pub mod figures;

use std::path::Path;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, CellAlignment, Table};

use crate::errors::AppError;
use crate::experiments::{Benchmark, ExperimentKind};

pub use analysis::create_final_analysis;
pub use baseline_table::create_baseline_table;

/// Column labels, in table order.
pub const METHODS: [&str; 4] = [
    "Zero-Shot",
    "Few-Shot",
    "Single-Domain CRPO",
    "Multi-Domain CRPO",
];

/// `bbh_navigate` → `Bbh Navigate`, `gsm8k` → `Gsm8K`.
/// A letter is upper-cased when it does not follow another letter.
pub fn display_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_alpha = false;
    for ch in key.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Writes a header line plus rows as comma-separated values.
pub(crate) fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = header.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(","));
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Bordered stdout table. Score columns are right-aligned.
pub(crate) fn format_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    for column in table.column_iter_mut().skip(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table.to_string()
}

pub(crate) fn missing_entry(kind: ExperimentKind, key: &str) -> AppError {
    AppError::Validation(format!("{kind} results have no entry for '{key}'"))
}

/// CRPO domain key a baseline benchmark is compared against.
pub(crate) fn crpo_key(benchmark: Benchmark) -> &'static str {
    benchmark.domain().crpo_key()
}
