use std::path::PathBuf;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Harness-level error type.
/// Experiment runners and report builders return `Result<T, AppError>`;
/// `main` converts into `anyhow::Error` at the top.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dataset error ({path}): {message}")]
    Dataset { path: PathBuf, message: String },

    #[error("Missing experiment results: {0}. Run the corresponding experiment first.")]
    MissingResults(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Figure error ({path}): {message}")]
    Figure { path: PathBuf, message: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn dataset(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Dataset {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_names_path() {
        let err = AppError::dataset("data/raw/gsm8k/test.json", "file not found");
        let msg = err.to_string();
        assert!(msg.contains("data/raw/gsm8k/test.json"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_missing_results_hints_at_rerun() {
        let err = AppError::MissingResults(PathBuf::from("experiments/baseline_zero_shot.json"));
        assert!(err.to_string().contains("Run the corresponding experiment"));
    }

    #[test]
    fn test_llm_error_converts() {
        let err: AppError = LlmError::EmptyContent.into();
        assert!(matches!(err, AppError::Llm(LlmError::EmptyContent)));
    }
}
