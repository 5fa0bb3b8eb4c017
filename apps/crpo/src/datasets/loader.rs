//! Dataset loaders: read raw JSON dumps and standardize them into `Example`s.
//!
//! Layout under the data directory:
//! `gsm8k/{split}.json`, `bbh/{task}.json`, `liar/{split}.json`,
//! `humaneval/samples.json`, `helpsteer2/full.json`.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::datasets::models::{
    BbhRecord, Domain, Example, Gsm8kRecord, HelpSteerRecord, HumanEvalRecord, LiarRecord,
    ReferenceExample,
};
use crate::errors::AppError;

const GSM8K_TRAIN_SAMPLE: usize = 500;
const GSM8K_TEST_SAMPLE: usize = 1000;
const BBH_TRAIN_FRACTION: f64 = 0.7;
/// BBH train/test splits stay fixed whatever `DATASET_SEED` is.
const BBH_SPLIT_SEED: u64 = 42;
const DEFAULT_QUALITY_SCORE: f64 = 5.0;

/// Loads every benchmark the harness knows about from a single data directory.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    data_dir: PathBuf,
    seed: u64,
}

impl DatasetLoader {
    pub fn new(data_dir: impl Into<PathBuf>, seed: u64) -> Self {
        Self {
            data_dir: data_dir.into(),
            seed,
        }
    }

    /// GSM8K math word problems. `train` and `test` are randomly subsampled.
    pub fn load_gsm8k(&self, split: &str) -> Result<Vec<Example>, AppError> {
        let path = self.data_dir.join("gsm8k").join(format!("{split}.json"));
        let mut records: Vec<Gsm8kRecord> = read_json(&path)?;

        let sample_size = match split {
            "train" => Some(GSM8K_TRAIN_SAMPLE),
            "test" => Some(GSM8K_TEST_SAMPLE),
            _ => None,
        };
        if let Some(limit) = sample_size {
            let mut rng = StdRng::seed_from_u64(self.seed);
            records.shuffle(&mut rng);
            records.truncate(limit);
        }

        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, r)| Example {
                id: format!("gsm8k_{i}"),
                prompt: r.question,
                answer: r.answer,
                domain: Domain::Math,
            })
            .collect())
    }

    /// BIG-Bench Hard task, shuffled with a fixed seed and split 70/30 into (train, test).
    pub fn load_bbh(&self, task: &str) -> Result<(Vec<Example>, Vec<Example>), AppError> {
        let path = self
            .data_dir
            .join("bbh")
            .join(format!("{}.json", bbh_file_name(task)));
        let mut records: Vec<BbhRecord> = read_json(&path)?;

        let mut rng = StdRng::seed_from_u64(BBH_SPLIT_SEED);
        records.shuffle(&mut rng);

        let split_idx = (records.len() as f64 * BBH_TRAIN_FRACTION) as usize;
        let test_records = records.split_off(split_idx);

        let process = |items: Vec<BbhRecord>| -> Vec<Example> {
            items
                .into_iter()
                .enumerate()
                .map(|(i, r)| Example {
                    id: format!("bbh_{task}_{i}"),
                    prompt: r.input,
                    answer: value_to_string(&r.target),
                    domain: Domain::Reasoning,
                })
                .collect()
        };

        Ok((process(records), process(test_records)))
    }

    /// LIAR fact-verification statements with labels collapsed to true / half-true / false.
    pub fn load_liar(&self, split: &str) -> Result<Vec<Example>, AppError> {
        let path = self.data_dir.join("liar").join(format!("{split}.json"));
        let records: Vec<LiarRecord> = read_json(&path)?;

        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let raw_label = r.label.or(r.truthfulness);
                Example {
                    id: format!("liar_{i}"),
                    prompt: r.statement.unwrap_or_default(),
                    answer: liar_label(raw_label.as_ref()),
                    domain: Domain::FactVerification,
                }
            })
            .collect())
    }

    /// First `n_samples` HumanEval problems; the canonical solution is the reference answer.
    pub fn load_humaneval(&self, n_samples: usize) -> Result<Vec<Example>, AppError> {
        let path = self.data_dir.join("humaneval").join("samples.json");
        let records: Vec<HumanEvalRecord> = read_json(&path)?;

        Ok(records
            .into_iter()
            .take(n_samples)
            .enumerate()
            .map(|(i, r)| Example {
                id: format!("code_{i}"),
                prompt: r.prompt,
                answer: r.canonical_solution,
                domain: Domain::Code,
            })
            .collect())
    }

    /// HelpSteer2 reference pool for contrastive retrieval.
    pub fn load_helpsteer2(&self) -> Result<Vec<ReferenceExample>, AppError> {
        let path = self.data_dir.join("helpsteer2").join("full.json");
        let records: Vec<HelpSteerRecord> = read_json(&path)?;

        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, r)| ReferenceExample {
                id: format!("help_{i}"),
                prompt: r.prompt.unwrap_or_default(),
                response: r.response.unwrap_or_default(),
                quality_score: r.helpfulness.unwrap_or(DEFAULT_QUALITY_SCORE),
            })
            .collect())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::dataset(path, format!("cannot read file: {e}")))?;
    let parsed = serde_json::from_str(&raw)
        .map_err(|e| AppError::dataset(path, format!("malformed JSON: {e}")))?;
    debug!("Loaded {}", path.display());
    Ok(parsed)
}

fn bbh_file_name(task: &str) -> &str {
    match task {
        "navigate" => "navigate",
        "boolean_expressions" | "boolean" => "boolean",
        other => other,
    }
}

/// Maps a LIAR label to a readable verdict.
/// Integer labels: 0 pants-fire, 1 false, 2 half-true, 3 mostly-true, 4 true.
fn liar_label(label: Option<&serde_json::Value>) -> String {
    use serde_json::Value;

    match label {
        None | Some(Value::Null) => "false".to_string(),
        Some(Value::Number(n)) if n.as_i64().is_some() => match n.as_i64() {
            Some(0) | Some(1) => "false".to_string(),
            Some(2) => "half-true".to_string(),
            Some(3) | Some(4) => "true".to_string(),
            _ => "unknown".to_string(),
        },
        Some(other) => value_to_string(other).to_lowercase(),
    }
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, value: serde_json::Value) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_gsm8k_test_split_standardizes_records() {
        let tmp = TempDir::new().unwrap();
        let items: Vec<_> = (0..5)
            .map(|i| json!({"question": format!("q{i}"), "answer": format!("#### {i}")}))
            .collect();
        write(tmp.path(), "gsm8k/test.json", json!(items));

        let loader = DatasetLoader::new(tmp.path(), 42);
        let examples = loader.load_gsm8k("test").unwrap();
        assert_eq!(examples.len(), 5);
        assert_eq!(examples[0].id, "gsm8k_0");
        assert_eq!(examples[4].id, "gsm8k_4");
        assert!(examples.iter().all(|e| e.domain == Domain::Math));
    }

    #[test]
    fn test_gsm8k_train_is_capped_at_500() {
        let tmp = TempDir::new().unwrap();
        let items: Vec<_> = (0..620)
            .map(|i| json!({"question": format!("q{i}"), "answer": "1"}))
            .collect();
        write(tmp.path(), "gsm8k/train.json", json!(items));

        let loader = DatasetLoader::new(tmp.path(), 7);
        assert_eq!(loader.load_gsm8k("train").unwrap().len(), 500);
    }

    #[test]
    fn test_gsm8k_sampling_is_deterministic_for_seed() {
        let tmp = TempDir::new().unwrap();
        let items: Vec<_> = (0..50)
            .map(|i| json!({"question": format!("q{i}"), "answer": "1"}))
            .collect();
        write(tmp.path(), "gsm8k/test.json", json!(items));

        let a = DatasetLoader::new(tmp.path(), 42).load_gsm8k("test").unwrap();
        let b = DatasetLoader::new(tmp.path(), 42).load_gsm8k("test").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bbh_splits_70_30_with_alias() {
        let tmp = TempDir::new().unwrap();
        let items: Vec<_> = (0..10)
            .map(|i| json!({"input": format!("expr {i}"), "target": "True"}))
            .collect();
        write(tmp.path(), "bbh/boolean.json", json!(items));

        let loader = DatasetLoader::new(tmp.path(), 42);
        let (train, test) = loader.load_bbh("boolean_expressions").unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
        assert_eq!(test[0].id, "bbh_boolean_expressions_0");
        assert_eq!(test[0].answer, "True");
        assert_eq!(test[0].domain, Domain::Reasoning);
    }

    #[test]
    fn test_bbh_split_ignores_dataset_seed() {
        let tmp = TempDir::new().unwrap();
        let items: Vec<_> = (0..20)
            .map(|i| json!({"input": format!("expr {i}"), "target": "False"}))
            .collect();
        write(tmp.path(), "bbh/navigate.json", json!(items));

        let (train_a, test_a) = DatasetLoader::new(tmp.path(), 42).load_bbh("navigate").unwrap();
        let (train_b, test_b) = DatasetLoader::new(tmp.path(), 7).load_bbh("navigate").unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_liar_label_mapping() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "liar/test.json",
            json!([
                {"statement": "a", "label": 0},
                {"statement": "b", "label": 2},
                {"statement": "c", "label": 4},
                {"statement": "d", "label": "Mostly-True"},
                {"statement": "e", "truthfulness": 3},
                {"statement": "f", "label": 9},
                {}
            ]),
        );

        let loader = DatasetLoader::new(tmp.path(), 42);
        let answers: Vec<String> = loader
            .load_liar("test")
            .unwrap()
            .into_iter()
            .map(|e| e.answer)
            .collect();
        assert_eq!(
            answers,
            vec!["false", "half-true", "true", "mostly-true", "true", "unknown", "false"]
        );
    }

    #[test]
    fn test_humaneval_takes_first_n() {
        let tmp = TempDir::new().unwrap();
        let items: Vec<_> = (0..8)
            .map(|i| json!({"prompt": format!("def f{i}():"), "canonical_solution": "    return 1"}))
            .collect();
        write(tmp.path(), "humaneval/samples.json", json!(items));

        let loader = DatasetLoader::new(tmp.path(), 42);
        let examples = loader.load_humaneval(3).unwrap();
        assert_eq!(examples.len(), 3);
        assert_eq!(examples[2].prompt, "def f2():");
        assert_eq!(examples[2].id, "code_2");
    }

    #[test]
    fn test_helpsteer2_defaults_quality_to_five() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "helpsteer2/full.json",
            json!([
                {"prompt": "p1", "response": "r1", "helpfulness": 4},
                {"prompt": "p2"}
            ]),
        );

        let loader = DatasetLoader::new(tmp.path(), 42);
        let refs = loader.load_helpsteer2().unwrap();
        assert_eq!(refs[0].quality_score, 4.0);
        assert_eq!(refs[1].quality_score, 5.0);
        assert_eq!(refs[1].response, "");
    }

    #[test]
    fn test_missing_file_is_dataset_error() {
        let tmp = TempDir::new().unwrap();
        let loader = DatasetLoader::new(tmp.path(), 42);
        let err = loader.load_liar("test").unwrap_err();
        assert!(matches!(err, AppError::Dataset { .. }));
    }

    #[test]
    fn test_malformed_json_is_dataset_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("liar")).unwrap();
        std::fs::write(tmp.path().join("liar/test.json"), "{not json").unwrap();
        let err = DatasetLoader::new(tmp.path(), 42)
            .load_liar("test")
            .unwrap_err();
        assert!(err.to_string().contains("malformed JSON"));
    }
}
