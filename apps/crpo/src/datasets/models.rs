use std::fmt;

use serde::{Deserialize, Serialize};

/// Reasoning domain a benchmark example belongs to. Drives correctness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Math,
    Reasoning,
    FactVerification,
    Code,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Math,
        Domain::Reasoning,
        Domain::FactVerification,
        Domain::Code,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Math => "math",
            Domain::Reasoning => "reasoning",
            Domain::FactVerification => "fact_verification",
            Domain::Code => "code",
        }
    }

    /// Short key used by CRPO result documents (`fact` rather than `fact_verification`).
    pub fn crpo_key(&self) -> &'static str {
        match self {
            Domain::FactVerification => "fact",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single benchmark question in the standardized shape shared by all loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub id: String,
    pub prompt: String,
    pub answer: String,
    pub domain: Domain,
}

/// A prompt/response pair with a helpfulness rating, used as CRPO reference material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceExample {
    pub id: String,
    pub prompt: String,
    pub response: String,
    pub quality_score: f64,
}

// Raw on-disk records. Field names follow the upstream dataset dumps.

#[derive(Debug, Deserialize)]
pub(crate) struct Gsm8kRecord {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BbhRecord {
    pub input: String,
    pub target: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LiarRecord {
    #[serde(default)]
    pub statement: Option<String>,
    #[serde(default)]
    pub label: Option<serde_json::Value>,
    #[serde(default)]
    pub truthfulness: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HumanEvalRecord {
    pub prompt: String,
    pub canonical_solution: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HelpSteerRecord {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub helpfulness: Option<f64>,
}
