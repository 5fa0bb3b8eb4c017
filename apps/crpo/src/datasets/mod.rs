// Benchmark datasets: GSM8K, BBH, LIAR, HumanEval, plus the HelpSteer2 reference pool.
// Everything is standardized to `Example` / `ReferenceExample` on load.

pub mod loader;
pub mod models;

pub use loader::DatasetLoader;
pub use models::{Domain, Example, ReferenceExample};
