mod config;
mod datasets;
mod errors;
mod evaluation;
mod experiments;
mod llm_client;
mod optimizer;
mod reports;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::datasets::DatasetLoader;
use crate::evaluation::{build_scorer, ScoringMode};
use crate::experiments::baselines::format_baseline_summary;
use crate::experiments::crpo_runs::{format_multi_domain_summary, format_single_domain_summary};
use crate::experiments::{ExperimentKind, ExperimentRunner};
use crate::llm_client::prompts::PING_PROMPT;
use crate::llm_client::{CompletionParams, LlmClient};
use crate::reports::analysis::{format_final_analysis, read_final_analysis};
use crate::reports::baseline_table::format_baseline_table;
use crate::reports::figures::{render_analysis, trajectory_preview};

#[derive(Parser, Debug)]
#[command(name = "crpo")]
#[command(about = "Contrastive reasoning prompt optimization experiments", long_about = None)]
#[command(version)]
struct Cli {
    /// How responses are scored
    #[arg(long, value_enum, global = true, default_value_t = ScoringMode::Correctness)]
    scoring: ScoringMode,

    /// Raw dataset directory (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Experiment output directory (overrides EXPERIMENTS_DIR)
    #[arg(long, global = true)]
    experiments_dir: Option<PathBuf>,

    /// Report output directory (overrides RESULTS_DIR)
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Directory flags win over the environment.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.experiments_dir {
            config.experiments_dir = dir.clone();
        }
        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Send one test prompt to the LLM API
    Ping,
    /// Zero-shot chain-of-thought baseline on all benchmarks
    ZeroShot,
    /// Few-shot baseline on all benchmarks
    FewShot,
    /// Optimize and evaluate one prompt per domain
    SingleDomain,
    /// Optimize one prompt for all domains and measure robustness
    MultiDomain,
    /// Build the baseline comparison table
    BaselineTable,
    /// Build the final cross-method analysis
    Analyze,
    /// Render PNG and SVG figures from the final analysis
    Figures,
    /// Run every experiment, then every report
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CRPO harness v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        config.groq_api_key.clone(),
        config.groq_api_url.clone(),
        config.model.clone(),
    )
    .context("failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());

    match cli.command {
        Commands::Ping => ping(&llm).await,
        Commands::ZeroShot => run_experiment(&config, llm, cli.scoring, ExperimentKind::ZeroShot).await,
        Commands::FewShot => run_experiment(&config, llm, cli.scoring, ExperimentKind::FewShot).await,
        Commands::SingleDomain => {
            run_experiment(&config, llm, cli.scoring, ExperimentKind::SingleDomainCrpo).await
        }
        Commands::MultiDomain => {
            run_experiment(&config, llm, cli.scoring, ExperimentKind::MultiDomainCrpo).await
        }
        Commands::BaselineTable => baseline_table(&config, cli.scoring),
        Commands::Analyze => analyze(&config, cli.scoring),
        Commands::Figures => figures(&config, cli.scoring),
        Commands::All => {
            for kind in [
                ExperimentKind::ZeroShot,
                ExperimentKind::FewShot,
                ExperimentKind::SingleDomainCrpo,
                ExperimentKind::MultiDomainCrpo,
            ] {
                run_experiment(&config, llm.clone(), cli.scoring, kind).await?;
            }
            baseline_table(&config, cli.scoring)?;
            analyze(&config, cli.scoring)?;
            figures(&config, cli.scoring)?;
            info!("All done, {} API calls in total", llm.api_calls());
            Ok(())
        }
    }
}

async fn ping(llm: &LlmClient) -> Result<()> {
    let response = llm.call(PING_PROMPT, CompletionParams::PING).await?;
    println!("Model: {}", llm.model());
    println!("Prompt: {PING_PROMPT}");
    println!("Response: {}", response.text().unwrap_or("(empty)"));
    if let Some(usage) = response.usage {
        println!(
            "Tokens: {} prompt, {} completion",
            usage.prompt_tokens, usage.completion_tokens
        );
    }
    Ok(())
}

async fn run_experiment(
    config: &Config,
    llm: LlmClient,
    mode: ScoringMode,
    kind: ExperimentKind,
) -> Result<()> {
    let scorer = build_scorer(mode, config.reward_model_url.as_deref())?;
    let runner = ExperimentRunner::new(
        llm,
        DatasetLoader::new(&config.data_dir, config.dataset_seed),
        scorer,
        Duration::from_millis(config.request_delay_ms),
        &config.experiments_dir,
    );

    let summary = match kind {
        ExperimentKind::ZeroShot => format_baseline_summary(kind, &runner.run_zero_shot().await?),
        ExperimentKind::FewShot => format_baseline_summary(kind, &runner.run_few_shot().await?),
        ExperimentKind::SingleDomainCrpo => {
            format_single_domain_summary(&runner.run_single_domain().await?)
        }
        ExperimentKind::MultiDomainCrpo => {
            format_multi_domain_summary(&runner.run_multi_domain().await?)
        }
    };
    println!("\n{summary}");
    println!("Saved to {}", runner.output_path(kind).display());
    Ok(())
}

fn baseline_table(config: &Config, mode: ScoringMode) -> Result<()> {
    let rows = reports::create_baseline_table(&config.experiments_dir, &config.results_dir, mode)?;
    println!("\nBASELINE COMPARISON ({mode} scoring)\n");
    println!("{}", format_baseline_table(&rows));
    Ok(())
}

fn analyze(config: &Config, mode: ScoringMode) -> Result<()> {
    let analysis = reports::create_final_analysis(&config.experiments_dir, &config.results_dir, mode)?;
    println!("\nFINAL ANALYSIS ({mode} scoring)\n");
    println!("{}", format_final_analysis(&analysis));
    Ok(())
}

fn figures(config: &Config, mode: ScoringMode) -> Result<()> {
    let analysis = read_final_analysis(&config.results_dir, mode)?;
    let written = render_analysis(&analysis, &config.results_dir, mode)?;
    println!("\n{}", trajectory_preview(&analysis));
    for path in written {
        println!("Saved {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::vars;

    fn config() -> Config {
        Config::from_lookup(vars(&[("GROQ_API_KEY", "k"), ("DATA_DIR", "env/raw")])).unwrap()
    }

    #[test]
    fn test_defaults_keep_config_dirs() {
        let cli = Cli::try_parse_from(["crpo", "analyze"]).unwrap();
        assert_eq!(cli.scoring, ScoringMode::Correctness);
        assert_eq!(cli.command, Commands::Analyze);

        let mut config = config();
        cli.apply_overrides(&mut config);
        assert_eq!(config.data_dir, PathBuf::from("env/raw"));
        assert_eq!(config.experiments_dir, PathBuf::from("experiments"));
        assert_eq!(config.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_directory_flags_override_config() {
        let cli = Cli::try_parse_from([
            "crpo",
            "--data-dir",
            "cli/raw",
            "--experiments-dir",
            "cli/experiments",
            "--results-dir",
            "cli/results",
            "baseline-table",
        ])
        .unwrap();
        assert_eq!(cli.command, Commands::BaselineTable);

        let mut config = config();
        cli.apply_overrides(&mut config);
        assert_eq!(config.data_dir, PathBuf::from("cli/raw"));
        assert_eq!(config.experiments_dir, PathBuf::from("cli/experiments"));
        assert_eq!(config.results_dir, PathBuf::from("cli/results"));
    }

    #[test]
    fn test_global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "crpo",
            "single-domain",
            "--scoring",
            "reward",
            "--results-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.command, Commands::SingleDomain);
        assert_eq!(cli.scoring, ScoringMode::Reward);
        assert_eq!(cli.results_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_rejects_unknown_scoring_and_missing_subcommand() {
        assert!(Cli::try_parse_from(["crpo", "--scoring", "vibes", "all"]).is_err());
        assert!(Cli::try_parse_from(["crpo"]).is_err());
    }

    #[test]
    fn test_every_subcommand_parses() {
        for (arg, expected) in [
            ("ping", Commands::Ping),
            ("zero-shot", Commands::ZeroShot),
            ("few-shot", Commands::FewShot),
            ("single-domain", Commands::SingleDomain),
            ("multi-domain", Commands::MultiDomain),
            ("baseline-table", Commands::BaselineTable),
            ("analyze", Commands::Analyze),
            ("figures", Commands::Figures),
            ("all", Commands::All),
        ] {
            assert_eq!(Cli::try_parse_from(["crpo", arg]).unwrap().command, expected);
        }
    }
}
