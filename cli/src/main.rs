//! `bid-reward`: score recorded bidding episodes from the command line
//!
//! ```text
//! bid-reward score --episode episode.json --initial-budget 1000 --verbose
//! bid-reward policy --policy experiments/lenient.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bid_reward_core_rs::{score_episode, AuctionOutcome, RewardCalculator, RewardPolicy};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Reward scoring for keyword bidding agents")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a JSON array of auction outcomes and print the episode return
    Score {
        /// Episode file: JSON array of auction outcome records
        #[arg(long)]
        episode: PathBuf,

        /// Budget at the start of the episode
        #[arg(long)]
        initial_budget: f64,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Trace which reward branches and penalties fired
        #[arg(short, long)]
        verbose: bool,

        /// Print the episode summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective reward policy and its hash
    Policy {
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Args, Default)]
struct PolicyArgs {
    /// JSON policy file; flags below override its fields
    #[arg(long)]
    policy: Option<PathBuf>,

    #[arg(long)]
    max_budget_consumption: Option<f64>,

    #[arg(long)]
    stop_penalty_percent: Option<f64>,

    #[arg(long)]
    stop_penalty_decay: Option<f64>,

    #[arg(long)]
    keyword_base_importance: Option<f64>,
}

impl PolicyArgs {
    fn resolve(&self) -> Result<RewardPolicy> {
        let mut policy = match &self.policy {
            Some(path) => RewardPolicy::from_json_file(path)
                .with_context(|| format!("loading policy from {}", path.display()))?,
            None => RewardPolicy::default(),
        };

        if let Some(v) = self.max_budget_consumption {
            policy.max_budget_consumption_per_auction = v;
        }
        if let Some(v) = self.stop_penalty_percent {
            policy.stop_penalty_percent = v;
        }
        if let Some(v) = self.stop_penalty_decay {
            policy.stop_penalty_decay = v;
        }
        if let Some(v) = self.keyword_base_importance {
            policy.keyword_base_importance = v;
        }

        policy.validate().context("invalid policy")?;
        Ok(policy)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_episode(path: &Path) -> Result<Vec<AuctionOutcome>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading episode file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing episode file {}", path.display()))
}

fn run_score(
    episode: &Path,
    initial_budget: f64,
    policy: &PolicyArgs,
    verbose: bool,
    json: bool,
) -> Result<()> {
    let calculator = RewardCalculator::new(policy.resolve()?)?;
    let outcomes = load_episode(episode)?;
    let summary = score_episode(&calculator, &outcomes, initial_budget, verbose)
        .with_context(|| format!("scoring {}", episode.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for (step, reward) in summary.rewards.iter().enumerate() {
        println!("step {:>4}: {:>12.4}", step, reward);
    }
    println!("episode return: {:.4} ({} steps)", summary.total, summary.steps);
    Ok(())
}

fn run_policy(policy: &PolicyArgs) -> Result<()> {
    let policy = policy.resolve()?;
    println!("{}", serde_json::to_string_pretty(&policy)?);
    println!("hash: {}", policy.config_hash()?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.cmd {
        Command::Score {
            episode,
            initial_budget,
            policy,
            verbose,
            json,
        } => {
            init_tracing(*verbose);
            run_score(episode, *initial_budget, policy, *verbose, *json)
        }
        Command::Policy { policy } => {
            init_tracing(false);
            run_policy(policy)
        }
    }
}
