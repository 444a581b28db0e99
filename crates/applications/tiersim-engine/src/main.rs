//! tiersim - object-storage lifecycle & cost simulator
//!
//! ## Usage
//!
//! ```bash
//! # Compare the cost of 100 GB for a year across storage classes
//! tiersim estimate --size 100 --months 12
//!
//! # Show price tables
//! tiersim tiers
//!
//! # Interactive session (commands on stdin; `help` lists them)
//! tiersim session --seed 42
//!
//! # Scripted session with a custom policy / price file
//! tiersim --config tiersim.json session --script scripts/demo.tiersim
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiersim_core::Presenter;
use tiersim_engine::{JsonPresenter, Session, SimConfig, Simulator, TerminalPresenter};

/// tiersim: simulate object-storage lifecycle transitions and costs
#[derive(Parser)]
#[command(name = "tiersim")]
#[command(about = "Simulate object-storage lifecycle tiering and cost", long_about = None)]
struct Cli {
    /// JSON config file (policy, prices, step_days)
    #[arg(long, global = true, env = "TIERSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare storage cost across all classes
    Estimate {
        /// Data size in GB
        #[arg(short, long)]
        size: f64,

        /// Storage duration in months
        #[arg(short, long)]
        months: f64,
    },

    /// Show storage and retrieval prices per class
    Tiers,

    /// Run a command session (interactive by default)
    Session {
        /// Read commands from a file instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Seed for random file selection on `retrieve`
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiersim_engine=warn,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };

    let command = cli.command.unwrap_or(Commands::Session {
        script: None,
        seed: None,
    });

    if cli.json {
        dispatch(command, &config, JsonPresenter::new(std::io::stdout())).await
    } else {
        dispatch(command, &config, TerminalPresenter::new(std::io::stdout())).await
    }
}

async fn dispatch<P: Presenter>(command: Commands, config: &SimConfig, mut presenter: P) -> Result<()> {
    match command {
        Commands::Estimate { size, months } => {
            let estimate = config.prices.estimate(size, months)?;
            presenter.estimate(&estimate);
            Ok(())
        }
        Commands::Tiers => {
            presenter.prices(&config.prices);
            Ok(())
        }
        Commands::Session { script, seed } => {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let sim = config.build_simulator();

            match script {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Failed to open script {}", path.display()))?;
                    info!(script = %path.display(), "Running scripted session");
                    run_session(sim, presenter, rng, BufReader::new(file)).await
                }
                None => {
                    presenter.notice("tiersim session started. Type 'help' for commands.");
                    run_session(sim, presenter, rng, BufReader::new(tokio::io::stdin())).await
                }
            }
        }
    }
}

async fn run_session<P, R>(sim: Simulator, presenter: P, rng: StdRng, input: R) -> Result<()>
where
    P: Presenter,
    R: AsyncBufRead + Unpin,
{
    let mut session = Session::new(sim, presenter, rng);
    session.run(input).await.context("Session input failed")?;
    Ok(())
}
