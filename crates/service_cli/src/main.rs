//! Heston CLI - Monte Carlo pricing of European options under stochastic volatility
//!
//! # Commands
//!
//! - `heston-mc price` - Run the scenario pricer and print the estimate
//! - `heston-mc check` - Validate the configuration without simulating
//!
//! # Configuration
//!
//! Settings are resolved in order: `--config` file (or `heston.toml` when
//! present), `HESTON_*` environment variables, then command-line flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pricer_models::models::VarianceFloor;
use pricer_pricing::mc::PayoffType;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::price::PriceOverrides;
use config::PricingConfig;

/// Heston Monte Carlo Pricer CLI
#[derive(Parser)]
#[command(name = "heston-mc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a European option by Monte Carlo
    Price {
        /// Paths per scenario (m)
        #[arg(short = 'm', long)]
        paths: Option<usize>,

        /// Number of correlation scenarios (p)
        #[arg(short = 'p', long)]
        scenarios: Option<usize>,

        /// Time steps per path (n)
        #[arg(short = 'n', long)]
        steps: Option<usize>,

        /// Master seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Strike price
        #[arg(short = 'k', long)]
        strike: Option<f64>,

        /// Variance floor (full_truncation, reflection, absorption)
        #[arg(long)]
        floor: Option<VarianceFloor>,

        /// Payoff type (call, put)
        #[arg(long)]
        payoff: Option<PayoffType>,

        /// Run on the calling thread only
        #[arg(long)]
        sequential: bool,

        /// Include raw payoffs and terminal prices in JSON output
        #[arg(long)]
        keep_samples: bool,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Check configuration without running a simulation
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PricingConfig::resolve(cli.config.as_deref())?;

    // Initialise tracing; RUST_LOG takes precedence over the configured level
    let default_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.effective_log_level()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    // Applied after the subscriber is up so rejected overrides are reported
    let config = config.with_env_override();

    match cli.command {
        Commands::Price {
            paths,
            scenarios,
            steps,
            seed,
            strike,
            floor,
            payoff,
            sequential,
            keep_samples,
            format,
        } => {
            let overrides = PriceOverrides {
                paths,
                scenarios,
                steps,
                seed,
                strike,
                floor,
                payoff,
                sequential,
                keep_samples,
            };
            commands::price::run(&overrides.apply(config), &format)
        }
        Commands::Check => commands::check::run(&config),
    }
}
