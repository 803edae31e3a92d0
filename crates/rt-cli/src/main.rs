//! RT CLI - replays trust-management policy scripts
//!
//! `rt run` loads credentials and runs the queries a script lists, printing
//! each step's cost and each query's solutions. `rt check` only parses and
//! validates the script.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rt_engine::RtEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod output;
mod runner;
mod script;

use script::Script;

/// RT CLI application
#[derive(Parser)]
#[command(name = "rt")]
#[command(about = "RT - role-based trust management policy runner", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Replay a policy script against a fresh engine
    Run {
        /// Policy script (TOML)
        script: PathBuf,

        /// Engine configuration file
        #[arg(short, long, env = "RT_CONFIG")]
        config: Option<PathBuf>,

        /// Print step reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a policy script without running it
    Check {
        /// Policy script (TOML)
        script: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            script,
            config,
            json,
        } => {
            let config = config::load(config.as_deref())?;
            let script = Script::load(&script)?;
            script.validate()?;

            let mut engine = RtEngine::new(config);
            let reports = runner::run(&script, &mut engine)?;
            if json {
                output::print_json(&reports)?;
            } else {
                output::print_reports(&reports);
            }
        }
        Commands::Check { script } => {
            let parsed = Script::load(&script)?;
            parsed.validate()?;
            output::print_success(&format!(
                "{}: {} steps",
                script.display(),
                parsed.steps.len()
            ));
        }
    }

    Ok(())
}
