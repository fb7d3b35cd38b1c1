//! MedAlign CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write a default config file
//! - `check`    — Verify config and benchmark data layout
//! - `tokens`   — Count tokens in a file with the fast and target tokenizers
//! - `prepare`  — Build token-budgeted prompts and join gold responses

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "medalign",
    about = "MedAlign — token-budgeted EHR prompts for clinical QA evaluation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.medalign/config.toml)
    #[arg(short, long, global = true, env = "MEDALIGN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Verify configuration and data layout
    Check,

    /// Count tokens in a file
    Tokens {
        /// File to measure
        file: PathBuf,

        /// Target tokenizer (overrides config)
        #[arg(short, long)]
        tokenizer: Option<String>,
    },

    /// Build evaluation rows from instructions, EHRs, and gold responses
    Prepare(commands::prepare::PrepareArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for data output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(commands::default_config_path);

    match cli.command {
        Commands::Init { force } => commands::init::run(&config_path, force)?,
        Commands::Check => commands::check::run(&config_path)?,
        Commands::Tokens { file, tokenizer } => {
            commands::tokens::run(&config_path, &file, tokenizer)?
        }
        Commands::Prepare(args) => commands::prepare::run(&config_path, args)?,
    }

    Ok(())
}
