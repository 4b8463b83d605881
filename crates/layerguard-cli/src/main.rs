//! layerguard CLI tool.
//!
//! Usage:
//! ```bash
//! layerguard check [OPTIONS] [PATH]
//! layerguard init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Layered-architecture dependency checker for Go modules
#[derive(Parser)]
#[command(name = "layerguard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LAYERGUARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check imports against the layer order
    ///
    /// Exits with 1 when any file violates the order or cannot be read,
    /// and with 2 on configuration errors.
    Check {
        /// File or directory to check (default: `target` from config, else ".")
        path: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Additional ignore entries (can be specified multiple times)
        #[arg(short, long)]
        ignore: Vec<String>,

        /// Also report verified files and ignored entries
        #[arg(long)]
        verbose_results: bool,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-result compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            ignore,
            verbose_results,
        } => {
            let start = path.clone().unwrap_or_else(|| PathBuf::from("."));
            let source = config_resolver::resolve(&start, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                path,
                format,
                ignore,
                verbose_results,
            };
            match commands::check::run(&source, &options) {
                Ok(report) => match commands::check::exit_code(&report) {
                    0 => Ok(()),
                    code => std::process::exit(code),
                },
                Err(e) => {
                    eprintln!("{}", commands::check::render_error(e));
                    std::process::exit(2);
                }
            }
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
