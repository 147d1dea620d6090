use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod config;
mod extract;
mod inspect;

pub use config::PinfoldConfig;

/// pinfold - Chunked PSM table ingestion and cross-validation fold extraction
#[derive(Parser)]
#[command(name = "pinfold")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify columns and screen features of PIN or Parquet tables
    Inspect {
        /// Input tables
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Split datasets into per-fold tables following a JSON fold assignment
    Extract {
        /// JSON file holding fold -> dataset -> row indices
        #[arg(value_name = "ASSIGNMENT")]
        assignment: PathBuf,

        /// Input tables, in the dataset order of the assignment
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },
}

impl Cli {
    /// Number of `-v` flags given
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Run the selected subcommand.
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        match self.command {
            Commands::Inspect { inputs } => inspect::run(&inputs, &config),
            Commands::Extract { assignment, inputs } => {
                extract::run(&assignment, &inputs, &config)
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PinfoldConfig> {
    match path {
        Some(path) => PinfoldConfig::from_file(path),
        None => Ok(PinfoldConfig::default()),
    }
}

/// Default log filter for a `-v` count
fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialize `env_logger`; `RUST_LOG` overrides the verbosity default.
pub fn init_logging(verbosity: u8) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level(verbosity)))
        .init();
}
