//! # pinfold
//!
//! A command-line tool for ingesting Percolator input (PIN) tables and
//! splitting them into cross-validation fold tables.
//!
//! ## Usage
//!
//! ```bash
//! # Show column roles and surviving features
//! pinfold inspect run1.pin run2.pin
//!
//! # Extract fold tables following a JSON assignment
//! pinfold -v extract folds.json run1.pin run2.pin
//!
//! # Use tunables from a config file
//! pinfold --config pinfold.toml extract folds.json run1.pin
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    cli.run()
}
