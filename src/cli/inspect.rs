use anyhow::{Context, Result};
use std::path::PathBuf;

use super::PinfoldConfig;

/// Classify and screen each input, then print what was found
pub fn run(inputs: &[PathBuf], config: &PinfoldConfig) -> Result<()> {
    let builder = config.dataset_builder();

    for input in inputs {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
        let dataset = builder
            .from_path(input)
            .with_context(|| format!("Failed to ingest {}", input.display()))?;
        let columns = dataset.columns();

        println!("{}", input.display());
        println!("{}", "=".repeat(input.display().to_string().len()));
        match dataset.row_count() {
            Some(rows) => println!("Rows: {rows}"),
            None => println!("Rows: unknown"),
        }
        println!();
        println!("{columns}");
        println!("Features ({}):", columns.feature_columns().len());
        for line in columns.feature_listing() {
            println!("{line}");
        }
        if let Some(identity) = dataset.identity_table() {
            println!();
            println!(
                "Identity table: {} rows x {} columns",
                identity.num_rows(),
                identity.num_columns()
            );
        }
        println!();
    }

    Ok(())
}
