use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use pinfold::folds::{FoldExtractor, FoldIndexAssignment};

use super::PinfoldConfig;

/// Build datasets, extract the folds and report their sizes
pub fn run(assignment: &Path, inputs: &[PathBuf], config: &PinfoldConfig) -> Result<()> {
    let start = Instant::now();

    let file = File::open(assignment)
        .with_context(|| format!("Failed to open fold assignment: {}", assignment.display()))?;
    let assignment = FoldIndexAssignment::from_json_reader(BufReader::new(file))
        .context("Invalid fold assignment")?;

    let datasets = config
        .dataset_builder()
        .read_pin(inputs)
        .context("Failed to ingest input tables")?;
    info!("Ingested {} datasets in {:.2?}", datasets.len(), start.elapsed());

    let result = FoldExtractor::new(config.extractor_config())
        .extract(&datasets, &assignment)
        .context("Fold extraction failed")?;

    println!("Fold Extraction");
    println!("===============");
    for (fold, table) in result.folds.iter().enumerate() {
        println!(
            "  Fold {fold}: {} rows x {} columns",
            table.num_rows(),
            table.num_columns()
        );
    }
    if !result.is_complete() {
        println!();
        println!("Data integrity warnings:");
        for warning in &result.warnings {
            println!("  {warning}");
        }
    }
    println!();
    println!("Done in {:.2?}", start.elapsed());

    Ok(())
}
