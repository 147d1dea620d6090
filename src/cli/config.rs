//! TOML configuration file support.
//!
//! Tunables and column overrides can be kept in a config file instead of
//! being repeated on every run:
//!
//! ```toml
//! # pinfold.toml
//! [ingest]
//! max_features_per_group = 25
//! rows_per_chunk = 100000
//! max_workers = 8
//! type_inference_rows = 10000
//!
//! [columns]
//! ret_time = "retentiontime"
//! ignore = ["rank"]
//!
//! [folds]
//! rows_per_chunk = 50000
//! ```

use anyhow::{bail, Context, Result};
use pinfold::columns::ColumnOverrides;
use pinfold::dataset::DatasetBuilder;
use pinfold::folds::ExtractorConfig;
use pinfold::scan::ScanConfig;
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for pinfold.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct PinfoldConfig {
    /// Ingestion and missing-value scan settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Explicit column names.
    #[serde(default)]
    pub columns: ColumnOverrides,

    /// Fold extraction settings.
    #[serde(default)]
    pub folds: FoldsConfig,
}

/// Configuration for dataset ingestion.
#[derive(Debug, Default, Deserialize)]
pub struct IngestConfig {
    /// Feature columns read per scan pass.
    pub max_features_per_group: Option<usize>,

    /// Rows per chunk during the scan.
    pub rows_per_chunk: Option<usize>,

    /// Concurrent column-group scans.
    pub max_workers: Option<usize>,

    /// PIN rows used to infer column types (all rows when omitted).
    pub type_inference_rows: Option<usize>,
}

/// Configuration for fold extraction.
#[derive(Debug, Default, Deserialize)]
pub struct FoldsConfig {
    /// Rows per chunk when re-reading datasets.
    pub rows_per_chunk: Option<usize>,

    /// Concurrent extraction units.
    pub max_workers: Option<usize>,
}

impl PinfoldConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let sizes = [
            ("ingest.max_features_per_group", self.ingest.max_features_per_group),
            ("ingest.rows_per_chunk", self.ingest.rows_per_chunk),
            ("ingest.max_workers", self.ingest.max_workers),
            ("folds.rows_per_chunk", self.folds.rows_per_chunk),
            ("folds.max_workers", self.folds.max_workers),
        ];
        for (key, value) in sizes {
            if value == Some(0) {
                bail!("{key} must be positive");
            }
        }
        Ok(())
    }

    /// Scan tunables, defaults filled in.
    pub fn scan_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            max_features_per_group: self
                .ingest
                .max_features_per_group
                .unwrap_or(defaults.max_features_per_group),
            rows_per_chunk: self.ingest.rows_per_chunk.unwrap_or(defaults.rows_per_chunk),
            max_workers: self.ingest.max_workers.unwrap_or(defaults.max_workers),
        }
    }

    /// Extraction tunables, defaults filled in.
    pub fn extractor_config(&self) -> ExtractorConfig {
        let defaults = ExtractorConfig::default();
        ExtractorConfig {
            rows_per_chunk: self.folds.rows_per_chunk.unwrap_or(defaults.rows_per_chunk),
            max_workers: self.folds.max_workers.unwrap_or(defaults.max_workers),
        }
    }

    /// Dataset builder carrying the column overrides and scan tunables.
    pub fn dataset_builder(&self) -> DatasetBuilder {
        DatasetBuilder::new()
            .with_overrides(self.columns.clone())
            .with_scan_config(self.scan_config())
            .with_type_inference_rows(self.ingest.type_inference_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [ingest]
            max_features_per_group = 10
            rows_per_chunk = 5000
            max_workers = 2
            type_inference_rows = 100

            [columns]
            ret_time = "retentiontime"
            charge = "z"
            ignore = ["rank", "hits"]

            [folds]
            rows_per_chunk = 2000
        "#;

        let config = PinfoldConfig::from_str(toml).unwrap();
        assert_eq!(config.ingest.max_features_per_group, Some(10));
        assert_eq!(config.ingest.type_inference_rows, Some(100));
        assert_eq!(config.columns.ret_time.as_deref(), Some("retentiontime"));
        assert_eq!(config.columns.charge.as_deref(), Some("z"));
        assert_eq!(config.columns.ignore, vec!["rank", "hits"]);

        let scan = config.scan_config();
        assert_eq!(scan.max_features_per_group, 10);
        assert_eq!(scan.rows_per_chunk, 5000);
        assert_eq!(scan.max_workers, 2);

        let folds = config.extractor_config();
        assert_eq!(folds.rows_per_chunk, 2000);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [folds]
            max_workers = 3
        "#;

        let config = PinfoldConfig::from_str(toml).unwrap();
        assert_eq!(config.folds.max_workers, Some(3));
        assert_eq!(config.scan_config().max_features_per_group, 25);
        assert_eq!(config.extractor_config().rows_per_chunk, 100_000);
        assert!(config.columns.filename.is_none());
    }

    #[test]
    fn test_empty_config() {
        let config = PinfoldConfig::from_str("").unwrap();
        assert_eq!(config.ingest.rows_per_chunk, None);
        assert!(config.columns.ignore.is_empty());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(PinfoldConfig::from_str("[ingest]\nrows_per_chunk = 0\n").is_err());
        assert!(PinfoldConfig::from_str("[folds]\nmax_workers = 0\n").is_err());
    }

    #[test]
    fn test_unknown_section_value_type() {
        assert!(PinfoldConfig::from_str("[ingest]\nrows_per_chunk = \"many\"\n").is_err());
    }
}
