use std::path::Path;

use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use log::{info, warn};

use super::{Dataset, DatasetError, InMemoryDataset, OnDiskDataset};
use crate::columns::{ColumnGroups, ColumnOverrides};
use crate::scan::{MissingValueScanner, ScanConfig, ScanOutcome};
use crate::source::{open_source, ChunkedTableSource, InMemoryTable};

/// Builds [`Dataset`]s: classify columns, screen features, freeze.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    overrides: ColumnOverrides,
    scan: ScanConfig,
    type_inference_rows: Option<usize>,
}

impl DatasetBuilder {
    /// Builder with no overrides and default scan tunables
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit column names for the optional column slots
    pub fn with_overrides(mut self, overrides: ColumnOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Set the missing-value scan tunables
    pub fn with_scan_config(mut self, config: ScanConfig) -> Self {
        self.scan = config;
        self
    }

    /// Bound the number of PIN rows used for type inference
    pub fn with_type_inference_rows(mut self, rows: Option<usize>) -> Self {
        self.type_inference_rows = rows;
        self
    }

    /// Read several tables, one dataset per path, in input order
    pub fn read_pin<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Dataset>, DatasetError> {
        paths.iter().map(|path| self.from_path(path)).collect()
    }

    /// Read one PIN or Parquet file
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, DatasetError> {
        info!("Reading {}...", path.as_ref().display());
        let source = open_source(path, self.type_inference_rows)?;
        self.from_source(source)
    }

    /// Build an on-disk dataset over an opened source
    pub fn from_source(&self, source: Box<dyn ChunkedTableSource>) -> Result<Dataset, DatasetError> {
        let mut columns = ColumnGroups::infer(source.column_names().as_slice(), &self.overrides)?;
        drop_non_numeric(&mut columns, &source.schema())?;
        let outcome = self.scan(source.as_ref(), &columns)?;
        self.screen(&mut columns, &outcome.missing_features)?;

        Ok(Dataset::OnDisk(OnDiskDataset {
            source,
            columns,
            identity_table: outcome.identity_table,
        }))
    }

    /// Build an in-memory dataset from a resident table
    pub fn from_table(&self, table: RecordBatch) -> Result<Dataset, DatasetError> {
        let names: Vec<String> = table
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        let mut columns = ColumnGroups::infer(names.as_slice(), &self.overrides)?;
        drop_non_numeric(&mut columns, &table.schema())?;
        let source = InMemoryTable::new(table);
        // labels are validated here even though the identity table is not kept
        let outcome = self.scan(&source, &columns)?;
        self.screen(&mut columns, &outcome.missing_features)?;

        Ok(Dataset::InMemory(InMemoryDataset {
            table: source.into_batch(),
            columns,
        }))
    }

    fn scan(
        &self,
        source: &dyn ChunkedTableSource,
        columns: &ColumnGroups,
    ) -> Result<ScanOutcome, DatasetError> {
        MissingValueScanner::new(self.scan.clone()).scan(
            source,
            columns.feature_columns(),
            &columns.identity_columns(),
            columns.target_column(),
        )
    }

    /// Drop features with missing values and log the final feature list.
    fn screen(&self, columns: &mut ColumnGroups, missing: &[String]) -> Result<(), DatasetError> {
        for feature in missing {
            warn!("Missing values detected in feature column '{feature}'; dropping it");
        }

        let keep: Vec<String> = columns
            .feature_columns()
            .iter()
            .filter(|f| !missing.contains(*f))
            .cloned()
            .collect();
        if keep.is_empty() {
            return Err(DatasetError::EmptyFeatureSet);
        }
        columns.update_feature_columns(keep.as_slice())?;

        info!("Using {} features:", keep.len());
        for line in columns.feature_listing() {
            info!("{line}");
        }
        info!("Inferred column grouping:\n{columns}");
        Ok(())
    }
}

/// Features must cast to `Float64`; text columns are dropped before scanning.
fn drop_non_numeric(columns: &mut ColumnGroups, schema: &Schema) -> Result<(), DatasetError> {
    let mut keep = Vec::with_capacity(columns.feature_columns().len());
    for feature in columns.feature_columns() {
        let data_type = schema
            .field_with_name(feature)
            .map(|field| field.data_type().clone())?;
        if data_type.is_numeric() || data_type == DataType::Boolean {
            keep.push(feature.clone());
        } else {
            warn!("Feature column '{feature}' has non-numeric type {data_type}; dropping it");
        }
    }
    if keep.is_empty() {
        return Err(DatasetError::EmptyFeatureSet);
    }
    if keep.len() < columns.feature_columns().len() {
        columns.update_feature_columns(keep.as_slice())?;
    }
    Ok(())
}
