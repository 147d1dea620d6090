//! # Missing-Value Screening
//!
//! Flags feature columns that contain at least one missing value anywhere in
//! a table, without holding the table in memory, and materializes the
//! identity table (spectrum key + recoded label) on the way.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌────────────────────────┐
//! features ─chunk──▶ │ group 0  (+ identity)  │──▶ flags, identity chunks
//!                    │ group 1  (+ identity)  │──▶ flags
//!                    │ group N  (+ identity)  │──▶ flags
//!                    └────────────────────────┘
//!                      one pass per group, in parallel
//!                                  │
//!                                  ▼
//!                    merge by group id / first row
//! ```
//!
//! Each group scans the source once, chunk by chunk, reading its feature
//! columns plus the identity columns. Only group 0 keeps the identity columns;
//! every group drops them before testing for missing values. Each worker owns
//! its partial result, and results are merged in group-id and row order.


use arrow::array::{Array, Float32Array, Float64Array};
use arrow::compute::concat_batches;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;
use rayon::prelude::*;

use crate::dataset::DatasetError;
use crate::labels::{recode_labels, recoded_schema};
use crate::pool::{build_pool, default_workers};
use crate::source::{check_chunk_size, project_schema, ChunkedTableSource, SourceError};

/// Tunables for the missing-value scan. They never change the result.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of feature columns read per pass
    pub max_features_per_group: usize,
    /// Maximum number of rows per chunk
    pub rows_per_chunk: usize,
    /// Maximum number of concurrent group scans
    pub max_workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_features_per_group: 25,
            rows_per_chunk: 100_000,
            max_workers: default_workers(),
        }
    }
}

/// Result of screening one table
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Feature columns with at least one missing value, in feature order
    pub missing_features: Vec<String>,
    /// Spectrum key columns and the recoded label, in source row order
    pub identity_table: RecordBatch,
}

/// A batch of feature columns scanned in one pass
#[derive(Debug, Clone)]
struct ColumnGroup {
    id: usize,
    features: Vec<String>,
    collect_identity: bool,
}

impl ColumnGroup {
    fn new(id: usize, features: Vec<String>) -> Result<Self, DatasetError> {
        if features.is_empty() {
            return Err(DatasetError::EmptyColumnGroup(id));
        }
        Ok(Self {
            id,
            features,
            collect_identity: id == 0,
        })
    }

    /// A pass that only reads the identity columns, for tables without features
    fn identity_only() -> Self {
        Self {
            id: 0,
            features: Vec::new(),
            collect_identity: true,
        }
    }
}

/// Partial result owned by one group worker
#[derive(Debug)]
struct GroupScan {
    id: usize,
    has_missing: Vec<bool>,
    identity_chunks: Vec<(usize, RecordBatch)>,
}

/// Whether a column holds a null or a floating-point NaN
pub fn column_has_missing(column: &dyn Array) -> bool {
    if column.null_count() > 0 {
        return true;
    }
    match column.data_type() {
        DataType::Float64 => column
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.values().iter().any(|v| v.is_nan()))
            .unwrap_or(false),
        DataType::Float32 => column
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.values().iter().any(|v| v.is_nan()))
            .unwrap_or(false),
        _ => false,
    }
}

/// Chunked, parallel missing-value screening
#[derive(Debug, Clone, Default)]
pub struct MissingValueScanner {
    config: ScanConfig,
}

impl MissingValueScanner {
    /// Create a scanner with the given tunables
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// The scanner's tunables
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn partition(&self, features: &[String]) -> Result<Vec<ColumnGroup>, DatasetError> {
        if features.is_empty() {
            return Ok(vec![ColumnGroup::identity_only()]);
        }
        features
            .chunks(self.config.max_features_per_group)
            .enumerate()
            .map(|(id, names)| ColumnGroup::new(id, names.to_vec()))
            .collect()
    }

    /// Screen `features` for missing values and build the identity table.
    ///
    /// `identity` lists the spectrum key columns followed by `target_column`.
    pub fn scan(
        &self,
        source: &dyn ChunkedTableSource,
        features: &[String],
        identity: &[String],
        target_column: &str,
    ) -> Result<ScanOutcome, DatasetError> {
        if self.config.max_features_per_group == 0 {
            return Err(SourceError::InvalidChunkSize.into());
        }
        check_chunk_size(self.config.rows_per_chunk)?;

        let (_, identity_schema) = project_schema(&source.schema(), identity)?;
        let identity_schema = recoded_schema(&identity_schema, target_column);

        let groups = self.partition(features)?;
        debug!(
            "Scanning {} for missing values: {} features in {} groups",
            source.describe(),
            features.len(),
            groups.len()
        );

        let pool = build_pool(self.config.max_workers)
            .map_err(|e| DatasetError::ThreadPool(e.to_string()))?;
        let mut scans: Vec<GroupScan> = pool.install(|| {
            groups
                .par_iter()
                .map(|group| self.scan_group(source, group, identity, target_column))
                .collect::<Result<Vec<_>, _>>()
        })?;
        scans.sort_by_key(|scan| scan.id);

        let mut missing_features = Vec::new();
        let mut identity_chunks = Vec::new();
        for (group, scan) in groups.iter().zip(scans) {
            missing_features.extend(
                group
                    .features
                    .iter()
                    .zip(&scan.has_missing)
                    .filter(|(_, missing)| **missing)
                    .map(|(name, _)| name.clone()),
            );
            identity_chunks.extend(scan.identity_chunks);
        }

        identity_chunks.sort_by_key(|(first_row, _)| *first_row);
        let identity_table = match identity_chunks.first() {
            Some((_, first)) => {
                let schema = first.schema();
                concat_batches(&schema, identity_chunks.iter().map(|(_, batch)| batch))?
            }
            None => RecordBatch::new_empty(identity_schema),
        };

        Ok(ScanOutcome {
            missing_features,
            identity_table,
        })
    }

    fn scan_group(
        &self,
        source: &dyn ChunkedTableSource,
        group: &ColumnGroup,
        identity: &[String],
        target_column: &str,
    ) -> Result<GroupScan, DatasetError> {
        let n_features = group.features.len();
        let mut columns = group.features.clone();
        columns.extend(identity.iter().cloned());
        let identity_positions: Vec<usize> = (n_features..columns.len()).collect();

        let mut has_missing = vec![false; n_features];
        let mut identity_chunks = Vec::new();
        let mut rows = 0usize;

        for chunk in source.chunks(&columns, self.config.rows_per_chunk)? {
            let chunk = chunk?;
            let batch = chunk.batch();
            rows += batch.num_rows();

            if group.collect_identity {
                let identity_batch = batch.project(&identity_positions)?;
                let identity_batch =
                    recode_labels(&identity_batch, target_column, chunk.first_row())?;
                identity_chunks.push((chunk.first_row(), identity_batch));
            }

            for (flag, column) in has_missing.iter_mut().zip(batch.columns()) {
                *flag = *flag || column_has_missing(column.as_ref());
            }
        }

        debug!(
            "Column group {}: {} rows, {} of {} features with missing values",
            group.id,
            rows,
            has_missing.iter().filter(|m| **m).count(),
            n_features
        );

        Ok(GroupScan {
            id: group.id,
            has_missing,
            identity_chunks,
        })
    }
}
