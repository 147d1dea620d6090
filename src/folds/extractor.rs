use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, UInt32Array};
use arrow::compute::{cast_with_options, concat_batches, take_record_batch, CastOptions};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use log::{debug, info, warn};
use rayon::prelude::*;

use super::{FoldError, FoldIndexAssignment};
use crate::dataset::Dataset;
use crate::labels::recode_labels;
use crate::pool::{build_pool, default_workers};
use crate::source::{check_chunk_size, TableChunk};

/// Tunables for fold extraction. They never change the result.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Maximum number of rows per chunk read from on-disk datasets
    pub rows_per_chunk: usize,
    /// Maximum number of concurrent chunk and reassembly units
    pub max_workers: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            rows_per_chunk: 100_000,
            max_workers: default_workers(),
        }
    }
}

/// Requested rows that no chunk of their dataset contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIntegrityWarning {
    /// Fold number
    pub fold: usize,
    /// Dataset position
    pub dataset: usize,
    /// Requested row indices that were not found, ascending
    pub missing_indices: Vec<u64>,
}

impl fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fold {}, dataset {}: {} requested rows not found (first missing: {})",
            self.fold,
            self.dataset,
            self.missing_indices.len(),
            self.missing_indices.first().copied().unwrap_or_default()
        )
    }
}

/// One table per fold, plus the integrity warnings raised while building them
#[derive(Debug, Clone)]
pub struct FoldExtractionResult {
    /// Fold tables: feature columns as `Float64` and the recoded label
    pub folds: Vec<RecordBatch>,
    /// Warnings ordered by fold, then dataset
    pub warnings: Vec<DataIntegrityWarning>,
}

impl FoldExtractionResult {
    /// Number of folds
    pub fn num_folds(&self) -> usize {
        self.folds.len()
    }

    /// Table of `fold`
    pub fn fold(&self, fold: usize) -> Option<&RecordBatch> {
        self.folds.get(fold)
    }

    /// Whether every requested row was found
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Rows of one chunk that belong to one fold
#[derive(Debug)]
struct FoldPiece {
    /// Positions in the fold's sorted index list covered by this chunk
    first_request: usize,
    rows: RecordBatch,
}

/// Per-fold rows gathered from one chunk, keyed by the chunk's first row
#[derive(Debug)]
struct ChunkBuckets {
    first_row: usize,
    pieces: Vec<Option<FoldPiece>>,
}

/// What to read from one dataset and how to shape it
struct DatasetPlan {
    columns: Vec<String>,
    target_column: String,
}

/// Parallel extraction of per-fold training tables
#[derive(Debug, Clone, Default)]
pub struct FoldExtractor {
    config: ExtractorConfig,
}

impl FoldExtractor {
    /// Create an extractor with the given tunables
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// The extractor's tunables
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Build one table per fold from `datasets`.
    ///
    /// Fold `f` is the concatenation, in dataset order, of the rows that
    /// `assignment` lists for `f`, each dataset's rows in ascending index
    /// order. A requested row that the dataset does not have comes out as an
    /// all-null row and is reported in [`FoldExtractionResult::warnings`].
    pub fn extract(
        &self,
        datasets: &[Dataset],
        assignment: &FoldIndexAssignment,
    ) -> Result<FoldExtractionResult, FoldError> {
        if assignment.num_folds() == 0 {
            return Ok(FoldExtractionResult {
                folds: Vec::new(),
                warnings: Vec::new(),
            });
        }
        if assignment.num_datasets() != datasets.len() {
            return Err(FoldError::DatasetCountMismatch {
                expected: assignment.num_datasets(),
                found: datasets.len(),
            });
        }
        check_chunk_size(self.config.rows_per_chunk)?;

        let (schema, plans) = plan(datasets)?;
        let num_folds = assignment.num_folds();

        let pool = build_pool(self.config.max_workers)
            .map_err(|e| FoldError::ThreadPool(e.to_string()))?;

        let buckets: Vec<Vec<ChunkBuckets>> = pool.install(|| {
            datasets
                .par_iter()
                .zip(plans.par_iter())
                .enumerate()
                .map(|(d, (dataset, plan))| {
                    self.bucket_dataset(d, dataset, plan, &schema, assignment)
                })
                .collect::<Result<Vec<_>, FoldError>>()
        })?;

        let pairs: Vec<(usize, usize)> = (0..num_folds)
            .flat_map(|f| (0..datasets.len()).map(move |d| (f, d)))
            .collect();
        let reindexed: Vec<(RecordBatch, Option<DataIntegrityWarning>)> = pool.install(|| {
            pairs
                .par_iter()
                .map(|&(f, d)| reassemble(f, d, &buckets[d], assignment.indices(f, d), &schema))
                .collect::<Result<Vec<_>, FoldError>>()
        })?;

        let mut folds = Vec::with_capacity(num_folds);
        let mut warnings = Vec::new();
        for per_dataset in reindexed.chunks(datasets.len().max(1)) {
            let tables = per_dataset.iter().map(|(table, _)| table);
            folds.push(concat_batches(&schema, tables)?);
            warnings.extend(per_dataset.iter().filter_map(|(_, w)| w.clone()));
        }
        // folds without datasets
        folds.resize_with(num_folds, || RecordBatch::new_empty(schema.clone()));

        for warning in &warnings {
            warn!("Data integrity: {warning}");
        }
        info!(
            "Extracted {} folds ({} rows)",
            folds.len(),
            folds.iter().map(RecordBatch::num_rows).sum::<usize>()
        );

        Ok(FoldExtractionResult { folds, warnings })
    }

    /// Read one dataset chunk by chunk and bucket each chunk's rows by fold.
    fn bucket_dataset(
        &self,
        d: usize,
        dataset: &Dataset,
        plan: &DatasetPlan,
        schema: &SchemaRef,
        assignment: &FoldIndexAssignment,
    ) -> Result<Vec<ChunkBuckets>, FoldError> {
        let chunks = dataset.chunks(&plan.columns, self.config.rows_per_chunk)?;
        let buckets = chunks
            .par_bridge()
            .map(|chunk| -> Result<ChunkBuckets, FoldError> {
                let chunk = chunk?;
                let batch = normalize(&chunk, &plan.target_column, schema)?;
                let pieces = (0..assignment.num_folds())
                    .map(|f| select(&chunk, &batch, assignment.indices(f, d)))
                    .collect::<Result<Vec<_>, FoldError>>()?;
                debug!("Dataset {d}: bucketed rows {:?}", chunk.row_indices());
                Ok(ChunkBuckets {
                    first_row: chunk.first_row(),
                    pieces,
                })
            })
            .collect::<Result<Vec<_>, FoldError>>()?;
        Ok(buckets)
    }
}

/// Output schema and per-dataset read plans; feature names follow dataset 0.
fn plan(datasets: &[Dataset]) -> Result<(SchemaRef, Vec<DatasetPlan>), FoldError> {
    let Some(first) = datasets.first() else {
        return Ok((Arc::new(Schema::empty()), Vec::new()));
    };
    let features = first.columns().feature_columns().to_vec();
    let expected: HashSet<&str> = features.iter().map(String::as_str).collect();

    let mut plans = Vec::with_capacity(datasets.len());
    for (d, dataset) in datasets.iter().enumerate() {
        let own = dataset.columns().feature_columns();
        let same = own.len() == features.len() && own.iter().all(|f| expected.contains(f.as_str()));
        if !same {
            return Err(FoldError::FeatureMismatch { dataset: d });
        }
        let target_column = dataset.columns().target_column().to_string();
        let mut columns = features.clone();
        columns.push(target_column.clone());
        plans.push(DatasetPlan {
            columns,
            target_column,
        });
    }

    let mut fields: Vec<Field> = features
        .iter()
        .map(|name| Field::new(name, DataType::Float64, true))
        .collect();
    fields.push(Field::new(
        first.columns().target_column(),
        DataType::Boolean,
        true,
    ));
    Ok((Arc::new(Schema::new(fields)), plans))
}

/// Recode labels and cast features so every chunk matches the output schema.
fn normalize(
    chunk: &TableChunk,
    target_column: &str,
    schema: &SchemaRef,
) -> Result<RecordBatch, FoldError> {
    let recoded = recode_labels(chunk.batch(), target_column, chunk.first_row())?;
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    let columns = recoded
        .columns()
        .iter()
        .zip(schema.fields())
        .map(|(column, field)| cast_with_options(column, field.data_type(), &options))
        .collect::<Result<Vec<ArrayRef>, _>>()?;
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

/// Rows of `batch` whose original index is in the sorted `requested` list.
fn select(
    chunk: &TableChunk,
    batch: &RecordBatch,
    requested: &[u64],
) -> Result<Option<FoldPiece>, FoldError> {
    let rows = chunk.row_indices();
    let lo = requested.partition_point(|&i| i < rows.start);
    let hi = requested.partition_point(|&i| i < rows.end);
    if lo == hi {
        return Ok(None);
    }
    let positions = UInt32Array::from_iter_values(
        requested[lo..hi].iter().map(|&i| (i - rows.start) as u32),
    );
    Ok(Some(FoldPiece {
        first_request: lo,
        rows: take_record_batch(batch, &positions)?,
    }))
}

/// Concatenate one (fold, dataset) buffer and reorder it to `requested`.
fn reassemble(
    fold: usize,
    dataset: usize,
    buckets: &[ChunkBuckets],
    requested: &[u64],
    schema: &SchemaRef,
) -> Result<(RecordBatch, Option<DataIntegrityWarning>), FoldError> {
    let mut pieces: Vec<(usize, &FoldPiece)> = buckets
        .iter()
        .filter_map(|bucket| bucket.pieces[fold].as_ref().map(|p| (bucket.first_row, p)))
        .collect();
    pieces.sort_by_key(|(first_row, _)| *first_row);

    let mut positions: Vec<Option<u32>> = vec![None; requested.len()];
    let mut offset = 0usize;
    for (_, piece) in &pieces {
        let count = piece.rows.num_rows();
        for (k, slot) in positions[piece.first_request..piece.first_request + count]
            .iter_mut()
            .enumerate()
        {
            *slot = Some((offset + k) as u32);
        }
        offset += count;
    }

    let missing_indices: Vec<u64> = requested
        .iter()
        .zip(&positions)
        .filter(|(_, position)| position.is_none())
        .map(|(&index, _)| index)
        .collect();
    let warning = (!missing_indices.is_empty()).then(|| DataIntegrityWarning {
        fold,
        dataset,
        missing_indices,
    });

    let table = if pieces.is_empty() {
        let columns = schema
            .fields()
            .iter()
            .map(|field| new_null_array(field.data_type(), requested.len()))
            .collect();
        RecordBatch::try_new(schema.clone(), columns)?
    } else {
        let buffer = concat_batches(schema, pieces.iter().map(|(_, p)| &p.rows))?;
        take_record_batch(&buffer, &UInt32Array::from(positions))?
    };
    Ok((table, warning))
}
