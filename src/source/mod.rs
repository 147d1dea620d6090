//! # Chunked Table Sources
//!
//! A [`ChunkedTableSource`] exposes a table that may be larger than memory as
//! a restartable sequence of row chunks restricted to a column subset. Every
//! call to [`ChunkedTableSource::chunks`] starts an independent pass with its
//! own file handle, so several passes can run concurrently over one source.
//!
//! Implementations:
//!
//! - [`TsvSource`]: Percolator input (PIN) tab-delimited files
//! - [`ParquetSource`]: Parquet files or in-memory Parquet buffers
//! - [`InMemoryTable`]: an Arrow `RecordBatch` already resident in memory
//!
//! ## Example
//!
//! ```rust,no_run
//! use pinfold::source::{ChunkedTableSource, TsvSource};
//!
//! let source = TsvSource::open("search.pin")?;
//! let columns = vec!["ScanNr".to_string(), "Label".to_string()];
//! for chunk in source.chunks(&columns, 10_000)? {
//!     let chunk = chunk?;
//!     println!("rows {:?}", chunk.row_indices());
//! }
//! # Ok::<(), pinfold::source::SourceError>(())
//! ```

mod error;
mod memory;
mod parquet_file;
mod tsv;
mod utils;

#[cfg(test)]
mod tests;

use std::ops::Range;
use std::path::Path;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

pub use parquet_file::ParquetSource;
pub use error::SourceError;
pub use memory::InMemoryTable;
pub use tsv::TsvSource;
pub use utils::{is_missing_marker, MISSING_MARKERS};

pub(crate) use utils::{check_chunk_size, project_schema};

/// A batch of rows read from a source, tagged with its position in the table
#[derive(Debug, Clone)]
pub struct TableChunk {
    first_row: usize,
    batch: RecordBatch,
}

impl TableChunk {
    /// Wrap a batch whose first row sits at `first_row` in the source table
    pub fn new(first_row: usize, batch: RecordBatch) -> Self {
        Self { first_row, batch }
    }

    /// Original index of the first row
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// Number of rows in the chunk
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Original index of every row in the chunk
    pub fn row_indices(&self) -> Range<u64> {
        let start = self.first_row as u64;
        start..start + self.batch.num_rows() as u64
    }

    /// The rows, restricted to the requested columns in requested order
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consume the chunk, returning the rows
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }
}

/// Lazy, memory-bounded sequence of chunks from one pass over a source
pub struct ChunkIterator {
    inner: Box<dyn Iterator<Item = Result<TableChunk, SourceError>> + Send>,
}

impl ChunkIterator {
    pub(crate) fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<TableChunk, SourceError>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    /// Number consecutive record batches by their running row offset
    pub(crate) fn from_batches<I, E>(batches: I) -> Self
    where
        I: Iterator<Item = Result<RecordBatch, E>> + Send + 'static,
        E: Into<SourceError>,
    {
        let mut next_row = 0usize;
        Self::new(batches.map(move |batch| {
            let batch = batch.map_err(Into::into)?;
            let chunk = TableChunk::new(next_row, batch);
            next_row += chunk.num_rows();
            Ok(chunk)
        }))
    }
}

impl Iterator for ChunkIterator {
    type Item = Result<TableChunk, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// A tabular file or in-memory table readable in bounded-size row chunks
pub trait ChunkedTableSource: Send + Sync {
    /// Arrow schema of the full table
    fn schema(&self) -> SchemaRef;

    /// Column names in table order
    fn column_names(&self) -> Vec<String> {
        self.schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    /// Total number of rows, if known without reading the table
    fn row_count(&self) -> Option<usize>;

    /// Start a new pass over the table.
    ///
    /// Chunks hold at most `chunk_size` rows, contain exactly `columns` in the
    /// order given, and arrive in table order.
    fn chunks(&self, columns: &[String], chunk_size: usize) -> Result<ChunkIterator, SourceError>;

    /// Short human-readable description for log messages
    fn describe(&self) -> String;
}

/// Open a table file, choosing the reader by extension.
///
/// `.parquet` and `.pq` files are read as Parquet, everything else as a PIN
/// tab-delimited file. `type_inference_rows` bounds how many PIN rows are
/// used to infer column types (`None` scans the whole file).
pub fn open_source<P: AsRef<Path>>(
    path: P,
    type_inference_rows: Option<usize>,
) -> Result<Box<dyn ChunkedTableSource>, SourceError> {
    let path = path.as_ref();
    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "parquet" | "pq"))
        .unwrap_or(false);

    if is_parquet {
        Ok(Box::new(ParquetSource::open(path)?))
    } else {
        Ok(Box::new(TsvSource::open_with_inference_rows(
            path,
            type_inference_rows,
        )?))
    }
}
