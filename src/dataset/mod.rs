//! # PSM Datasets
//!
//! A [`Dataset`] is an immutable, column-classified PSM table ready for fold
//! extraction. It is either:
//!
//! - [`OnDiskDataset`]: the table stays in its source and is re-read in
//!   chunks; only the identity table (spectrum key + recoded label) is kept
//!   in memory.
//! - [`InMemoryDataset`]: the whole table is resident; its chunk sequence is
//!   the table itself as a single chunk.
//!
//! Datasets are created by [`DatasetBuilder`], which classifies the columns,
//! screens features for missing values and drops the ones that have any.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pinfold::dataset::DatasetBuilder;
//!
//! let datasets = DatasetBuilder::new().read_pin(&["run1.pin", "run2.pin"])?;
//! for dataset in &datasets {
//!     println!("{} features", dataset.columns().feature_columns().len());
//! }
//! # Ok::<(), pinfold::dataset::DatasetError>(())
//! ```

mod builder;
mod error;


use std::fmt;

use arrow::record_batch::RecordBatch;

use crate::columns::ColumnGroups;
use crate::source::{
    check_chunk_size, project_schema, ChunkIterator, ChunkedTableSource, SourceError, TableChunk,
};

pub use builder::DatasetBuilder;
pub use error::DatasetError;

/// A table kept in its source, re-read chunk by chunk
pub struct OnDiskDataset {
    source: Box<dyn ChunkedTableSource>,
    columns: ColumnGroups,
    identity_table: RecordBatch,
}

impl OnDiskDataset {
    /// The backing source
    pub fn source(&self) -> &dyn ChunkedTableSource {
        self.source.as_ref()
    }

    /// Spectrum key columns and the recoded label, one row per PSM
    pub fn identity_table(&self) -> &RecordBatch {
        &self.identity_table
    }
}

impl fmt::Debug for OnDiskDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnDiskDataset")
            .field("source", &self.source.describe())
            .field("columns", &self.columns)
            .field("identity_rows", &self.identity_table.num_rows())
            .finish()
    }
}

/// A fully resident table
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    table: RecordBatch,
    columns: ColumnGroups,
}

impl InMemoryDataset {
    /// The whole table, labels as read
    pub fn table(&self) -> &RecordBatch {
        &self.table
    }
}

/// An ingested PSM table
#[derive(Debug)]
pub enum Dataset {
    /// Table read from a file in chunks
    OnDisk(OnDiskDataset),
    /// Table held in memory
    InMemory(InMemoryDataset),
}

impl Dataset {
    /// Column roles after missing-value screening
    pub fn columns(&self) -> &ColumnGroups {
        match self {
            Self::OnDisk(d) => &d.columns,
            Self::InMemory(d) => &d.columns,
        }
    }

    /// Number of rows, if known without reading the table
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Self::OnDisk(d) => d.source.row_count(),
            Self::InMemory(d) => Some(d.table.num_rows()),
        }
    }

    /// The identity table; `None` for in-memory datasets, which hold the full table
    pub fn identity_table(&self) -> Option<&RecordBatch> {
        match self {
            Self::OnDisk(d) => Some(&d.identity_table),
            Self::InMemory(_) => None,
        }
    }

    /// Whether rows are re-read from a source
    pub fn is_on_disk(&self) -> bool {
        matches!(self, Self::OnDisk(_))
    }

    /// Short description for log messages
    pub fn describe(&self) -> String {
        match self {
            Self::OnDisk(d) => d.source.describe(),
            Self::InMemory(d) => format!("in-memory dataset ({} rows)", d.table.num_rows()),
        }
    }

    /// Start a pass over `columns`.
    ///
    /// On-disk datasets yield chunks of at most `chunk_size` rows; in-memory
    /// datasets yield the projected table as one chunk.
    pub fn chunks(&self, columns: &[String], chunk_size: usize) -> Result<ChunkIterator, SourceError> {
        match self {
            Self::OnDisk(d) => d.source.chunks(columns, chunk_size),
            Self::InMemory(d) => {
                check_chunk_size(chunk_size)?;
                let (indices, _) = project_schema(&d.table.schema(), columns)?;
                let table = d.table.project(&indices)?;
                Ok(ChunkIterator::new(std::iter::once(Ok(TableChunk::new(0, table)))))
            }
        }
    }
}
