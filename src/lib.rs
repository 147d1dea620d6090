//! # pinfold - Memory-Bounded PSM Table Ingestion
//!
//! `pinfold` ingests large tab-delimited peptide-spectrum match (PSM) tables,
//! such as Percolator input (PIN) files, and exposes them as column-classified
//! datasets that can be split into cross-validation folds.
//!
//! ## Key Features
//!
//! - **Column Classification**: every column gets exactly one semantic role
//!   (label, spectrum key, feature, ...) resolved once from the header.
//!
//! - **Chunked Reads**: tables larger than memory are read in bounded row
//!   chunks restricted to the columns a pass needs. PIN and Parquet files are
//!   supported, as are Arrow tables already in memory.
//!
//! - **Missing-Value Screening**: feature columns with any missing value are
//!   dropped, and the drop is logged before it happens.
//!
//! - **Deterministic Parallelism**: column groups and chunks are processed on
//!   a bounded rayon pool; output order never depends on scheduling.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pinfold::prelude::*;
//!
//! // Classify, screen and index two PIN files
//! let datasets = DatasetBuilder::new().read_pin(&["run1.pin", "run2.pin"])?;
//!
//! // Fold -> dataset -> row indices, supplied by the caller
//! let assignment = FoldIndexAssignment::new(vec![
//!     vec![vec![0, 1, 2], vec![3, 4]],
//!     vec![vec![3, 4], vec![0, 1, 2]],
//! ])?;
//!
//! let result = FoldExtractor::default().extract(&datasets, &assignment)?;
//! for (fold, table) in result.folds.iter().enumerate() {
//!     println!("fold {fold}: {} rows", table.num_rows());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! table ─▶ ColumnGroups::infer ─▶ MissingValueScanner ─▶ DatasetBuilder ─▶ Dataset
//!                                   (pass 1: flags +                          │
//!                                    identity table)                          ▼
//!                          FoldIndexAssignment ─▶ FoldExtractor (pass 2) ─▶ one table per fold
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod columns;
pub mod dataset;
pub mod folds;
pub mod labels;
pub mod scan;
pub mod source;

mod pool;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::columns::{ColumnGroups, ColumnOverrides, ColumnRole, SchemaError};
    pub use crate::dataset::{Dataset, DatasetBuilder, DatasetError};
    pub use crate::folds::{
        DataIntegrityWarning, ExtractorConfig, FoldError, FoldExtractionResult, FoldExtractor,
        FoldIndexAssignment,
    };
    pub use crate::scan::{MissingValueScanner, ScanConfig, ScanOutcome};
    pub use crate::source::{
        open_source, ChunkedTableSource, InMemoryTable, ParquetSource, SourceError, TableChunk,
        TsvSource,
    };
}
