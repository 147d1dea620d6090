//! # Fold Extraction
//!
//! Re-reads every dataset in chunks and splits its rows into per-fold
//! training tables, following a [`FoldIndexAssignment`].
//!
//! ## Architecture
//!
//! ```text
//! dataset 0 ─┬─ chunk 0 ──▶ bucket by fold ─┐
//!            └─ chunk 1 ──▶ bucket by fold ─┤
//! dataset 1 ─── chunk 0 ──▶ bucket by fold ─┤
//!                                           ▼
//!                  (fold, dataset) buffers ──▶ reindex ──▶ concat per fold
//! ```
//!
//! Chunks are processed in parallel and each one owns its buckets. Buffers
//! are merged by chunk position and then reindexed to the requested row
//! order, so output never depends on worker scheduling.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pinfold::dataset::DatasetBuilder;
//! use pinfold::folds::{FoldExtractor, FoldIndexAssignment};
//!
//! let datasets = DatasetBuilder::new().read_pin(&["a.pin", "b.pin"])?;
//! let assignment = FoldIndexAssignment::new(vec![
//!     vec![vec![0, 1, 2], vec![3, 4]],
//!     vec![vec![3, 4], vec![0, 1, 2]],
//! ])?;
//! let result = FoldExtractor::default().extract(&datasets, &assignment)?;
//! assert_eq!(result.num_folds(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod assignment;
mod error;
mod extractor;


pub use assignment::FoldIndexAssignment;
pub use error::FoldError;
pub use extractor::{DataIntegrityWarning, ExtractorConfig, FoldExtractionResult, FoldExtractor};
