use crate::dataset::DatasetError;
use crate::source::SourceError;

/// Errors that can occur while extracting fold tables
#[derive(Debug, thiserror::Error)]
pub enum FoldError {
    /// Reading a dataset failed
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Label recoding or another dataset-level step failed
    #[error("Dataset error: {0}")]
    DatasetError(#[from] DatasetError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The assignment and the dataset list disagree on the number of datasets
    #[error("Fold assignment lists {expected} datasets, but {found} were given")]
    DatasetCountMismatch {
        /// Datasets per fold in the assignment
        expected: usize,
        /// Datasets passed to the extractor
        found: usize,
    },

    /// A fold lists a different number of datasets than fold 0
    #[error("Fold {fold} lists {found} datasets, expected {expected}")]
    RaggedAssignment {
        /// Offending fold
        fold: usize,
        /// Datasets listed by fold 0
        expected: usize,
        /// Datasets listed by this fold
        found: usize,
    },

    /// The same row is assigned to two folds
    #[error("Row {index} of dataset {dataset} is assigned to folds {first} and {second}")]
    OverlappingFolds {
        /// Dataset position
        dataset: usize,
        /// Lower fold number
        first: usize,
        /// Higher fold number
        second: usize,
        /// Row index assigned twice
        index: u64,
    },

    /// A dataset's feature columns differ from those of dataset 0
    #[error("Dataset {dataset} has different feature columns than dataset 0")]
    FeatureMismatch {
        /// Dataset position
        dataset: usize,
    },

    /// The worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}
