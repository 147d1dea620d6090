use crate::columns::SchemaError;
use crate::source::SourceError;

/// Errors that can occur while building a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Column classification failed
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// Reading the underlying table failed
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Screening for missing values and non-numeric types left no features
    #[error("No feature columns left after dropping non-numeric features and features with missing values")]
    EmptyFeatureSet,

    /// A label value cannot be read as target or decoy
    #[error("Invalid label at row {row}: {value}")]
    InvalidLabel {
        /// Original row index
        row: usize,
        /// Offending value
        value: String,
    },

    /// A scan column group was built without feature columns
    #[error("Column group {0} contains no feature columns")]
    EmptyColumnGroup(usize),

    /// The worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}
