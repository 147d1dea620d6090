/// Errors that can occur while reading chunks from a table source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TSV parsing error
    #[error("TSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Malformed input
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Requested column does not exist in the source
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Chunk sizes must be positive
    #[error("Chunk size must be a positive number of rows")]
    InvalidChunkSize,
}
