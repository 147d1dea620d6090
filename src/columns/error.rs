use super::ColumnRole;

/// Errors raised while classifying table columns
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No column could be found for a required role
    #[error("No {0} column found")]
    MissingRole(ColumnRole),

    /// An explicit column override names a column the table does not have
    #[error("The '{column}' column given for {role} was not found")]
    OverrideNotFound {
        /// Role the override was given for
        role: ColumnRole,
        /// Column name that was requested
        column: String,
    },

    /// More than one label column is present
    #[error("Expected exactly one label column, found {0:?}")]
    DuplicateLabel(Vec<String>),

    /// Two roles resolved to the same column
    #[error("Column '{column}' cannot be both {first} and {second}")]
    ConflictingRoles {
        /// Column claimed twice
        column: String,
        /// Role that claimed the column first
        first: ColumnRole,
        /// Role that tried to claim it again
        second: ColumnRole,
    },

    /// A feature update referenced a column that is not a current feature
    #[error("'{0}' is not a feature column")]
    UnknownColumn(String),
}
