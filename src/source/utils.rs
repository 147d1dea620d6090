use std::sync::Arc;

use arrow::datatypes::{Schema, SchemaRef};

use super::SourceError;

/// Field values read as missing (null) from delimited text
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA",
];

/// Whether a raw text field denotes a missing value
pub fn is_missing_marker(value: &str) -> bool {
    MISSING_MARKERS.contains(&value.trim())
}

pub(crate) fn check_chunk_size(chunk_size: usize) -> Result<(), SourceError> {
    if chunk_size == 0 {
        return Err(SourceError::InvalidChunkSize);
    }
    Ok(())
}

/// Resolve requested column names to indices and the projected schema.
pub(crate) fn project_schema(
    schema: &Schema,
    columns: &[String],
) -> Result<(Vec<usize>, SchemaRef), SourceError> {
    let indices = columns
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| SourceError::ColumnNotFound(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let projected = schema.project(&indices)?;
    Ok((indices, Arc::new(projected)))
}
