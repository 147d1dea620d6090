//! Target/decoy label recoding.
//!
//! PIN files encode targets as `1` and decoys as `-1` (or `0`). Labels are
//! recoded once, into a non-nullable Boolean column where `true` marks a
//! target, and every later stage reads the recoded column.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::dataset::DatasetError;

/// Whether a numeric label denotes a target PSM
pub fn is_target(label: f64) -> bool {
    label > 0.0
}

/// Field describing a recoded label column
pub fn recoded_label_field(name: &str) -> Field {
    Field::new(name, DataType::Boolean, false)
}

/// `schema` with `target_column` replaced by its recoded field
pub fn recoded_schema(schema: &Schema, target_column: &str) -> SchemaRef {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| {
            if field.name() == target_column {
                recoded_label_field(target_column)
            } else {
                field.as_ref().clone()
            }
        })
        .collect();
    Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()))
}

fn invalid(first_row: usize, offset: usize, value: impl Into<String>) -> DatasetError {
    DatasetError::InvalidLabel {
        row: first_row + offset,
        value: value.into(),
    }
}

fn decide(labels: &dyn Array, first_row: usize) -> Result<BooleanArray, DatasetError> {
    match labels.data_type() {
        DataType::Boolean => {
            let booleans = labels
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(|| invalid(first_row, 0, "unreadable boolean labels"))?;
            booleans
                .iter()
                .enumerate()
                .map(|(i, v)| v.ok_or_else(|| invalid(first_row, i, "missing")))
                .collect::<Result<Vec<bool>, _>>()
                .map(BooleanArray::from)
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let strings = cast(labels, &DataType::Utf8)?;
            let strings = strings
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| invalid(first_row, 0, "unreadable text labels"))?;
            strings
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let v = v.ok_or_else(|| invalid(first_row, i, "missing"))?.trim();
                    match v.to_ascii_lowercase().as_str() {
                        "true" => Ok(true),
                        "false" => Ok(false),
                        _ => v
                            .parse::<f64>()
                            .ok()
                            .filter(|x| !x.is_nan())
                            .map(is_target)
                            .ok_or_else(|| invalid(first_row, i, v)),
                    }
                })
                .collect::<Result<Vec<bool>, _>>()
                .map(BooleanArray::from)
        }
        dt if dt.is_numeric() => {
            let numbers = cast(labels, &DataType::Float64)?;
            let numbers = numbers
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| invalid(first_row, 0, "unreadable numeric labels"))?;
            numbers
                .iter()
                .enumerate()
                .map(|(i, v)| match v {
                    Some(x) if !x.is_nan() => Ok(is_target(x)),
                    Some(_) => Err(invalid(first_row, i, "NaN")),
                    None => Err(invalid(first_row, i, "missing")),
                })
                .collect::<Result<Vec<bool>, _>>()
                .map(BooleanArray::from)
        }
        other => Err(invalid(
            first_row,
            0,
            format!("unsupported label type {other}"),
        )),
    }
}

/// Return `batch` with `target_column` recoded to target (`true`) / decoy (`false`).
///
/// `first_row` is the original index of the batch's first row, used in error
/// messages. Missing or non-numeric labels are rejected.
pub fn recode_labels(
    batch: &RecordBatch,
    target_column: &str,
    first_row: usize,
) -> Result<RecordBatch, DatasetError> {
    let schema = batch.schema();
    let index = schema
        .index_of(target_column)
        .map_err(|_| crate::source::SourceError::ColumnNotFound(target_column.to_string()))?;

    let decided: ArrayRef = Arc::new(decide(batch.column(index).as_ref(), first_row)?);
    let mut columns = batch.columns().to_vec();
    columns[index] = decided;

    Ok(RecordBatch::try_new(
        recoded_schema(&schema, target_column),
        columns,
    )?)
}
