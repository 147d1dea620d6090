use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use csv::{StringRecord, StringRecordsIntoIter};
use log::debug;

use super::utils::{check_chunk_size, is_missing_marker, project_schema};
use super::{ChunkIterator, ChunkedTableSource, SourceError, TableChunk};

/// First field of the optional PIN row that carries default feature directions
const DEFAULT_DIRECTION: &str = "defaultdirection";

/// Narrowest Arrow type that holds every non-missing value seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ValueKind {
    Int64,
    Float64,
    Utf8,
}

impl ValueKind {
    fn of(value: &str) -> Self {
        let value = value.trim();
        if value.parse::<i64>().is_ok() {
            Self::Int64
        } else if value.parse::<f64>().is_ok() {
            Self::Float64
        } else {
            Self::Utf8
        }
    }

    fn data_type(kind: Option<Self>) -> DataType {
        match kind {
            Some(Self::Int64) => DataType::Int64,
            Some(Self::Utf8) => DataType::Utf8,
            // columns that are entirely missing read as floats
            Some(Self::Float64) | None => DataType::Float64,
        }
    }
}

fn tsv_reader(path: &Path) -> Result<csv::Reader<File>, SourceError> {
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_path(path)?)
}

fn is_direction_row(record: &StringRecord) -> bool {
    record
        .get(0)
        .map(|first| first.trim().to_lowercase() == DEFAULT_DIRECTION)
        .unwrap_or(false)
}

/// Field `index` of a record; the last column absorbs any surplus fields.
fn field<'r>(record: &'r StringRecord, index: usize, width: usize) -> Cow<'r, str> {
    if index + 1 == width && record.len() > width {
        Cow::Owned(
            record
                .iter()
                .skip(index)
                .collect::<Vec<_>>()
                .join("\t"),
        )
    } else {
        Cow::Borrowed(record.get(index).unwrap_or(""))
    }
}

fn check_width(record: &StringRecord, width: usize, row: usize) -> Result<(), SourceError> {
    if record.len() < width {
        return Err(SourceError::InvalidFormat(format!(
            "row {row} has {} fields, expected {width}",
            record.len()
        )));
    }
    Ok(())
}

/// Percolator input (PIN) tab-delimited table
///
/// Opening the file performs one streaming pass to infer column types and
/// count rows. Each [`ChunkedTableSource::chunks`] call re-opens the file.
#[derive(Debug, Clone)]
pub struct TsvSource {
    path: PathBuf,
    schema: SchemaRef,
    row_count: usize,
    skip_direction_row: bool,
}

impl TsvSource {
    /// Open a PIN file, inferring column types from every row
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        Self::open_with_inference_rows(path, None)
    }

    /// Open a PIN file, inferring column types from the first `inference_rows`
    /// data rows (`None` for all of them). Rows are always counted in full.
    pub fn open_with_inference_rows<P: AsRef<Path>>(
        path: P,
        inference_rows: Option<usize>,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = tsv_reader(&path)?;
        let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if names.is_empty() || names.iter().all(|n| n.is_empty()) {
            return Err(SourceError::InvalidFormat(format!(
                "{} has no header row",
                path.display()
            )));
        }
        let width = names.len();

        let mut kinds: Vec<Option<ValueKind>> = vec![None; width];
        let mut skip_direction_row = false;
        let mut row_count = 0usize;
        let mut record = StringRecord::new();
        let mut first = true;

        while reader.read_record(&mut record)? {
            if first {
                first = false;
                if is_direction_row(&record) {
                    skip_direction_row = true;
                    continue;
                }
            }
            check_width(&record, width, row_count)?;

            if inference_rows.map_or(true, |limit| row_count < limit) {
                for (index, kind) in kinds.iter_mut().enumerate() {
                    let value = field(&record, index, width);
                    if is_missing_marker(&value) {
                        continue;
                    }
                    let seen = ValueKind::of(&value);
                    *kind = Some(kind.map_or(seen, |k| k.max(seen)));
                }
            }
            row_count += 1;
        }

        let fields: Vec<Field> = names
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| Field::new(name, ValueKind::data_type(*kind), true))
            .collect();

        debug!(
            "Opened {}: {} columns, {} rows",
            path.display(),
            width,
            row_count
        );

        Ok(Self {
            path,
            schema: Arc::new(Schema::new(fields)),
            row_count,
            skip_direction_row,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChunkedTableSource for TsvSource {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.row_count)
    }

    fn chunks(&self, columns: &[String], chunk_size: usize) -> Result<ChunkIterator, SourceError> {
        check_chunk_size(chunk_size)?;
        let (indices, schema) = project_schema(&self.schema, columns)?;
        let mut records = tsv_reader(&self.path)?.into_records();
        if self.skip_direction_row {
            records.next().transpose()?;
        }

        Ok(ChunkIterator::new(TsvChunks {
            records,
            indices,
            schema,
            width: self.schema.fields().len(),
            chunk_size,
            next_row: 0,
            done: false,
        }))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Arrow builder for one projected column.
enum ColumnBuilder {
    Int64(Int64Builder),
    Float64(Float64Builder),
    Utf8(StringBuilder),
}

impl ColumnBuilder {
    fn new(data_type: &DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Int64 => Self::Int64(Int64Builder::with_capacity(capacity)),
            DataType::Float64 => Self::Float64(Float64Builder::with_capacity(capacity)),
            _ => Self::Utf8(StringBuilder::with_capacity(capacity, capacity * 8)),
        }
    }

    fn append(&mut self, value: &str, column: &str, row: usize) -> Result<(), SourceError> {
        let parse_error = || {
            SourceError::InvalidFormat(format!(
                "row {row}, column '{column}': cannot parse '{value}'"
            ))
        };
        if is_missing_marker(value) {
            match self {
                Self::Int64(b) => b.append_null(),
                Self::Float64(b) => b.append_null(),
                Self::Utf8(b) => b.append_null(),
            }
            return Ok(());
        }
        match self {
            Self::Int64(b) => b.append_value(value.trim().parse().map_err(|_| parse_error())?),
            Self::Float64(b) => b.append_value(value.trim().parse().map_err(|_| parse_error())?),
            Self::Utf8(b) => b.append_value(value),
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            Self::Int64(mut b) => Arc::new(b.finish()),
            Self::Float64(mut b) => Arc::new(b.finish()),
            Self::Utf8(mut b) => Arc::new(b.finish()),
        }
    }
}

/// One pass over a PIN file, yielding typed chunks.
struct TsvChunks {
    records: StringRecordsIntoIter<File>,
    indices: Vec<usize>,
    schema: SchemaRef,
    width: usize,
    chunk_size: usize,
    next_row: usize,
    done: bool,
}

impl TsvChunks {
    fn read_chunk(&mut self) -> Result<Option<TableChunk>, SourceError> {
        let mut builders: Vec<ColumnBuilder> = self
            .schema
            .fields()
            .iter()
            .map(|f| ColumnBuilder::new(f.data_type(), self.chunk_size))
            .collect();

        let first_row = self.next_row;
        let mut rows = 0usize;
        while rows < self.chunk_size {
            let Some(record) = self.records.next() else {
                break;
            };
            let record = record?;
            let row = first_row + rows;
            check_width(&record, self.width, row)?;

            for ((builder, &index), f) in builders
                .iter_mut()
                .zip(&self.indices)
                .zip(self.schema.fields())
            {
                builder.append(&field(&record, index, self.width), f.name(), row)?;
            }
            rows += 1;
        }

        if rows == 0 {
            return Ok(None);
        }
        self.next_row += rows;

        let arrays: Vec<ArrayRef> = builders.into_iter().map(ColumnBuilder::finish).collect();
        let batch = RecordBatch::try_new_with_options(
            self.schema.clone(),
            arrays,
            &arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(rows)),
        )?;
        Ok(Some(TableChunk::new(first_row, batch)))
    }
}

impl Iterator for TsvChunks {
    type Item = Result<TableChunk, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
