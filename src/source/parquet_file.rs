use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use parquet::file::reader::ChunkReader;

use super::utils::{check_chunk_size, project_schema};
use super::{ChunkIterator, ChunkedTableSource, SourceError};

/// Where the Parquet bytes live (kept so every pass can re-open them)
#[derive(Debug, Clone)]
enum ParquetInput {
    FilePath(PathBuf),
    Buffer(Bytes),
}

/// Parquet table read in row batches with column projection
#[derive(Debug, Clone)]
pub struct ParquetSource {
    input: ParquetInput,
    schema: SchemaRef,
    row_count: usize,
}

impl ParquetSource {
    /// Open a Parquet file, reading only its footer
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        Ok(Self::from_builder(ParquetInput::FilePath(path), &builder))
    }

    /// Use an in-memory Parquet buffer
    pub fn from_bytes(bytes: Bytes) -> Result<Self, SourceError> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes.clone())?;
        Ok(Self::from_builder(ParquetInput::Buffer(bytes), &builder))
    }

    fn from_builder<T: ChunkReader + 'static>(
        input: ParquetInput,
        builder: &ParquetRecordBatchReaderBuilder<T>,
    ) -> Self {
        let row_count = builder.metadata().file_metadata().num_rows().max(0) as usize;
        Self {
            input,
            schema: builder.schema().clone(),
            row_count,
        }
    }

    fn read<T: ChunkReader + 'static>(
        reader: T,
        roots: &[usize],
        order: Vec<usize>,
        chunk_size: usize,
    ) -> Result<ChunkIterator, SourceError> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), roots.iter().copied());
        let batches = builder
            .with_projection(mask)
            .with_batch_size(chunk_size)
            .build()?;

        // The projection yields columns in file order; restore the requested order.
        Ok(ChunkIterator::from_batches(
            batches.map(move |batch| batch.and_then(|b| b.project(&order))),
        ))
    }
}

impl ChunkedTableSource for ParquetSource {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.row_count)
    }

    fn chunks(&self, columns: &[String], chunk_size: usize) -> Result<ChunkIterator, SourceError> {
        check_chunk_size(chunk_size)?;
        let (indices, _) = project_schema(&self.schema, columns)?;

        let mut roots = indices.clone();
        roots.sort_unstable();
        roots.dedup();
        let order: Vec<usize> = indices
            .iter()
            .map(|index| roots.partition_point(|root| root < index))
            .collect();

        match &self.input {
            ParquetInput::FilePath(path) => Self::read(File::open(path)?, &roots, order, chunk_size),
            ParquetInput::Buffer(bytes) => Self::read(bytes.clone(), &roots, order, chunk_size),
        }
    }

    fn describe(&self) -> String {
        match &self.input {
            ParquetInput::FilePath(path) => path.display().to_string(),
            ParquetInput::Buffer(bytes) => format!("in-memory parquet ({} bytes)", bytes.len()),
        }
    }
}
