use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::utils::{check_chunk_size, project_schema};
use super::{ChunkIterator, ChunkedTableSource, SourceError, TableChunk};

/// A fully resident table
///
/// Chunks are zero-copy slices of the projected batch.
#[derive(Debug, Clone)]
pub struct InMemoryTable {
    batch: RecordBatch,
}

impl InMemoryTable {
    /// Wrap a record batch
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// The whole table
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consume the source, returning the table
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }
}

impl From<RecordBatch> for InMemoryTable {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

impl ChunkedTableSource for InMemoryTable {
    fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.batch.num_rows())
    }

    fn chunks(&self, columns: &[String], chunk_size: usize) -> Result<ChunkIterator, SourceError> {
        check_chunk_size(chunk_size)?;
        let (indices, _) = project_schema(&self.batch.schema(), columns)?;
        let projected = self.batch.project(&indices)?;
        let total = projected.num_rows();

        let chunks = (0..total).step_by(chunk_size).map(move |offset| {
            let len = chunk_size.min(total - offset);
            Ok(TableChunk::new(offset, projected.slice(offset, len)))
        });
        Ok(ChunkIterator::new(chunks))
    }

    fn describe(&self) -> String {
        format!(
            "in-memory table ({} rows, {} columns)",
            self.batch.num_rows(),
            self.batch.num_columns()
        )
    }
}
