use super::*;
use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_pin(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

const PIN: &str = "SpecId\tLabel\tScanNr\tscore\tPeptide\tProteins
a\t1\t1\t0.5\tK.PEP.R\tprotA
b\t-1\t2\tNA\tK.PEP.R\tdecoy_protA\tdecoy_protB
c\t1\t3\t2\tK.PEPT.R\tprotC
";

#[test]
fn test_tsv_schema_inference() {
    let file = write_pin(PIN);
    let source = TsvSource::open(file.path()).unwrap();

    assert_eq!(source.row_count(), Some(3));
    assert_eq!(
        source.column_names(),
        names(&["SpecId", "Label", "ScanNr", "score", "Peptide", "Proteins"])
    );
    let schema = source.schema();
    assert_eq!(schema.field(1).data_type(), &DataType::Int64);
    assert_eq!(schema.field(3).data_type(), &DataType::Float64);
    assert_eq!(schema.field(5).data_type(), &DataType::Utf8);
}

#[test]
fn test_tsv_chunks_projection_and_offsets() {
    let file = write_pin(PIN);
    let source = TsvSource::open(file.path()).unwrap();

    let chunks: Vec<TableChunk> = source
        .chunks(&names(&["score", "ScanNr"]), 2)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].row_indices(), 0..2);
    assert_eq!(chunks[1].row_indices(), 2..3);

    let first = chunks[0].batch();
    assert_eq!(first.schema().field(0).name(), "score");
    let score = first.column(0).as_any().downcast_ref::<Float64Array>().unwrap();
    assert_eq!(score.value(0), 0.5);
    assert!(score.is_null(1));
    let scan = first.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
    assert_eq!(scan.values().to_vec(), vec![1, 2]);
}

#[test]
fn test_tsv_protein_list_absorbs_extra_fields() {
    let file = write_pin(PIN);
    let source = TsvSource::open(file.path()).unwrap();

    let chunk = source
        .chunks(&names(&["Proteins"]), 10)
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let proteins = chunk
        .batch()
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(proteins.value(1), "decoy_protA\tdecoy_protB");
}

#[test]
fn test_tsv_skips_default_direction_row() {
    let file = write_pin(
        "SpecId\tLabel\tScanNr\tscore\nDefaultDirection\t-\t-\t1\na\t1\t1\t0.5\nb\t-1\t2\t0.1\n",
    );
    let source = TsvSource::open(file.path()).unwrap();
    assert_eq!(source.row_count(), Some(2));
    assert_eq!(source.schema().field(3).data_type(), &DataType::Float64);

    let chunks: Vec<TableChunk> = source
        .chunks(&names(&["Label"]), 10)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].row_indices(), 0..2);
}

#[test]
fn test_tsv_short_row_is_an_error() {
    let file = write_pin("SpecId\tLabel\tScanNr\na\t1\n");
    let err = TsvSource::open(file.path()).unwrap_err();
    assert!(matches!(err, SourceError::InvalidFormat(_)));
}

#[test]
fn test_tsv_limited_inference_reports_bad_values() {
    let file = write_pin("Label\tScanNr\tscore\n1\t1\t3\n1\t2\tabc\n");
    let source = TsvSource::open_with_inference_rows(file.path(), Some(1)).unwrap();
    assert_eq!(source.schema().field(2).data_type(), &DataType::Int64);

    let result: Result<Vec<TableChunk>, SourceError> =
        source.chunks(&names(&["score"]), 10).unwrap().collect();
    assert!(matches!(result, Err(SourceError::InvalidFormat(_))));
}

#[test]
fn test_unknown_column_and_zero_chunk_size() {
    let file = write_pin(PIN);
    let source = TsvSource::open(file.path()).unwrap();

    assert!(matches!(
        source.chunks(&names(&["nope"]), 10),
        Err(SourceError::ColumnNotFound(ref c)) if c == "nope"
    ));
    assert!(matches!(
        source.chunks(&names(&["score"]), 0),
        Err(SourceError::InvalidChunkSize)
    ));
}

fn sample_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("ScanNr", DataType::Int64, false),
        Field::new("Label", DataType::Int64, false),
        Field::new("score", DataType::Float64, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from((0..7).collect::<Vec<i64>>())),
            Arc::new(Int64Array::from(vec![1, -1, 1, -1, 1, -1, 1])),
            Arc::new(Float64Array::from(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7])),
        ],
    )
    .unwrap()
}

#[test]
fn test_in_memory_chunks_are_slices() {
    let source = InMemoryTable::new(sample_batch());
    let chunks: Vec<TableChunk> = source
        .chunks(&names(&["score", "ScanNr"]), 3)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[2].row_indices(), 6..7);
    assert_eq!(chunks[1].batch().schema().field(0).name(), "score");
    let scan = chunks[1]
        .batch()
        .column(1)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(scan.values().to_vec(), vec![3, 4, 5]);
}

#[test]
fn test_parquet_source_restores_requested_order() {
    let batch = sample_batch();
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let source = ParquetSource::from_bytes(bytes::Bytes::from(buffer)).unwrap();
    assert_eq!(source.row_count(), Some(7));

    let chunks: Vec<TableChunk> = source
        .chunks(&names(&["score", "ScanNr"]), 4)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].row_indices(), 4..7);

    let second = chunks[1].batch();
    assert_eq!(second.schema().field(0).name(), "score");
    assert_eq!(second.schema().field(1).name(), "ScanNr");
    let scan = second.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
    assert_eq!(scan.values().to_vec(), vec![4, 5, 6]);
}

#[test]
fn test_open_source_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("psms.parquet");
    let batch = sample_batch();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let source = open_source(&path, None).unwrap();
    assert_eq!(source.row_count(), Some(7));
    assert!(source.describe().ends_with("psms.parquet"));

    let pin = write_pin(PIN);
    let source = open_source(pin.path(), Some(10)).unwrap();
    assert_eq!(source.column_names().len(), 6);
}

#[test]
fn test_missing_markers() {
    assert!(is_missing_marker(""));
    assert!(is_missing_marker(" NA "));
    assert!(is_missing_marker("nan"));
    assert!(!is_missing_marker("0"));
    assert!(!is_missing_marker("NAK"));
}
