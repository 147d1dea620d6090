//! Integration tests for pinfold
//!
//! These tests run the full pipeline from PIN files on disk to fold tables.

use arrow::array::{Array, BooleanArray, Float64Array};
use parquet::arrow::ArrowWriter;
use pinfold::prelude::*;
use std::fs::{self, File};
use tempfile::tempdir;

const HEADER: &str = "SpecId\tLabel\tScanNr\tExpMass\tCalcMass\tlnrSp\tdeltCn\tCharge2\tCharge3\tPeptide\tProteins";

/// Write a PIN file with `rows` PSMs; `deltCn` is missing on `missing_row`
fn write_pin(path: &std::path::Path, rows: usize, missing_row: Option<usize>) {
    let mut content = format!("{HEADER}\nDefaultDirection\t-\t-\t-\t-\t1\t1\t0\t0\t-\t-\n");
    for i in 0..rows {
        let label = if i % 2 == 0 { 1 } else { -1 };
        let delta = if Some(i) == missing_row {
            "NA".to_string()
        } else {
            format!("{:.2}", i as f64 / 100.0)
        };
        let (z2, z3) = if i % 3 == 0 { (0, 1) } else { (1, 0) };
        content.push_str(&format!(
            "psm{i}\t{label}\t{}\t{:.3}\t{:.3}\t{}.5\t{delta}\t{z2}\t{z3}\tK.PEPTIDE.R\tprot{i}\tprot{}\n",
            100 + i,
            1000.0 + i as f64,
            1000.1 + i as f64,
            i,
            i + 1
        ));
    }
    fs::write(path, content).unwrap();
}

fn column<'a, T: 'static>(batch: &'a arrow::record_batch::RecordBatch, name: &str) -> &'a T {
    batch
        .column(batch.schema().index_of(name).unwrap())
        .as_any()
        .downcast_ref::<T>()
        .unwrap()
}

/// Ingest two PIN files, screen features and extract two folds
#[test]
fn test_pin_to_folds_pipeline() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("run1.pin");
    let second = dir.path().join("run2.pin");
    write_pin(&first, 12, Some(4));
    write_pin(&second, 8, None);

    let builder = DatasetBuilder::new().with_scan_config(ScanConfig {
        max_features_per_group: 2,
        rows_per_chunk: 5,
        max_workers: 2,
    });
    // deltCn is screened per dataset; drop it in both so feature sets match
    let overrides = ColumnOverrides {
        ignore: vec!["deltCn".to_string()],
        ..Default::default()
    };
    let datasets = builder
        .clone()
        .with_overrides(overrides)
        .read_pin(&[&first, &second])
        .unwrap();

    let columns = datasets[0].columns();
    assert_eq!(columns.target_column(), "Label");
    assert_eq!(columns.spectrum_columns(), ["ScanNr", "ExpMass"]);
    assert_eq!(columns.feature_columns(), ["lnrSp", "Charge2", "Charge3"]);
    assert_eq!(columns.charge_column(), None);
    assert_eq!(datasets[0].identity_table().unwrap().num_rows(), 12);

    // without the ignore list, the first file loses deltCn to screening
    let screened = builder.read_pin(&[&first]).unwrap();
    assert_eq!(
        screened[0].columns().role_of("deltCn"),
        Some(ColumnRole::Ignored)
    );
    assert!(!screened[0]
        .columns()
        .feature_columns()
        .contains(&"deltCn".to_string()));

    let assignment = FoldIndexAssignment::new(vec![
        vec![vec![0, 2, 4, 6, 8, 10], vec![1, 3, 5, 7]],
        vec![vec![1, 3, 5, 7, 9, 11], vec![0, 2, 4, 6]],
    ])
    .unwrap();
    let extractor = FoldExtractor::new(ExtractorConfig {
        rows_per_chunk: 5,
        max_workers: 4,
    });
    let result = extractor.extract(&datasets, &assignment).unwrap();

    assert!(result.is_complete());
    assert_eq!(result.num_folds(), 2);
    let fold0 = result.fold(0).unwrap();
    assert_eq!(fold0.num_rows(), 10);
    assert_eq!(fold0.num_columns(), 4);

    let lnr_sp: Vec<f64> = column::<Float64Array>(fold0, "lnrSp").values().to_vec();
    assert_eq!(
        lnr_sp,
        vec![0.5, 2.5, 4.5, 6.5, 8.5, 10.5, 1.5, 3.5, 5.5, 7.5]
    );
    let labels: Vec<bool> = column::<BooleanArray>(fold0, "Label")
        .iter()
        .map(|v| v.unwrap())
        .collect();
    assert_eq!(
        labels,
        vec![true, true, true, true, true, true, false, false, false, false]
    );
}

/// A requested row past the end of a file surfaces as a warning, not an error
#[test]
fn test_truncated_source_warns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.pin");
    write_pin(&path, 5, None);

    let datasets = DatasetBuilder::new().read_pin(&[&path]).unwrap();
    let assignment = FoldIndexAssignment::new(vec![vec![vec![1, 3, 7]]]).unwrap();
    let result = FoldExtractor::default()
        .extract(&datasets, &assignment)
        .unwrap();

    let fold = result.fold(0).unwrap();
    assert_eq!(fold.num_rows(), 3);
    assert!(fold.column(0).is_null(2));
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].missing_indices, vec![7]);
}

/// Parquet inputs go through the same classification and extraction
#[test]
fn test_parquet_and_pin_agree() {
    let dir = tempdir().unwrap();
    let pin = dir.path().join("run.pin");
    write_pin(&pin, 9, None);

    let source = TsvSource::open(&pin).unwrap();
    let columns = source.column_names();
    let table = source
        .chunks(&columns, 100)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .into_batch();

    let parquet = dir.path().join("run.parquet");
    let mut writer = ArrowWriter::try_new(File::create(&parquet).unwrap(), table.schema(), None).unwrap();
    writer.write(&table).unwrap();
    writer.close().unwrap();

    let builder = DatasetBuilder::new();
    let from_pin = builder.read_pin(&[&pin]).unwrap();
    let from_parquet = builder.read_pin(&[&parquet]).unwrap();
    let from_table = vec![builder.from_table(table).unwrap()];
    assert_eq!(
        from_pin[0].identity_table().unwrap(),
        from_parquet[0].identity_table().unwrap()
    );

    let assignment = FoldIndexAssignment::new(vec![vec![vec![8, 0, 4]], vec![vec![1, 5]]]).unwrap();
    let extractor = FoldExtractor::new(ExtractorConfig {
        rows_per_chunk: 2,
        max_workers: 2,
    });
    let a = extractor.extract(&from_pin, &assignment).unwrap();
    let b = extractor.extract(&from_parquet, &assignment).unwrap();
    let c = extractor.extract(&from_table, &assignment).unwrap();
    assert_eq!(a.folds, b.folds);
    assert_eq!(a.folds, c.folds);
}

/// Empty input files produce empty identity tables and empty folds
#[test]
fn test_header_only_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.pin");
    fs::write(&path, format!("{HEADER}\n")).unwrap();

    let datasets = DatasetBuilder::new().read_pin(&[&path]).unwrap();
    assert_eq!(datasets[0].row_count(), Some(0));
    assert_eq!(datasets[0].identity_table().unwrap().num_rows(), 0);

    let assignment = FoldIndexAssignment::new(vec![vec![vec![]]]).unwrap();
    let result = FoldExtractor::default()
        .extract(&datasets, &assignment)
        .unwrap();
    assert_eq!(result.fold(0).unwrap().num_rows(), 0);
}
