use super::*;
use proptest::prelude::*;

fn pin_header() -> Vec<&'static str> {
    vec![
        "SpecId", "Label", "ScanNr", "ExpMass", "CalcMass", "score", "deltCn", "Charge2",
        "Charge3", "Peptide", "Proteins",
    ]
}

#[test]
fn test_infer_pin_header() {
    let groups = ColumnGroups::infer(&pin_header(), &ColumnOverrides::default()).unwrap();

    assert_eq!(groups.target_column(), "Label");
    assert_eq!(groups.spectrum_columns(), ["ScanNr", "ExpMass"]);
    assert_eq!(groups.feature_columns(), ["score", "deltCn", "Charge2", "Charge3"]);
    assert_eq!(groups.psm_id_column(), Some("SpecId"));
    assert_eq!(groups.peptide_column(), Some("Peptide"));
    assert_eq!(groups.protein_column(), Some("Proteins"));
    assert_eq!(groups.calcmass_column(), Some("CalcMass"));
    assert_eq!(groups.role_of("CalcMass"), Some(ColumnRole::CalculatedMass));
    assert_eq!(groups.role_of("ExpMass"), Some(ColumnRole::ExperimentalMass));
    assert_eq!(groups.role_of("missing"), None);
    assert_eq!(
        groups.identity_columns(),
        vec!["ScanNr".to_string(), "ExpMass".to_string(), "Label".to_string()]
    );
}

#[test]
fn test_every_column_has_one_role() {
    let header = pin_header();
    let groups = ColumnGroups::infer(&header, &ColumnOverrides::default()).unwrap();

    assert_eq!(groups.columns().len(), header.len());
    for column in &header {
        assert!(groups.role_of(column).is_some(), "{column} has no role");
    }
    for feature in groups.feature_columns() {
        assert!(!groups.spectrum_columns().contains(feature));
        assert_ne!(feature, groups.target_column());
    }
}

#[test]
fn test_spectrum_key_order() {
    let header = ["ret_time", "label", "ExpMass", "scannr", "FileName", "score"];
    let groups = ColumnGroups::infer(&header, &ColumnOverrides::default()).unwrap();

    assert_eq!(groups.spectrum_columns(), ["FileName", "scannr", "ret_time", "ExpMass"]);
    assert_eq!(groups.feature_columns(), ["score"]);
    for column in groups.spectrum_columns() {
        assert!(groups.role_of(column).unwrap().is_spectrum_key());
    }
}

#[test]
fn test_overrides_take_precedence() {
    let header = ["Label", "ScanNr", "rt", "ret_time", "file", "mass", "z", "score"];
    let overrides = ColumnOverrides {
        filename: Some("file".to_string()),
        calcmass: Some("mass".to_string()),
        expmass: None,
        ret_time: Some("rt".to_string()),
        charge: Some("z".to_string()),
        ignore: vec![],
    };
    let groups = ColumnGroups::infer(&header, &overrides).unwrap();

    assert_eq!(groups.rt_column(), Some("rt"));
    assert_eq!(groups.filename_column(), Some("file"));
    assert_eq!(groups.calcmass_column(), Some("mass"));
    assert_eq!(groups.charge_column(), Some("z"));
    // the canonical ret_time column is no longer special
    assert_eq!(groups.feature_columns(), ["ret_time", "z", "score"]);
}

#[test]
fn test_override_not_found() {
    let header = ["Label", "ScanNr", "score"];
    let overrides = ColumnOverrides {
        ret_time: Some("RT".to_string()),
        ..Default::default()
    };
    let err = ColumnGroups::infer(&header, &overrides).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::OverrideNotFound { role: ColumnRole::RetentionTime, .. }
    ));
}

#[test]
fn test_charge_stays_feature_without_one_hot_columns() {
    let header = ["Label", "ScanNr", "Charge", "score"];
    let groups = ColumnGroups::infer(&header, &ColumnOverrides::default()).unwrap();

    assert_eq!(groups.charge_column(), Some("Charge"));
    assert_eq!(groups.role_of("Charge"), Some(ColumnRole::Feature));
    assert_eq!(groups.feature_columns(), ["Charge", "score"]);
}

#[test]
fn test_charge_leaves_features_with_one_hot_columns() {
    let header = ["Label", "ScanNr", "Charge", "Charge2", "Charge3", "score"];
    let groups = ColumnGroups::infer(&header, &ColumnOverrides::default()).unwrap();

    assert_eq!(groups.role_of("Charge"), Some(ColumnRole::Charge));
    assert_eq!(groups.feature_columns(), ["Charge2", "Charge3", "score"]);
}

#[test]
fn test_ignore_list() {
    let header = ["Label", "ScanNr", "rank", "score"];
    let overrides = ColumnOverrides {
        ignore: vec!["rank".to_string()],
        ..Default::default()
    };
    let groups = ColumnGroups::infer(&header, &overrides).unwrap();

    assert_eq!(groups.role_of("rank"), Some(ColumnRole::Ignored));
    assert_eq!(groups.feature_columns(), ["score"]);
}

#[test]
fn test_missing_required_roles() {
    let no_label = ColumnGroups::infer(&["ScanNr", "score"], &ColumnOverrides::default());
    assert!(matches!(
        no_label,
        Err(SchemaError::MissingRole(ColumnRole::Label))
    ));

    let no_scan = ColumnGroups::infer(&["Label", "score"], &ColumnOverrides::default());
    assert!(matches!(
        no_scan,
        Err(SchemaError::MissingRole(ColumnRole::SpectrumIdentifier))
    ));

    let no_features = ColumnGroups::infer(
        &["SpecId", "Label", "ScanNr", "Peptide", "Proteins"],
        &ColumnOverrides::default(),
    );
    assert!(matches!(
        no_features,
        Err(SchemaError::MissingRole(ColumnRole::Feature))
    ));
}

#[test]
fn test_duplicate_label() {
    let err = ColumnGroups::infer(&["Label", "label", "ScanNr", "score"], &ColumnOverrides::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateLabel(ref cols) if cols.len() == 2));
}

#[test]
fn test_conflicting_override() {
    let overrides = ColumnOverrides {
        calcmass: Some("ScanNr".to_string()),
        ..Default::default()
    };
    let err = ColumnGroups::infer(&["Label", "ScanNr", "score"], &overrides).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::ConflictingRoles {
            first: ColumnRole::SpectrumIdentifier,
            second: ColumnRole::CalculatedMass,
            ..
        }
    ));
}

#[test]
fn test_update_feature_columns() {
    let mut groups = ColumnGroups::infer(&pin_header(), &ColumnOverrides::default()).unwrap();

    // order of the keep list does not matter
    groups.update_feature_columns(&["deltCn", "score"]).unwrap();
    assert_eq!(groups.feature_columns(), ["score", "deltCn"]);
    assert_eq!(groups.role_of("Charge2"), Some(ColumnRole::Ignored));
    assert_eq!(groups.target_column(), "Label");

    let err = groups.update_feature_columns(&["Label"]).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownColumn(ref c) if c == "Label"));
}

#[test]
fn test_feature_listing_counts_from_zero() {
    let mut groups = ColumnGroups::infer(&pin_header(), &ColumnOverrides::default()).unwrap();
    groups.update_feature_columns(&["score", "deltCn"]).unwrap();
    assert_eq!(groups.feature_listing(), ["  (0)\tscore", "  (1)\tdeltCn"]);
}

#[test]
fn test_display_lists_groups() {
    let groups = ColumnGroups::infer(&pin_header(), &ColumnOverrides::default()).unwrap();
    let rendered = groups.to_string();
    assert!(rendered.contains("target_column: Label"));
    assert!(rendered.contains("rt_column: -"));
}

proptest! {
    #[test]
    fn test_classification_is_order_independent(
        shuffled in Just(pin_header()).prop_shuffle()
    ) {
        let reference = ColumnGroups::infer(&pin_header(), &ColumnOverrides::default()).unwrap();
        let groups = ColumnGroups::infer(&shuffled, &ColumnOverrides::default()).unwrap();
        let again = ColumnGroups::infer(&shuffled, &ColumnOverrides::default()).unwrap();

        prop_assert_eq!(&groups, &again);
        for column in pin_header() {
            prop_assert_eq!(groups.role_of(column), reference.role_of(column));
        }
        prop_assert_eq!(groups.target_column(), reference.target_column());
    }
}
