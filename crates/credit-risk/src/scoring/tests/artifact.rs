use super::common::*;
use crate::scoring::artifact::{ArtifactBundle, ArtifactLoadError, ModelSpec, REQUIRED_KEYS};
use crate::scoring::scorer::ScoringError;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "credit-risk-{}-{name}.json",
        std::process::id()
    ));
    fs::write(&path, contents).expect("write scratch bundle");
    path
}

fn tree_document() -> serde_json::Value {
    let mut document = logistic_document();
    document["best_model"] = json!({
        "kind": "gradient_boosted_trees",
        "base_score": 0.5,
        "num_feature": 10,
        "trees": [
            { "nodes": [
                { "feature": 7, "threshold": 15.0, "left": 1, "right": 2 },
                { "leaf": -1.0 },
                { "leaf": 1.0 }
            ] },
            { "nodes": [
                { "feature": 5, "threshold": 2.5, "left": 1, "right": 2, "missing_left": false },
                { "leaf": -0.5 },
                { "leaf": 0.5 }
            ] }
        ]
    });
    document["scaler"] = json!({ "mean": vec![0.0; 10], "scale": vec![1.0; 10] });
    document
}

#[test]
fn logistic_document_loads() {
    let bundle =
        ArtifactBundle::from_document(document_map(logistic_document())).expect("bundle loads");

    assert_eq!(bundle.model().kind(), "logistic");
    assert_eq!(bundle.model().n_features(), Some(10));
    assert_eq!(bundle.threshold(), 0.5);
    assert_eq!(bundle.scaler().n_features(), 10);
    assert_eq!(bundle.loan_intent_encoder().encode("PERSONAL"), Some(4));
    assert!(bundle.source().path.is_none());
}

#[test]
fn every_missing_key_is_reported() {
    for key in REQUIRED_KEYS {
        let mut document = document_map(logistic_document());
        document.remove(key);

        match ArtifactBundle::from_document(document) {
            Err(ArtifactLoadError::MissingKey { key: missing }) => assert_eq!(missing, key),
            other => panic!("expected missing {key}, got {other:?}"),
        }
    }
}

#[test]
fn threshold_outside_unit_interval_is_rejected() {
    for threshold in [-0.1, 1.01] {
        let mut document = logistic_document();
        document["threshold"] = json!(threshold);

        match ArtifactBundle::from_document(document_map(document)) {
            Err(ArtifactLoadError::InvalidThreshold(value)) => assert_eq!(value, threshold),
            other => panic!("expected invalid threshold, got {other:?}"),
        }
    }
}

#[test]
fn non_numeric_threshold_is_an_invalid_entry() {
    let mut document = logistic_document();
    document["threshold"] = json!("high");

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
    assert!(matches!(
        err,
        ArtifactLoadError::InvalidEntry { key: "threshold", .. }
    ));
}

#[test]
fn unknown_model_kind_is_an_invalid_entry() {
    let mut document = logistic_document();
    document["best_model"] = json!({ "kind": "svm", "support_vectors": [] });

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
    assert!(matches!(
        err,
        ArtifactLoadError::InvalidEntry { key: "best_model", .. }
    ));
}

#[test]
fn scaler_columns_must_agree() {
    let mut document = logistic_document();
    document["scaler"]["scale"] = json!([1.0, 1.0]);

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
    assert!(matches!(
        err,
        ArtifactLoadError::Inconsistent { key: "scaler", .. }
    ));
}

#[test]
fn model_width_must_match_scaler() {
    let mut document = logistic_document();
    document["best_model"]["coefficients"] = json!([1.0, 2.0, 3.0]);

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
    assert!(matches!(
        err,
        ArtifactLoadError::Inconsistent { key: "best_model", .. }
    ));
}

#[test]
fn duplicate_encoder_categories_are_rejected() {
    let mut document = logistic_document();
    document["loanencoder"] = json!({ "categories": ["PERSONAL", "PERSONAL"] });

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
    assert!(matches!(
        err,
        ArtifactLoadError::Inconsistent { key: "loanencoder", .. }
    ));
}

#[test]
fn tree_ensemble_sums_leaves_in_logit_space() {
    let bundle = ArtifactBundle::from_document(document_map(tree_document())).expect("loads");
    assert_eq!(bundle.model().kind(), "gradient_boosted_trees");

    // interest 12.5 goes left (-1.0), grade code 1 goes left (-0.5)
    let mut row = [0.0; 10];
    row[7] = 12.5;
    row[5] = 1.0;
    let probability = bundle.model().predict_proba(&row).expect("predicts");
    assert!((probability - 1.0 / (1.0 + 1.5f64.exp())).abs() < 1e-12);

    // a value equal to the split threshold goes right
    row[7] = 15.0;
    row[5] = 2.5;
    let probability = bundle.model().predict_proba(&row).expect("predicts");
    assert!((probability - 1.0 / (1.0 + (-1.5f64).exp())).abs() < 1e-12);
}

#[test]
fn tree_ensemble_follows_missing_direction() {
    let bundle = ArtifactBundle::from_document(document_map(tree_document())).expect("loads");

    let mut row = [0.0; 10];
    row[7] = f64::NAN;
    row[5] = f64::NAN;
    // first tree defaults left (-1.0), second is configured right (+0.5)
    let probability = bundle.model().predict_proba(&row).expect("predicts");
    assert!((probability - 1.0 / (1.0 + 0.5f64.exp())).abs() < 1e-12);
}

#[test]
fn tree_ensemble_rejects_wrong_width() {
    let bundle = ArtifactBundle::from_document(document_map(tree_document())).expect("loads");

    let err = bundle.model().predict_proba(&[0.0; 4]).expect_err("too narrow");
    assert_eq!(
        err,
        ScoringError::ArityMismatch {
            stage: "model",
            expected: 10,
            actual: 4,
        }
    );
}

#[test]
fn tree_with_backward_child_is_rejected() {
    let mut document = tree_document();
    document["best_model"]["trees"][0]["nodes"][0]["left"] = json!(0);

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("cycle");
    assert!(matches!(
        err,
        ArtifactLoadError::Inconsistent { key: "best_model", .. }
    ));
}

#[test]
fn split_on_undeclared_feature_is_rejected() {
    let mut document = tree_document();
    document["best_model"]["trees"][1]["nodes"][0]["feature"] = json!(10);

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
    assert!(matches!(
        err,
        ArtifactLoadError::Inconsistent { key: "best_model", .. }
    ));
}

#[test]
fn split_on_maximum_feature_index_is_rejected() {
    for declared in [json!(null), json!(10)] {
        let mut document = tree_document();
        document["best_model"]["num_feature"] = declared;
        document["best_model"]["trees"][0]["nodes"][0]["feature"] = json!(u64::MAX);

        let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
        assert!(matches!(
            err,
            ArtifactLoadError::Inconsistent { key: "best_model", .. }
        ));
    }
}

#[test]
fn undeclared_tree_width_must_fit_the_scaler() {
    let mut document = tree_document();
    document["best_model"]
        .as_object_mut()
        .expect("model object")
        .remove("num_feature");
    document["best_model"]["trees"][0]["nodes"][0]["feature"] = json!(12);

    let err = ArtifactBundle::from_document(document_map(document)).expect_err("rejected");
    match err {
        ArtifactLoadError::Inconsistent { key, detail } => {
            assert_eq!(key, "best_model");
            assert!(detail.contains("at least 13"), "{detail}");
        }
        other => panic!("expected inconsistent model, got {other:?}"),
    }
}

#[test]
fn undeclared_tree_width_within_the_scaler_loads() {
    let mut document = tree_document();
    document["best_model"]
        .as_object_mut()
        .expect("model object")
        .remove("num_feature");

    let bundle = ArtifactBundle::from_document(document_map(document)).expect("loads");
    assert_eq!(bundle.model().n_features(), None);
    assert_eq!(bundle.model().min_features(), Some(8));

    let err = bundle.model().predict_proba(&[0.0; 4]).expect_err("too narrow");
    assert_eq!(
        err,
        ScoringError::ArityMismatch {
            stage: "model",
            expected: 8,
            actual: 4,
        }
    );
}

#[test]
fn tree_spec_round_trips_through_serde() {
    let spec: ModelSpec =
        serde_json::from_value(tree_document()["best_model"].clone()).expect("parses");
    let value = serde_json::to_value(&spec).expect("serializes");
    assert_eq!(value["kind"], "gradient_boosted_trees");
    assert_eq!(value["trees"][0]["nodes"][1]["leaf"], -1.0);
}

#[test]
fn load_reads_bundle_from_disk() {
    let path = scratch_file("valid", &logistic_document().to_string());

    let bundle = ArtifactBundle::load(&path).expect("bundle loads");
    assert_eq!(bundle.source().path.as_deref(), Some(path.as_path()));

    fs::remove_file(path).ok();
}

#[test]
fn load_reports_missing_file() {
    let path = std::env::temp_dir().join("credit-risk-does-not-exist.json");

    let err = ArtifactBundle::load(&path).expect_err("missing file");
    assert!(matches!(err, ArtifactLoadError::Read { .. }));
}

#[test]
fn load_reports_malformed_json() {
    let path = scratch_file("malformed", "{ \"best_model\": ");

    let err = ArtifactBundle::load(&path).expect_err("malformed");
    assert!(matches!(err, ArtifactLoadError::Malformed { .. }));

    fs::remove_file(path).ok();
}
