//! Integration tests for the local artifact-directory loader.

use std::fs;

use runview_core::{projection, ArtifactDir, ViewerError};
use tempfile::TempDir;

fn write_full_run(dir: &TempDir) {
    fs::write(
        dir.path().join("metrics.jsonl"),
        concat!(
            "{\"event\": \"val_epoch_end\", \"epoch\": 1, \"auroc\": 0.91, \"auprc\": 0.45, \"brier\": 0.08}\n",
            "\n",
            "{\"event\": \"train_step\", \"step\": 100, \"epoch\": 1, \"train_loss\": 0.52, \"lr\": 0.001}\n",
            "{\"event\": \"checkpoint_saved\", \"path\": \"ckpt.pt\"}\n",
        ),
    )
    .unwrap();

    fs::write(
        dir.path().join("preds_val.csv"),
        "id,y_true,y_prob\n1,0,0.12\n2,1,0.87\n3,0,0.33\n",
    )
    .unwrap();

    fs::write(
        dir.path().join("probe_ethnicity.json"),
        r#"{"groups": {"a": {"auroc": 0.9}, "b": {"auroc": 0.88}}}"#,
    )
    .unwrap();
}

#[test]
fn test_load_full_run_directory() {
    let dir = TempDir::new().unwrap();
    write_full_run(&dir);

    let source = ArtifactDir::resolve(dir.path().to_str().unwrap()).expect("resolve failed");
    let payload = source.load(None).expect("load failed");

    assert!(!payload.is_empty());
    assert_eq!(
        payload.configured_path.as_deref(),
        dir.path().to_str(),
        "configured path is the raw input"
    );

    let files = payload.files.expect("presence flags");
    assert!(files.metrics && files.predictions && files.probe);

    // Blank lines skipped, all three events kept.
    assert_eq!(payload.metrics.as_ref().map(Vec::len), Some(3));
    assert_eq!(projection::validation_view(&payload).len(), 1);
    assert_eq!(projection::training_view(&payload).len(), 1);

    let predictions = payload.predictions.as_ref().unwrap();
    assert_eq!(
        predictions.columns.as_deref(),
        Some(["id", "y_true", "y_prob"].map(String::from).as_slice())
    );
    let preview = projection::prediction_preview(&payload);
    assert_eq!(preview.len(), 3);
    assert_eq!(
        preview.rows[1].get("y_prob"),
        Some(&serde_json::json!("0.87"))
    );

    assert!(!payload.probe.as_ref().unwrap().is_empty());
}

#[test]
fn test_row_cap_default_and_clamp() {
    let dir = TempDir::new().unwrap();

    let mut csv = String::from("id\n");
    for i in 0..10 {
        csv.push_str(&format!("{}\n", i));
    }
    fs::write(dir.path().join("preds_val.csv"), csv).unwrap();

    let source = ArtifactDir::resolve(dir.path().to_str().unwrap()).unwrap();

    let payload = source.load(Some(5)).unwrap();
    assert_eq!(projection::prediction_preview(&payload).total_rows, 5);

    // A zero cap clamps up to one row instead of rejecting the request.
    let payload = source.load(Some(0)).unwrap();
    assert_eq!(projection::prediction_preview(&payload).total_rows, 1);

    let payload = source.load(None).unwrap();
    assert_eq!(projection::prediction_preview(&payload).total_rows, 10);
}

#[test]
fn test_missing_files_yield_empty_sections() {
    let dir = TempDir::new().unwrap();

    let source = ArtifactDir::resolve(dir.path().to_str().unwrap()).unwrap();
    let payload = source.load(None).unwrap();

    // The payload still names its paths, so the section shells can render.
    assert!(!payload.is_empty());
    assert!(payload.base_path.is_some());

    let files = payload.files.unwrap();
    assert!(!files.metrics && !files.predictions && !files.probe);

    assert_eq!(payload.metrics.as_ref().map(Vec::len), Some(0));
    assert!(projection::prediction_preview(&payload).is_empty());
    assert!(payload.probe.as_ref().unwrap().is_empty());
}

#[test]
fn test_malformed_metrics_line_is_source_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("metrics.jsonl"),
        "{\"event\": \"train_step\"}\nnot json at all\n",
    )
    .unwrap();

    let source = ArtifactDir::resolve(dir.path().to_str().unwrap()).unwrap();
    let result = source.load(None);

    match result {
        Err(ViewerError::Source { message }) => {
            assert!(message.contains("metrics.jsonl"), "got: {}", message);
        }
        other => panic!("expected Source error, got {:?}", other),
    }
}

#[test]
fn test_malformed_probe_is_source_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("probe_ethnicity.json"), "[1, 2").unwrap();

    let source = ArtifactDir::resolve(dir.path().to_str().unwrap()).unwrap();
    let result = source.load(None);

    assert!(matches!(result, Err(ViewerError::Source { .. })));
}

#[test]
fn test_resolve_rejects_missing_directory() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let result = ArtifactDir::resolve(missing.to_str().unwrap());
    assert!(matches!(result, Err(ViewerError::Source { .. })));
}

#[test]
fn test_resolve_rejects_plain_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("metrics.jsonl");
    fs::write(&file, "{}").unwrap();

    let result = ArtifactDir::resolve(file.to_str().unwrap());
    assert!(matches!(result, Err(ViewerError::Source { .. })));
}

#[test]
fn test_quoted_csv_fields() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("preds_val.csv"),
        "id,note\n1,\"low, uncertain\"\n",
    )
    .unwrap();

    let source = ArtifactDir::resolve(dir.path().to_str().unwrap()).unwrap();
    let payload = source.load(None).unwrap();

    let preview = projection::prediction_preview(&payload);
    assert_eq!(
        preview.rows[0].get("note"),
        Some(&serde_json::json!("low, uncertain"))
    );
}
