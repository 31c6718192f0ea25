//! Payload types for the external data endpoint.
//!
//! The payload is externally controlled and only partially shaped, so every
//! field is optional and event fields stay as raw JSON values. Deserialization
//! must succeed for any JSON object; shaping happens in the projection layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event discriminator for validation-epoch entries in the metric log.
pub const VALIDATION_EVENT: &str = "val_epoch_end";

/// Event discriminator for training-step entries in the metric log.
pub const TRAINING_EVENT: &str = "train_step";

/// A prediction row, keyed by column name.
pub type Row = Map<String, Value>;

/// The raw document returned by the external data endpoint.
///
/// Replaced wholesale on every successful fetch, never mutated field-by-field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunPayload {
    /// Filesystem root the server actually read from.
    #[serde(default)]
    pub base_path: Option<String>,

    /// Path the server was configured with; may differ from `base_path`.
    #[serde(default)]
    pub configured_path: Option<String>,

    /// Append-ordered heterogeneous event log.
    #[serde(default)]
    pub metrics: Option<Vec<MetricEvent>>,

    /// Prediction sample table.
    #[serde(default)]
    pub predictions: Option<PredictionTable>,

    /// Arbitrary probe-summary document, rendered verbatim.
    #[serde(default)]
    pub probe: Option<Map<String, Value>>,

    /// Which artifact files the server found on disk.
    #[serde(default)]
    pub files: Option<FilePresence>,
}

impl RunPayload {
    /// True when the document carried no fields at all (a bare `{}`).
    ///
    /// An empty payload is treated as a failed fetch, not a loaded one, so a
    /// misconfigured endpoint cannot masquerade as a run with no artifacts.
    pub fn is_empty(&self) -> bool {
        self.base_path.is_none()
            && self.configured_path.is_none()
            && self.metrics.is_none()
            && self.predictions.is_none()
            && self.probe.is_none()
            && self.files.is_none()
    }
}

/// One entry of the metric event log.
///
/// Only `event` is interpreted; the known metric fields are kept as raw
/// values because the producer makes no type guarantees for them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricEvent {
    /// Event discriminator (`"val_epoch_end"`, `"train_step"`, or other).
    #[serde(default)]
    pub event: Option<String>,

    #[serde(default)]
    pub epoch: Option<Value>,

    #[serde(default)]
    pub step: Option<Value>,

    #[serde(default)]
    pub auroc: Option<Value>,

    #[serde(default)]
    pub auprc: Option<Value>,

    #[serde(default)]
    pub brier: Option<Value>,

    #[serde(default)]
    pub train_loss: Option<Value>,

    #[serde(default)]
    pub lr: Option<Value>,

    #[serde(default)]
    pub time: Option<Value>,

    /// Fields this viewer does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricEvent {
    /// Whether this entry carries the given event discriminator.
    pub fn is_event(&self, kind: &str) -> bool {
        self.event.as_deref() == Some(kind)
    }
}

/// Prediction sample table: column order plus row maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionTable {
    #[serde(default)]
    pub columns: Option<Vec<String>>,

    #[serde(default)]
    pub rows: Option<Vec<Row>>,
}

/// Presence flags for the well-known artifact files.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FilePresence {
    #[serde(default)]
    pub metrics: bool,

    #[serde(default)]
    pub predictions: bool,

    #[serde(default)]
    pub probe: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_deserializes_to_empty_payload() {
        let payload: RunPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_any_field_makes_payload_non_empty() {
        let payload: RunPayload = serde_json::from_str(r#"{"base_path": "/runs/a"}"#).unwrap();
        assert!(!payload.is_empty());

        let payload: RunPayload = serde_json::from_str(r#"{"metrics": []}"#).unwrap();
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_metric_event_keeps_unknown_fields() {
        let event: MetricEvent = serde_json::from_str(
            r#"{"event": "val_epoch_end", "epoch": 3, "auroc": 0.91, "fold": "holdout"}"#,
        )
        .unwrap();

        assert!(event.is_event(VALIDATION_EVENT));
        assert_eq!(event.epoch, Some(serde_json::json!(3)));
        assert_eq!(event.extra.get("fold"), Some(&serde_json::json!("holdout")));
    }

    #[test]
    fn test_metric_event_tolerates_missing_discriminator() {
        let event: MetricEvent = serde_json::from_str(r#"{"loss": 0.2}"#).unwrap();
        assert!(event.event.is_none());
        assert!(!event.is_event(TRAINING_EVENT));
    }

    #[test]
    fn test_metric_event_tolerates_mistyped_fields() {
        // The producer makes no type guarantees; a string epoch must not
        // fail deserialization of the whole payload.
        let event: MetricEvent =
            serde_json::from_str(r#"{"event": "train_step", "epoch": "2", "lr": null}"#).unwrap();
        assert!(event.is_event(TRAINING_EVENT));
        assert_eq!(event.epoch, Some(serde_json::json!("2")));
        assert!(event.lr.is_none(), "explicit null collapses to absent");
    }
}
