//! Pure derivations from a raw payload into display-ready views.
//!
//! Every function here is total over arbitrary (possibly malformed) input:
//! absent or unrecognized data degrades to empty views or a placeholder
//! string, never to a panic. Nothing in this module performs I/O or holds
//! state; views are recomputed from the payload on demand.

use serde_json::Value;

use crate::types::{MetricEvent, Row, RunPayload, TRAINING_EVENT, VALIDATION_EVENT};

/// How many prediction rows the preview shows.
pub const PREVIEW_ROWS: usize = 20;

/// Placeholder glyph for absent values.
pub const MISSING_VALUE: &str = "—";

/// Validation-epoch entries of the metric log, in original log order.
pub fn validation_view(payload: &RunPayload) -> Vec<&MetricEvent> {
    events_with(payload, VALIDATION_EVENT)
}

/// Training-step entries of the metric log, in original log order.
pub fn training_view(payload: &RunPayload) -> Vec<&MetricEvent> {
    events_with(payload, TRAINING_EVENT)
}

fn events_with<'a>(payload: &'a RunPayload, kind: &str) -> Vec<&'a MetricEvent> {
    payload
        .metrics
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|event| event.is_event(kind))
        .collect()
}

/// The first [`PREVIEW_ROWS`] prediction rows plus the true row count,
/// so a consumer can render "showing K of N".
#[derive(Debug, Clone)]
pub struct PredictionPreview<'a> {
    pub rows: Vec<&'a Row>,
    pub total_rows: usize,
}

impl PredictionPreview<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Preview of the prediction table, in original row order.
pub fn prediction_preview(payload: &RunPayload) -> PredictionPreview<'_> {
    let rows = payload
        .predictions
        .as_ref()
        .and_then(|table| table.rows.as_deref())
        .unwrap_or_default();

    PredictionPreview {
        rows: rows.iter().take(PREVIEW_ROWS).collect(),
        total_rows: rows.len(),
    }
}

/// Render one scalar cell for display.
///
/// Absent and null values become the placeholder glyph; strings render
/// without their surrounding quotes; every other JSON shape falls back to
/// compact JSON. Total over any input.
pub fn format_scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING_VALUE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// The configured path, but only when it tells the reader something the
/// base path does not. Absence means "show no secondary path".
pub fn resolved_configured_path(payload: &RunPayload) -> Option<&str> {
    let configured = payload.configured_path.as_deref()?;
    if payload.base_path.as_deref() == Some(configured) {
        None
    } else {
        Some(configured)
    }
}
