//! Text rendering of the derived views.
//!
//! Each section renders independently: a failed fetch or an absent view
//! prints that section's empty state, never a blank report.

use runview_core::projection::{
    format_scalar, prediction_preview, resolved_configured_path, training_view, validation_view,
};
use runview_core::{MetricEvent, RunPayload};

pub fn render_report(data: Option<&RunPayload>, error: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str("External metric preview\n");
    let base = data
        .and_then(|p| p.base_path.as_deref())
        .unwrap_or("n/a");
    match data.and_then(resolved_configured_path) {
        Some(configured) => out.push_str(&format!(
            "Reading from {} (configured as {})\n",
            base, configured
        )),
        None => out.push_str(&format!("Reading from {}\n", base)),
    }
    out.push('\n');

    if let Some(message) = error {
        out.push_str(&format!("Unable to load external metrics: {}\n\n", message));
    }

    render_validation_section(&mut out, data);
    render_training_section(&mut out, data);
    render_prediction_section(&mut out, data);
    render_probe_section(&mut out, data);

    out
}

fn render_validation_section(out: &mut String, data: Option<&RunPayload>) {
    let events = data.map(validation_view).unwrap_or_default();

    out.push_str("Validation metrics\n");
    out.push_str(&format!(
        "Showing {} epochs from metrics.jsonl\n",
        events.len()
    ));

    if events.is_empty() {
        out.push_str("No validation metrics found.\n\n");
        return;
    }

    let rows: Vec<Vec<String>> = events.iter().map(|e| validation_row(e)).collect();
    out.push_str(&render_table(
        &["Epoch", "AUROC", "AUPRC", "Brier", "Timestamp"],
        &rows,
    ));
    out.push('\n');
}

fn validation_row(event: &MetricEvent) -> Vec<String> {
    vec![
        format_scalar(event.epoch.as_ref()),
        format_scalar(event.auroc.as_ref()),
        format_scalar(event.auprc.as_ref()),
        format_scalar(event.brier.as_ref()),
        format_scalar(event.time.as_ref()),
    ]
}

fn render_training_section(out: &mut String, data: Option<&RunPayload>) {
    let events = data.map(training_view).unwrap_or_default();

    out.push_str("Training loss\n");
    out.push_str(&format!(
        "Showing {} steps from metrics.jsonl\n",
        events.len()
    ));

    if events.is_empty() {
        out.push_str("No training metrics found.\n\n");
        return;
    }

    let rows: Vec<Vec<String>> = events
        .iter()
        .map(|e| {
            vec![
                format_scalar(e.step.as_ref()),
                format_scalar(e.epoch.as_ref()),
                format_scalar(e.train_loss.as_ref()),
                format_scalar(e.lr.as_ref()),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["Step", "Epoch", "Train Loss", "Learning Rate"],
        &rows,
    ));
    out.push('\n');
}

fn render_prediction_section(out: &mut String, data: Option<&RunPayload>) {
    out.push_str("Prediction samples\n");

    let Some(payload) = data else {
        out.push_str("Previewing 0 of 0 rows from preds_val.csv\n");
        out.push_str("No predictions found.\n\n");
        return;
    };

    let preview = prediction_preview(payload);
    out.push_str(&format!(
        "Previewing {} of {} rows from preds_val.csv\n",
        preview.len(),
        preview.total_rows
    ));

    if preview.is_empty() {
        out.push_str("No predictions found.\n\n");
        return;
    }

    let columns: Vec<&str> = payload
        .predictions
        .as_ref()
        .and_then(|t| t.columns.as_ref())
        .map(|cols| cols.iter().map(String::as_str).collect())
        .unwrap_or_default();

    let rows: Vec<Vec<String>> = preview
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| format_scalar(row.get(*col)))
                .collect()
        })
        .collect();

    out.push_str(&render_table(&columns, &rows));
    out.push('\n');
}

fn render_probe_section(out: &mut String, data: Option<&RunPayload>) {
    out.push_str("Probe summary\n");
    out.push_str("Rendering contents of probe_ethnicity.json\n");

    match data.and_then(|p| p.probe.as_ref()) {
        Some(probe) if !probe.is_empty() => {
            let rendered = serde_json::to_string_pretty(probe)
                .unwrap_or_else(|_| "{}".to_string());
            out.push_str(&rendered);
            out.push_str("\n\n");
        }
        _ => out.push_str("No probe data found.\n\n"),
    }
}

/// Pad every column to its widest cell.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    render_row(&mut out, headers.iter().copied(), &widths);
    for row in rows {
        render_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn render_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let rendered: Vec<String> = cells
        .enumerate()
        .map(|(i, cell)| {
            let width = widths.get(i).copied().unwrap_or(0);
            format!("{:<width$}", cell, width = width)
        })
        .collect();
    out.push_str(rendered.join("  ").trim_end());
    out.push('\n');
}
