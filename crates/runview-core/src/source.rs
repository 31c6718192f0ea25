//! Local artifact-directory source.
//!
//! Assembles the same payload the external data endpoint serves, by reading
//! the three well-known artifact files straight from a run directory. Missing
//! files yield empty sections; a file that exists but cannot be parsed is an
//! error, because silently showing half a run is worse than failing.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ViewerError, ViewerResult};
use crate::types::{FilePresence, MetricEvent, PredictionTable, Row, RunPayload};

/// Append-ordered metric event log, one JSON object per line.
pub const METRICS_FILE: &str = "metrics.jsonl";

/// Validation prediction samples.
pub const PREDICTIONS_FILE: &str = "preds_val.csv";

/// Probe-summary document, rendered verbatim.
pub const PROBE_FILE: &str = "probe_ethnicity.json";

/// Row cap applied when the caller does not ask for one.
pub const DEFAULT_MAX_PREDICTION_ROWS: u32 = 500;

/// Hard ceiling on the row cap.
pub const MAX_PREDICTION_ROWS: u32 = 5000;

/// A resolved run directory.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
    configured: String,
}

impl ArtifactDir {
    /// Resolve a configured path into an existing run directory.
    ///
    /// Expands a leading `~`, converts Windows drive paths to their WSL
    /// mount equivalents when running on POSIX, and canonicalizes.
    pub fn resolve(configured: &str) -> ViewerResult<Self> {
        let normalized = normalize_artifact_path(configured);
        let expanded = expand_home(&normalized);

        let root = expanded.canonicalize().map_err(|e| ViewerError::Source {
            message: format!("configured path {} cannot be resolved: {}", expanded.display(), e),
        })?;

        if !root.is_dir() {
            return Err(ViewerError::Source {
                message: format!("configured path {} is not a directory", root.display()),
            });
        }

        Ok(Self {
            root,
            configured: configured.to_string(),
        })
    }

    /// The resolved directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the artifact files into a payload.
    ///
    /// The row cap defaults to [`DEFAULT_MAX_PREDICTION_ROWS`] and is
    /// clamped to `1..=MAX_PREDICTION_ROWS`.
    pub fn load(&self, max_prediction_rows: Option<u32>) -> ViewerResult<RunPayload> {
        let cap = max_prediction_rows
            .unwrap_or(DEFAULT_MAX_PREDICTION_ROWS)
            .clamp(1, MAX_PREDICTION_ROWS) as usize;

        debug!(root = %self.root.display(), cap = cap, "loading artifact directory");

        let metrics_path = self.root.join(METRICS_FILE);
        let predictions_path = self.root.join(PREDICTIONS_FILE);
        let probe_path = self.root.join(PROBE_FILE);

        let files = FilePresence {
            metrics: metrics_path.exists(),
            predictions: predictions_path.exists(),
            probe: probe_path.exists(),
        };

        Ok(RunPayload {
            base_path: Some(self.root.display().to_string()),
            configured_path: Some(self.configured.clone()),
            metrics: Some(load_metrics_file(&metrics_path)?),
            predictions: Some(load_predictions_file(&predictions_path, cap)?),
            probe: Some(load_probe_file(&probe_path)?),
            files: Some(files),
        })
    }
}

fn load_metrics_file(path: &Path) -> ViewerResult<Vec<MetricEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = read_artifact(path)?;
    let mut metrics = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: MetricEvent =
            serde_json::from_str(line).map_err(|e| ViewerError::Source {
                message: format!("unable to parse metrics file {}: {}", METRICS_FILE, e),
            })?;
        metrics.push(event);
    }

    Ok(metrics)
}

fn load_predictions_file(path: &Path, cap: usize) -> ViewerResult<PredictionTable> {
    if !path.exists() {
        return Ok(PredictionTable {
            columns: Some(Vec::new()),
            rows: Some(Vec::new()),
        });
    }

    let content = read_artifact(path)?;
    let mut lines = content.lines().map(|l| l.trim_end_matches('\r'));

    let columns: Vec<String> = match lines.next() {
        Some(header) if !header.is_empty() => split_csv_record(header),
        _ => Vec::new(),
    };

    let mut rows: Vec<Row> = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let fields = split_csv_record(line);
        let mut row = Map::new();
        for (column, field) in columns.iter().zip(fields) {
            row.insert(column.clone(), Value::String(field));
        }
        rows.push(row);
        if rows.len() >= cap {
            break;
        }
    }

    Ok(PredictionTable {
        columns: Some(columns),
        rows: Some(rows),
    })
}

fn load_probe_file(path: &Path) -> ViewerResult<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = read_artifact(path)?;
    serde_json::from_str(&content).map_err(|e| ViewerError::Source {
        message: format!("unable to parse probe file {}: {}", PROBE_FILE, e),
    })
}

fn read_artifact(path: &Path) -> ViewerResult<String> {
    std::fs::read_to_string(path).map_err(|e| ViewerError::Source {
        message: format!("unable to read {}: {}", path.display(), e),
    })
}

/// Split one CSV record, honoring double-quoted fields and `""` escapes.
///
/// Records never span lines in the artifact files this loader reads.
fn split_csv_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Convert Windows-style drive paths (`C:\Users\...`) to their WSL-mounted
/// equivalents when running in a POSIX environment. Helps when the path was
/// configured from a Windows shell but the viewer runs under WSL.
fn normalize_artifact_path(raw: &str) -> String {
    if cfg!(windows) {
        return raw.to_string();
    }

    static DRIVE: OnceLock<Regex> = OnceLock::new();
    let pattern = DRIVE
        .get_or_init(|| Regex::new(r"^(?P<drive>[a-zA-Z]):[\\/](?P<rest>.*)$").expect("drive pattern"));

    match pattern.captures(raw) {
        Some(caps) => {
            let drive = caps["drive"].to_lowercase();
            let rest = caps["rest"].replace('\\', "/");
            format!("/mnt/{}/{}", drive, rest)
        }
        None => raw.to_string(),
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv_record_plain() {
        assert_eq!(split_csv_record("id,y_true,y_prob"), vec!["id", "y_true", "y_prob"]);
        assert_eq!(split_csv_record("1,0,0.12"), vec!["1", "0", "0.12"]);
    }

    #[test]
    fn test_split_csv_record_quoted() {
        assert_eq!(
            split_csv_record(r#"1,"a, b","say ""hi"""#),
            vec!["1", "a, b", r#"say "hi""#]
        );
        assert_eq!(split_csv_record("a,,c"), vec!["a", "", "c"]);
        assert_eq!(split_csv_record("trailing,"), vec!["trailing", ""]);
    }

    #[test]
    fn test_normalize_windows_drive_path() {
        if cfg!(windows) {
            return;
        }
        assert_eq!(
            normalize_artifact_path(r"C:\Users\me\runs"),
            "/mnt/c/Users/me/runs"
        );
        assert_eq!(normalize_artifact_path("D:/data/run1"), "/mnt/d/data/run1");
        assert_eq!(normalize_artifact_path("/already/posix"), "/already/posix");
        assert_eq!(normalize_artifact_path("relative/path"), "relative/path");
    }
}
