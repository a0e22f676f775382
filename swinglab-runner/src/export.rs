//! Export: JSON and CSV artifact generation.
//!
//! - **JSON**: full round-trip serialization of a `RunResult` with schema versioning
//! - **CSV**: per-bar output rows and the trade log for external analysis tools
//!
//! Persisted JSON carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use serde::Serialize;
use swinglab_core::{OutputRow, TradeEvent};
use thiserror::Error;

use crate::runner::{RunResult, SCHEMA_VERSION};
use crate::teaching::format_teaching_log;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unsupported schema version {found} (max supported: {max})")]
    UnsupportedSchema { found: u32, max: u32 },
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunResult` to pretty JSON.
pub fn export_json(result: &RunResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Deserialize a `RunResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunResult, ExportError> {
    let result: RunResult = serde_json::from_str(json)?;
    if result.schema_version > SCHEMA_VERSION {
        return Err(ExportError::UnsupportedSchema {
            found: result.schema_version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export per-bar output rows as CSV, one column per field.
///
/// `trade_equity` is blank on bars that end in a position.
pub fn export_output_csv(rows: &[OutputRow]) -> Result<String, ExportError> {
    serialize_csv(rows)
}

/// Export the trade log as CSV. `pnl` is blank for entries.
pub fn export_trades_csv(trades: &[TradeEvent]) -> Result<String, ExportError> {
    serialize_csv(trades)
}

fn serialize_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(data)?)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single run.
///
/// Creates a directory named `{strategy}_{run_id prefix}/` under `output_dir`
/// containing:
/// - `result.json`: the full `RunResult`
/// - `output.csv`: per-bar output rows
/// - `trades.csv`: trade log
/// - `teaching_log.txt`: rendered teaching log (first `teaching_rows` events)
///
/// Returns the path to the created directory.
pub fn save_artifacts(
    result: &RunResult,
    output_dir: &Path,
    teaching_rows: usize,
) -> Result<PathBuf, ExportError> {
    let prefix: String = result.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{}_{prefix}", result.strategy));
    std::fs::create_dir_all(&run_dir).map_err(|source| ExportError::Io {
        path: run_dir.clone(),
        source,
    })?;

    write_file(&run_dir.join("result.json"), &export_json(result)?)?;
    write_file(
        &run_dir.join("output.csv"),
        &export_output_csv(&result.output.rows)?,
    )?;
    write_file(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;
    write_file(
        &run_dir.join("teaching_log.txt"),
        &format_teaching_log(&result.trades, teaching_rows),
    )?;

    Ok(run_dir)
}

/// Load a `RunResult` from an artifact directory's result.json.
pub fn load_artifacts(dir: &Path) -> Result<RunResult, ExportError> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
