//! CSV bar ingestion.
//!
//! Column handling:
//! - Header names are case-insensitive.
//! - A `timestamp` column is used when present, otherwise `date`.
//! - Short aliases `o`, `h`, `l`, `c`, `v` stand in for the full OHLCV names.
//! - `open`, `high`, `low`, `close` are required; `volume` defaults to 0.
//! - An optional numeric `signal` column is read as precomputed signals.
//!
//! Rows are sorted by timestamp after loading. When a timestamp repeats, the
//! last row in file order wins and the earlier ones are dropped with a warning.
//! Empty numeric cells load as NaN, which downstream code treats as undefined.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use swinglab_core::{Bar, Signal};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV must contain either a 'timestamp' or a 'date' column")]
    MissingTimestampColumn,

    #[error("CSV missing required column: '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: cannot parse timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: cannot parse {column} value '{value}'")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("data file contains no rows")]
    Empty,
}

/// Bars loaded from one file.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Bars in strictly increasing timestamp order.
    pub bars: Vec<Bar>,
    /// Precomputed signals, aligned with `bars`, when the file has a `signal` column.
    pub signals: Option<Vec<Signal>>,
    /// Rows dropped because a later row carried the same timestamp.
    pub duplicates_dropped: usize,
    /// Non-void rows failing the OHLC sanity check. They are kept as loaded.
    pub insane_rows: usize,
    /// BLAKE3 hash over the loaded bar data.
    pub dataset_hash: String,
}

/// Load bars from a CSV file on disk.
pub fn load_csv(path: &Path) -> Result<LoadedData, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let data = read_bars(reader)?;
    debug!(
        path = %path.display(),
        bars = data.bars.len(),
        dataset_hash = %data.dataset_hash,
        "loaded bars"
    );
    Ok(data)
}

/// Load bars from any CSV source (file contents, in-memory buffers).
pub fn parse_csv<R: Read>(source: R) -> Result<LoadedData, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    read_bars(reader)
}

fn read_bars<R: Read>(mut reader: csv::Reader<R>) -> Result<LoadedData, LoadError> {
    let columns = ColumnMap::from_headers(reader.headers()?)?;

    let mut rows: Vec<(Bar, Option<Signal>)> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1
        rows.push(columns.parse_row(&record, i + 2)?);
    }
    if rows.is_empty() {
        return Err(LoadError::Empty);
    }

    let total = rows.len();
    // Stable: rows sharing a timestamp stay in file order
    rows.sort_by_key(|(bar, _)| bar.timestamp);

    let mut deduped: Vec<(Bar, Option<Signal>)> = Vec::with_capacity(rows.len());
    for row in rows {
        match deduped.last_mut() {
            Some(last) if last.0.timestamp == row.0.timestamp => *last = row,
            _ => deduped.push(row),
        }
    }

    let duplicates_dropped = total - deduped.len();
    if duplicates_dropped > 0 {
        warn!(
            duplicates_dropped,
            "duplicate timestamps in data file, keeping the last row of each"
        );
    }

    let has_signals = columns.signal.is_some();
    let (bars, signals): (Vec<Bar>, Vec<Option<Signal>>) = deduped.into_iter().unzip();
    let signals = has_signals.then(|| signals.into_iter().map(Option::unwrap_or_default).collect());
    let dataset_hash = compute_dataset_hash(&bars);

    // Void rows are expected gaps; only fully populated rows are checked
    let insane_rows = bars.iter().filter(|b| !b.is_void() && !b.is_sane()).count();
    if insane_rows > 0 {
        warn!(insane_rows, "rows with inconsistent OHLC values (high < low, non-positive prices)");
    }

    Ok(LoadedData {
        bars,
        signals,
        duplicates_dropped,
        insane_rows,
        dataset_hash,
    })
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
    signal: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let names: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        // Full names take precedence over single-letter aliases
        let find = |full: &str, alias: Option<&str>| {
            names
                .iter()
                .position(|n| n == full)
                .or_else(|| alias.and_then(|a| names.iter().position(|n| n == a)))
        };
        let require = |full: &'static str, alias: &str| {
            find(full, Some(alias)).ok_or(LoadError::MissingColumn(full))
        };

        let timestamp = find("timestamp", None)
            .or_else(|| find("date", None))
            .ok_or(LoadError::MissingTimestampColumn)?;

        Ok(Self {
            timestamp,
            open: require("open", "o")?,
            high: require("high", "h")?,
            low: require("low", "l")?,
            close: require("close", "c")?,
            volume: find("volume", Some("v")),
            signal: find("signal", None),
        })
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        row: usize,
    ) -> Result<(Bar, Option<Signal>), LoadError> {
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let number = |idx: usize, column: &'static str| parse_number(cell(idx), row, column);

        let raw_ts = cell(self.timestamp);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            row,
            value: raw_ts.to_string(),
        })?;

        let volume = match self.volume {
            Some(idx) => number(idx, "volume")?,
            None => 0.0,
        };
        let bar = Bar::new(
            timestamp,
            number(self.open, "open")?,
            number(self.high, "high")?,
            number(self.low, "low")?,
            number(self.close, "close")?,
            volume,
        );

        let signal = match self.signal {
            Some(idx) => Some(Signal::from_value(number(idx, "signal")?)),
            None => None,
        };

        Ok((bar, signal))
    }
}

fn parse_number(raw: &str, row: usize, column: &'static str) -> Result<f64, LoadError> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| LoadError::BadNumber {
        row,
        column,
        value: raw.to_string(),
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parse a timestamp cell. Offsets are normalised to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn compute_dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn headers_are_case_insensitive_with_aliases() {
        let csv = "Date,O,H,L,C,V\n2024-01-02,1,2,0.5,1.5,100\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        let bar = &data.bars[0];
        assert_eq!(bar.timestamp, ts("2024-01-02"));
        assert_eq!((bar.open, bar.high, bar.low, bar.close), (1.0, 2.0, 0.5, 1.5));
        assert_eq!(bar.volume, 100.0);
        assert!(data.signals.is_none());
    }

    #[test]
    fn timestamp_column_preferred_over_date() {
        let csv = "date,timestamp,open,high,low,close\n\
                   2020-01-01,2024-01-02 09:30:00,1,1,1,1\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.bars[0].timestamp, ts("2024-01-02 09:30:00"));
    }

    #[test]
    fn inconsistent_rows_are_counted_not_dropped() {
        let csv = "timestamp,open,high,low,close\n\
                   2024-01-02,10,11,9,10\n\
                   2024-01-03,10,9,11,10\n\
                   2024-01-04,,,,\n\
                   2024-01-05,-1,1,-2,0.5\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.bars.len(), 4);
        assert_eq!(data.insane_rows, 2);
    }

    #[test]
    fn missing_volume_defaults_to_zero() {
        let csv = "timestamp,open,high,low,close\n2024-01-02,1,1,1,1\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.bars[0].volume, 0.0);
    }

    #[test]
    fn missing_close_rejected() {
        let csv = "timestamp,open,high,low\n2024-01-02,1,1,1\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("close")));
    }

    #[test]
    fn missing_timestamp_rejected() {
        let csv = "when,open,high,low,close\n2024-01-02,1,1,1,1\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingTimestampColumn));
    }

    #[test]
    fn rows_are_sorted_and_duplicates_keep_last() {
        let csv = "date,open,high,low,close\n\
                   2024-01-03,3,3,3,3\n\
                   2024-01-02,1,1,1,1\n\
                   2024-01-02,2,2,2,2\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.bars.len(), 2);
        assert_eq!(data.duplicates_dropped, 1);
        assert_eq!(data.bars[0].close, 2.0);
        assert_eq!(data.bars[1].close, 3.0);
    }

    #[test]
    fn signal_column_loaded_when_present() {
        let csv = "date,open,high,low,close,signal\n\
                   2024-01-02,1,1,1,1,1\n\
                   2024-01-03,1,1,1,1,-1\n\
                   2024-01-04,1,1,1,1,\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            data.signals,
            Some(vec![Signal::Long, Signal::Short, Signal::Flat])
        );
    }

    #[test]
    fn empty_cells_load_as_nan() {
        let csv = "date,open,high,low,close\n2024-01-02,1,,1,\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert!(data.bars[0].high.is_nan());
        assert!(data.bars[0].is_void());
    }

    #[test]
    fn bad_number_reports_row_and_column() {
        let csv = "date,open,high,low,close\n2024-01-02,1,1,1,abc\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "row 2: cannot parse close value 'abc'"
        );
    }

    #[test]
    fn header_only_file_is_empty() {
        let csv = "date,open,high,low,close\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()).unwrap_err(),
            LoadError::Empty
        ));
    }

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(ts("2024-03-05 14:30:00"), expected);
        assert_eq!(ts("2024-03-05T14:30:00"), expected);
        assert_eq!(ts("2024-03-05 14:30"), expected);
        assert_eq!(ts("2024-03-05T16:30:00+02:00"), expected);
        assert_eq!(ts("2024-03-05").date(), expected.date());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn dataset_hash_is_deterministic() {
        let csv = "date,open,high,low,close\n2024-01-02,1,1,1,1\n";
        let a = parse_csv(csv.as_bytes()).unwrap();
        let b = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(a.dataset_hash, b.dataset_hash);
        assert_eq!(a.dataset_hash.len(), 64);
    }
}
