//! OHLCV resampling to a coarser timeframe.
//!
//! Buckets are fixed-width and aligned to the Unix epoch; weekly buckets
//! start on Monday. Each bucket is stamped with its start time and
//! aggregates its bars as open = first, high = max, low = min, close = last,
//! volume = sum. Buckets with no bars, or with an undefined OHLC value after
//! aggregation, are dropped.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use swinglab_core::{Bar, ShapeError, Signal};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    #[error("invalid resample rule '{0}' (expected <n>min, <n>h, <n>d or <n>w)")]
    InvalidRule(String),

    #[error(
        "calendar resample rule '{0}' is not supported: buckets have a fixed width \
         (use <n>d or <n>w instead of months, quarters or years)"
    )]
    CalendarRule(String),

    #[error("resample rule '{0}' has a zero width")]
    ZeroWidth(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
}

impl TimeUnit {
    fn seconds(self) -> i64 {
        match self {
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
            TimeUnit::Week => 7 * 86_400,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
            TimeUnit::Week => "w",
        }
    }
}

/// A resample rule such as `15min`, `4h`, `1d` or `w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeframe {
    pub count: u32,
    pub unit: TimeUnit,
}

/// 1970-01-01 was a Thursday; the first Monday is four days later.
const MONDAY_OFFSET_SECS: i64 = 4 * 86_400;

impl Timeframe {
    pub fn width_secs(&self) -> i64 {
        i64::from(self.count) * self.unit.seconds()
    }

    /// Start of the bucket containing `ts`.
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let offset = match self.unit {
            TimeUnit::Week => MONDAY_OFFSET_SECS,
            _ => 0,
        };
        let secs = ts.and_utc().timestamp() - offset;
        let start = secs.div_euclid(self.width_secs()) * self.width_secs() + offset;
        DateTime::<Utc>::from_timestamp(start, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or(ts)
    }
}

impl FromStr for Timeframe {
    type Err = ResampleError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let normalized = rule.trim().to_ascii_lowercase();
        let split = normalized
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ResampleError::InvalidRule(rule.to_string()))?;
        let (digits, suffix) = normalized.split_at(split);

        let unit = match suffix {
            "min" | "t" => TimeUnit::Minute,
            "h" => TimeUnit::Hour,
            "d" => TimeUnit::Day,
            "w" => TimeUnit::Week,
            "m" | "ms" | "me" | "q" | "qs" | "qe" | "y" | "ys" | "ye" | "a" => {
                return Err(ResampleError::CalendarRule(rule.to_string()))
            }
            _ => return Err(ResampleError::InvalidRule(rule.to_string())),
        };
        let count = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| ResampleError::InvalidRule(rule.to_string()))?
        };
        if count == 0 {
            return Err(ResampleError::ZeroWidth(rule.to_string()));
        }

        Ok(Self { count, unit })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

/// Resample time-ordered bars.
pub fn resample_bars(bars: &[Bar], timeframe: &Timeframe) -> Vec<Bar> {
    bucket_ranges(bars, timeframe)
        .into_iter()
        .filter_map(|range| aggregate(&bars[range], timeframe))
        .collect()
}

/// Resample bars together with their precomputed signals.
///
/// Each bucket takes the signal of its last bar, the decision standing at
/// the bucket's close.
pub fn resample_with_signals(
    bars: &[Bar],
    signals: &[Signal],
    timeframe: &Timeframe,
) -> Result<(Vec<Bar>, Vec<Signal>), ResampleError> {
    ShapeError::check_len("bars", bars.len(), "signals", signals.len())?;

    let mut out_bars = Vec::new();
    let mut out_signals = Vec::new();
    for range in bucket_ranges(bars, timeframe) {
        let last = range.end - 1;
        if let Some(bar) = aggregate(&bars[range], timeframe) {
            out_bars.push(bar);
            out_signals.push(signals[last]);
        }
    }
    Ok((out_bars, out_signals))
}

/// Contiguous runs of bars sharing a bucket.
fn bucket_ranges(bars: &[Bar], timeframe: &Timeframe) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..=bars.len() {
        let boundary = i == bars.len()
            || timeframe.bucket_start(bars[i].timestamp)
                != timeframe.bucket_start(bars[start].timestamp);
        if boundary {
            ranges.push(start..i);
            start = i;
        }
    }
    ranges
}

fn aggregate(group: &[Bar], timeframe: &Timeframe) -> Option<Bar> {
    let first = group.first()?;
    let last = group.last()?;

    // f64::max / f64::min skip a NaN operand
    let high = group.iter().fold(f64::NAN, |acc, b| acc.max(b.high));
    let low = group.iter().fold(f64::NAN, |acc, b| acc.min(b.low));
    let volume = group
        .iter()
        .map(|b| b.volume)
        .filter(|v| !v.is_nan())
        .sum();

    let bar = Bar::new(
        timeframe.bucket_start(first.timestamp),
        first.open,
        high,
        low,
        last.close,
        volume,
    );
    (!bar.is_void()).then_some(bar)
}
