//! CSV candle loading, used for offline replay.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use alertchart_core::{Candle, Timeframe};
use async_trait::async_trait;

use crate::source::{FetchRange, HistoricalSource};
use crate::DataError;

/// Loads candle data from a CSV file.
///
/// The file holds a single series, so `symbol` and `interval` passed to
/// [`HistoricalSource::fetch`] are not used for filtering.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every candle in the file, sorted by time.
    pub fn load(&self) -> Result<Vec<Candle>, DataError> {
        load_candles_from_csv(&self.path)
    }
}

#[async_trait]
impl HistoricalSource for CsvSource {
    async fn fetch(
        &self,
        _symbol: &str,
        _interval: Timeframe,
        range: FetchRange,
    ) -> Result<Vec<Candle>, DataError> {
        let mut candles: Vec<Candle> = self
            .load()?
            .into_iter()
            .filter(|c| range.contains(c.time))
            .collect();

        if let Some(limit) = range.limit {
            let start = candles.len().saturating_sub(limit as usize);
            candles.drain(..start);
        }
        Ok(candles)
    }
}

/// Parse a unix timestamp (seconds or milliseconds) or a
/// `YYYY-MM-DD HH:MM:SS` datetime into unix seconds.
pub fn parse_datetime(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(ts) = s.parse::<f64>() {
        if !ts.is_finite() {
            return None;
        }
        // 13+ digits means milliseconds
        let secs = if ts.abs() > 1e12 { ts / 1000.0 } else { ts };
        return Some(secs as i64);
    }

    // Format: "2017-08-17 04:00:00"
    let parts: Vec<&str> = s.split(&['-', ' ', ':', 'T']).collect();
    if parts.len() < 6 {
        return None;
    }
    let year: i64 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;
    let hour: i64 = parts[3].parse().ok()?;
    let min: i64 = parts[4].parse().ok()?;
    let sec: i64 = parts[5].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || year < 1970 {
        return None;
    }

    let is_leap = |y: i64| y % 4 == 0 && (y % 100 != 0 || y % 400 == 0);

    // Days since Unix epoch (1970-01-01)
    let mut days: i64 = (1970..year).map(|y| if is_leap(y) { 366 } else { 365 }).sum();
    let month_days = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    days += month_days[month as usize - 1];
    if month > 2 && is_leap(year) {
        days += 1;
    }
    days += (day - 1) as i64;

    Some(days * 86400 + hour * 3600 + min * 60 + sec)
}

/// Load candles from a CSV file.
///
/// Columns are found by header name (`timestamp`/`time`/`date`, `open`,
/// `high`, `low`, `close`, `volume`), falling back to positional
/// `time,open,high,low,close,volume`. A missing volume column yields 0.
pub fn load_candles_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>, DataError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(b',')
        .trim(::csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let headers_lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let find = |name: &str| headers_lower.iter().position(|h| h == name);

    let ts_col = headers_lower
        .iter()
        .position(|h| h.contains("timestamp") || h == "time" || h == "date")
        .unwrap_or(0);
    let open_col = find("open").unwrap_or(1);
    let high_col = find("high").unwrap_or(2);
    let low_col = find("low").unwrap_or(3);
    let close_col = find("close").unwrap_or(4);
    let volume_col = find("volume").or(if headers.len() > 5 { Some(5) } else { None });

    let mut candles = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        // +2: one for the header, one for 1-based rows
        let line = row + 2;

        let raw_time = record.get(ts_col).unwrap_or("");
        let time = parse_datetime(raw_time)
            .ok_or_else(|| DataError::Parse(format!("timestamp '{raw_time}' on line {line}")))?;

        let number = |col: usize, name: &str| -> Result<f64, DataError> {
            let raw = record.get(col).unwrap_or("");
            raw.parse::<f64>()
                .map_err(|_| DataError::Parse(format!("{name} '{raw}' on line {line}")))
        };

        let volume = match volume_col {
            Some(col) => number(col, "volume")?,
            None => 0.0,
        };

        candles.push(Candle::new(
            time,
            number(open_col, "open")?,
            number(high_col, "high")?,
            number(low_col, "low")?,
            number(close_col, "close")?,
            volume,
        ));
    }

    candles.sort_by_key(|c| c.time);

    let timestamps: Vec<i64> = candles.iter().map(|c| c.time).collect();
    if let Some(report) = analyze_data_gaps(&timestamps) {
        log::debug!(
            "CSV data: {} points, interval {}s, {} gaps, {} missing",
            timestamps.len(),
            report.expected_interval,
            report.gaps,
            report.missing
        );
    }

    Ok(candles)
}

/// Summary of holes in a candle series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapReport {
    /// Most common spacing between consecutive candles, in seconds.
    pub expected_interval: i64,
    pub gaps: usize,
    pub missing: i64,
    /// Largest gap as (start time, length in seconds).
    pub largest_gap: Option<(i64, i64)>,
}

/// Analyze sorted timestamps for gaps. Needs at least two points.
pub fn analyze_data_gaps(timestamps: &[i64]) -> Option<GapReport> {
    if timestamps.len() < 2 {
        return None;
    }

    let mut intervals: HashMap<i64, usize> = HashMap::new();
    for window in timestamps.windows(2) {
        *intervals.entry(window[1] - window[0]).or_insert(0) += 1;
    }

    let expected_interval = intervals
        .iter()
        .filter(|(interval, _)| **interval > 0)
        .max_by_key(|(interval, count)| (**count, -**interval))
        .map(|(interval, _)| *interval)?;

    let mut report = GapReport {
        expected_interval,
        gaps: 0,
        missing: 0,
        largest_gap: None,
    };

    for window in timestamps.windows(2) {
        let diff = window[1] - window[0];
        if diff > expected_interval {
            report.gaps += 1;
            report.missing += diff / expected_interval - 1;
            if report.largest_gap.map_or(true, |(_, len)| diff > len) {
                report.largest_gap = Some((window[0], diff));
            }
        }
    }

    Some(report)
}
