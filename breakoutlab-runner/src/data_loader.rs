//! Candle and outcome-log loading for the runner.
//!
//! Candles come from CSV files with a header row
//! `open_time,open,high,low,close[,...]` where `open_time` is epoch
//! milliseconds; extra columns (volume, trade counts) are ignored. The file
//! stem names the instrument, so `data/BTCUSDT.csv` loads as `BTCUSDT`.
//! Rows that do not parse, carry impossible prices, or do not advance the
//! open time are dropped and reported; only I/O failures are fatal.
//!
//! Outcome logs are the pipe-delimited trade records. Malformed lines are
//! reported and skipped; the surviving records are canonicalized.

use std::io::Read;
use std::path::{Path, PathBuf};

use breakoutlab_core::data::{parse_log, Canonicalized, Canonicalizer, RejectedLine};
use breakoutlab_core::domain::SeriesError;
use breakoutlab_core::{Candle, CandleSeries};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable candle CSV header for '{instrument}': {source}")]
    Csv {
        instrument: String,
        #[source]
        source: csv::Error,
    },

    #[error("cannot derive an instrument name from {0}")]
    NoInstrument(PathBuf),

    #[error("no candle files (*.csv) in {0}")]
    EmptyDirectory(PathBuf),

    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}

/// Why a single candle row was dropped.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("unreadable row: {0}")]
    Csv(#[from] csv::Error),

    #[error("open time {0} ms is out of range")]
    Timestamp(i64),

    #[error("prices must be finite and positive with high >= low")]
    Insane,

    #[error("open time {time} does not follow {previous}")]
    NotIncreasing {
        previous: NaiveDateTime,
        time: NaiveDateTime,
    },
}

/// A candle row that was dropped during loading.
#[derive(Debug)]
pub struct RejectedRow {
    /// 1-based data row, header excluded.
    pub row_number: usize,
    pub error: RowError,
}

/// A loaded series plus the rows that were dropped on the way.
#[derive(Debug)]
pub struct LoadedCandles {
    pub series: CandleSeries,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Deserialize)]
struct KlineRecord {
    open_time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl KlineRecord {
    fn into_candle(self, previous: Option<&Candle>) -> Result<Candle, RowError> {
        let open_time = DateTime::from_timestamp_millis(self.open_time)
            .ok_or(RowError::Timestamp(self.open_time))?
            .naive_utc();
        let candle = Candle::new(open_time, self.open, self.high, self.low, self.close);
        if !candle.is_sane() {
            return Err(RowError::Insane);
        }
        if let Some(previous) = previous.filter(|p| p.open_time >= open_time) {
            return Err(RowError::NotIncreasing {
                previous: previous.open_time,
                time: open_time,
            });
        }
        Ok(candle)
    }
}

/// Parse candle CSV from any reader, dropping rows that cannot join the series.
pub fn read_candles<R: Read>(reader: R, instrument: &str) -> Result<LoadedCandles, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    rdr.headers().map_err(|source| LoadError::Csv {
        instrument: instrument.to_string(),
        source,
    })?;

    let mut candles: Vec<Candle> = Vec::new();
    let mut rejected = Vec::new();
    for (index, record) in rdr.deserialize::<KlineRecord>().enumerate() {
        let row = record
            .map_err(RowError::from)
            .and_then(|record| record.into_candle(candles.last()));
        match row {
            Ok(candle) => candles.push(candle),
            Err(error) => rejected.push(RejectedRow {
                row_number: index + 1,
                error,
            }),
        }
    }

    if !rejected.is_empty() {
        warn!(
            instrument,
            rejected = rejected.len(),
            kept = candles.len(),
            "dropped malformed candle rows"
        );
    }

    Ok(LoadedCandles {
        series: CandleSeries::new(instrument, candles)?,
        rejected,
    })
}

/// Load one candle CSV file. The file stem is the instrument.
pub fn load_candles(path: impl AsRef<Path>) -> Result<LoadedCandles, LoadError> {
    let path = path.as_ref();
    let instrument = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| LoadError::NoInstrument(path.to_path_buf()))?;

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_candles(file, instrument)
}

/// Load every `*.csv` in `dir`, sorted by file name.
///
/// Dropped rows are logged per file; the returned series hold the rows that survived.
pub fn load_candle_dir(dir: impl AsRef<Path>) -> Result<Vec<CandleSeries>, LoadError> {
    let dir = dir.as_ref();
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(LoadError::EmptyDirectory(dir.to_path_buf()));
    }
    paths.sort();

    let mut series = Vec::with_capacity(paths.len());
    let mut rejected = 0;
    for path in &paths {
        let loaded = load_candles(path)?;
        rejected += loaded.rejected.len();
        series.push(loaded.series);
    }
    info!(
        dir = %dir.display(),
        instruments = series.len(),
        rejected_rows = rejected,
        "loaded candle series"
    );
    Ok(series)
}

/// Canonical outcome stream plus the lines that could not be parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedOutcomes {
    pub canonical: Canonicalized,
    pub rejected: Vec<RejectedLine>,
}

/// Parse and canonicalize outcome-log text.
pub fn read_outcome_log(text: &str) -> LoadedOutcomes {
    let parsed = parse_log(text);
    if !parsed.rejected.is_empty() {
        warn!(rejected = parsed.rejected.len(), "outcome log contained malformed lines");
    }
    LoadedOutcomes {
        canonical: Canonicalizer::canonicalize(parsed.outcomes),
        rejected: parsed.rejected,
    }
}

/// Read, parse and canonicalize an outcome-log file.
pub fn load_outcome_log(path: impl AsRef<Path>) -> Result<LoadedOutcomes, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = read_outcome_log(&text);
    info!(
        path = %path.display(),
        trades = loaded.canonical.outcomes.len(),
        rejected = loaded.rejected.len(),
        "loaded outcome log"
    );
    Ok(loaded)
}

/// Deterministic BLAKE3 hash over instrument names and OHLC values.
///
/// Series are hashed in instrument order so the input order does not matter.
pub fn dataset_hash(series: &[CandleSeries]) -> String {
    let mut ordered: Vec<&CandleSeries> = series.iter().collect();
    ordered.sort_by(|a, b| a.instrument().cmp(b.instrument()));

    let mut hasher = blake3::Hasher::new();
    for s in ordered {
        hasher.update(s.instrument().as_bytes());
        for candle in s.candles() {
            hasher.update(&candle.open_time.and_utc().timestamp_millis().to_le_bytes());
            hasher.update(&candle.open.to_le_bytes());
            hasher.update(&candle.high.to_le_bytes());
            hasher.update(&candle.low.to_le_bytes());
            hasher.update(&candle.close.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
