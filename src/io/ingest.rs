//! CSV ingest for exercise step logs.
//!
//! Turns a loosely-structured `Period,Intensity,AvgBPM[,Temperature]` export
//! into a clean [`Series`] with absolute elapsed time.
//!
//! Design goals:
//! - **Tolerant rows**: a bad row is skipped and recorded, never fatal
//! - **Explicit clock**: the elapsed-time accumulator is fold state owned by a
//!   single ingest call
//! - **Separation of concerns**: no plotting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{Sample, Series};
use crate::error::AppError;

pub const COL_PERIOD: &str = "Period";
pub const COL_INTENSITY: &str = "Intensity";
pub const COL_AVG_BPM: &str = "AvgBPM";
pub const COL_TEMPERATURE: &str = "Temperature";

/// Why a single row was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The CSV layer could not decode the record at all.
    Malformed(String),
    /// A required column is absent from the header.
    MissingColumn(&'static str),
    /// The row is too short to contain a required integer cell, or the cell is blank.
    MissingValue(&'static str),
    InvalidInteger { column: &'static str, value: String },
    InvalidNumber { column: &'static str, value: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Malformed(msg) => write!(f, "CSV parse error: {msg}"),
            SkipReason::MissingColumn(column) => write!(f, "missing required column `{column}`"),
            SkipReason::MissingValue(column) => write!(f, "missing value for `{column}`"),
            SkipReason::InvalidInteger { column, value } => {
                write!(f, "`{column}` is not a valid integer: '{value}'")
            }
            SkipReason::InvalidNumber { column, value } => {
                write!(f, "`{column}` is not a valid number: '{value}'")
            }
        }
    }
}

/// A dropped row and where it was in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSkip {
    pub line: usize,
    pub reason: SkipReason,
}

/// What happened to each data row of the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub rows_read: usize,
    pub samples: usize,
    /// Rows with `Period == 0` and `Intensity == 0` (padding).
    pub sentinel_rows: usize,
    pub skipped: Vec<RowSkip>,
}

/// Ingest output: the series plus the per-row bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct IngestedData {
    pub series: Series,
    pub report: IngestReport,
}

/// Running total of step periods, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedClock {
    elapsed_ms: u64,
}

impl ElapsedClock {
    /// Add one step's period and return the new elapsed time in seconds.
    pub fn advance(&mut self, period_ms: u64) -> f64 {
        self.elapsed_ms = self.elapsed_ms.saturating_add(period_ms);
        self.elapsed_s()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_ms as f64 / 1000.0
    }
}

/// Read `path` into a [`Series`], reporting problems on stdout.
///
/// Never fails: a missing file or a file without usable rows both produce an
/// empty series after printing a one-line diagnostic.
pub fn ingest(path: impl AsRef<Path>) -> Series {
    match load_series(path.as_ref()) {
        Ok(data) => {
            if data.series.is_empty() {
                println!("No data found to plot.");
            }
            data.series
        }
        Err(err) => {
            println!("{err}");
            Series::new()
        }
    }
}

/// Open `path` and fold its rows into a series.
///
/// Only opening the file can fail; everything after that is row-level.
pub fn load_series(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| open_error(path, &e))?;
    let data = read_series(file);
    info!(
        path = %path.display(),
        rows = data.report.rows_read,
        samples = data.report.samples,
        sentinels = data.report.sentinel_rows,
        skipped = data.report.skipped.len(),
        "ingested step log"
    );
    Ok(data)
}

/// Fold CSV text from any reader into a series.
pub fn read_series<R: io::Read>(input: R) -> IngestedData {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!(error = %e, "failed to read CSV header");
            return IngestedData::default();
        }
    };

    let columns = ColumnIndex::from_headers(&headers);
    for column in columns.missing_required() {
        warn!(column, "required column missing; every row will be skipped");
    }

    reader
        .records()
        .enumerate()
        // +2: 1-based lines, and the header occupies line 1.
        .fold(IngestState::default(), |state, (idx, record)| {
            state.absorb(idx + 2, record, &columns)
        })
        .finish()
}

fn open_error(path: &Path, err: &io::Error) -> AppError {
    if err.kind() == io::ErrorKind::NotFound {
        AppError::file_unavailable(format!("File {} not found.", path.display()))
    } else {
        AppError::file_unavailable(format!("Failed to open '{}': {err}", path.display()))
    }
}

/// Fold state: the clock only lives as long as one ingest call.
#[derive(Default)]
struct IngestState {
    clock: ElapsedClock,
    series: Series,
    report: IngestReport,
}

impl IngestState {
    fn absorb(mut self, line: usize, record: csv::Result<StringRecord>, columns: &ColumnIndex) -> Self {
        self.report.rows_read += 1;

        let parsed = record
            .map_err(|e| SkipReason::Malformed(e.to_string()))
            .and_then(|record| RawRow::read(&record, columns).and_then(|raw| parse_row(&raw)));

        match parsed {
            Ok(row) => match row.into_sample(&mut self.clock) {
                Some(sample) => self.series.push(sample),
                None => self.report.sentinel_rows += 1,
            },
            Err(reason) => {
                debug!(line, %reason, "skipping row");
                self.report.skipped.push(RowSkip { line, reason });
            }
        }
        self
    }

    fn finish(mut self) -> IngestedData {
        self.report.samples = self.series.len();
        IngestedData {
            series: self.series,
            report: self.report,
        }
    }
}

/// Header positions of the recognized columns.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnIndex {
    period: Option<usize>,
    intensity: Option<usize>,
    avg_bpm: Option<usize>,
    temperature: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let map = build_header_map(headers);
        Self {
            period: map.get(COL_PERIOD).copied(),
            intensity: map.get(COL_INTENSITY).copied(),
            avg_bpm: map.get(COL_AVG_BPM).copied(),
            temperature: map.get(COL_TEMPERATURE).copied(),
        }
    }

    fn missing_required(&self) -> Vec<&'static str> {
        [
            (COL_PERIOD, self.period),
            (COL_INTENSITY, self.intensity),
            (COL_AVG_BPM, self.avg_bpm),
        ]
        .into_iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim_start_matches('\u{feff}').trim().to_string()
}

/// One record's recognized cells, before any parsing.
///
/// `None` means the row is too short to reach that column.
#[derive(Debug, Clone, Copy)]
struct RawRow<'a> {
    period: Option<&'a str>,
    intensity: Option<&'a str>,
    avg_bpm: Option<&'a str>,
    temperature: Option<&'a str>,
}

impl<'a> RawRow<'a> {
    fn read(record: &'a StringRecord, columns: &ColumnIndex) -> Result<Self, SkipReason> {
        let period = columns.period.ok_or(SkipReason::MissingColumn(COL_PERIOD))?;
        let intensity = columns
            .intensity
            .ok_or(SkipReason::MissingColumn(COL_INTENSITY))?;
        let avg_bpm = columns.avg_bpm.ok_or(SkipReason::MissingColumn(COL_AVG_BPM))?;

        Ok(Self {
            period: record.get(period),
            intensity: record.get(intensity),
            avg_bpm: record.get(avg_bpm),
            temperature: columns.temperature.and_then(|idx| record.get(idx)),
        })
    }
}

/// A row whose fields all parsed, not yet placed on the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ParsedRow {
    period_ms: u64,
    intensity: i64,
    bpm: f64,
    temperature: f64,
}

impl ParsedRow {
    fn is_sentinel(&self) -> bool {
        self.period_ms == 0 && self.intensity == 0
    }

    /// Advance the clock by this row's period, then emit a sample unless the
    /// row is padding.
    fn into_sample(self, clock: &mut ElapsedClock) -> Option<Sample> {
        let time_s = clock.advance(self.period_ms);
        if self.is_sentinel() {
            return None;
        }
        Some(Sample {
            time_s,
            intensity: self.intensity,
            bpm: self.bpm,
            temperature: self.temperature,
        })
    }
}

fn parse_row(raw: &RawRow<'_>) -> Result<ParsedRow, SkipReason> {
    Ok(ParsedRow {
        period_ms: parse_integer(COL_PERIOD, raw.period)?,
        intensity: parse_integer(COL_INTENSITY, raw.intensity)?,
        bpm: parse_blank_as_zero(COL_AVG_BPM, raw.avg_bpm)?,
        temperature: parse_temperature(raw.temperature),
    })
}

fn parse_integer<T: std::str::FromStr>(column: &'static str, cell: Option<&str>) -> Result<T, SkipReason> {
    let value = cell
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::MissingValue(column))?;
    value.parse::<T>().map_err(|_| SkipReason::InvalidInteger {
        column,
        value: value.to_string(),
    })
}

/// Blank or absent cells read as `0.0`; anything else must parse as a number.
///
/// `nan` and `inf` parse, so they are kept; the chart leaves them off the axes.
fn parse_blank_as_zero(column: &'static str, cell: Option<&str>) -> Result<f64, SkipReason> {
    let Some(value) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(0.0);
    };
    value.parse::<f64>().map_err(|_| SkipReason::InvalidNumber {
        column,
        value: value.to_string(),
    })
}

/// Temperature never rejects a row: unreadable values fall back to `0.0`.
fn parse_temperature(cell: Option<&str>) -> f64 {
    parse_blank_as_zero(COL_TEMPERATURE, cell)
        .ok()
        .filter(|t| t.is_finite())
        .unwrap_or(0.0)
}
