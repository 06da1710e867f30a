//! CSV record adapter
//!
//! Parses screen-time CSV data and validates each row into a [`ScreenTimeRecord`].
//! Row-level problems surface as [`ComputeError::MalformedRecord`]; the caller's
//! [`LoadPolicy`] decides whether they abort the load or are skipped.

use crate::error::ComputeError;
use crate::types::ScreenTimeRecord;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{debug, warn};

/// Columns every input file must provide
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "app_name",
    "category",
    "usage_minutes",
    "pickups",
    "notifications",
    "hour",
];

/// Upper bound for one record's usage: a full day
pub const MAX_USAGE_MINUTES: f64 = 24.0 * 60.0;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// What to do with a row that fails validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Stop at the first malformed row
    #[default]
    Abort,
    /// Drop malformed rows and keep going
    Skip,
}

/// A CSV row before validation. Every field is optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub date: Option<String>,
    pub app_name: Option<String>,
    pub category: Option<String>,
    pub usage_minutes: Option<String>,
    pub pickups: Option<String>,
    pub notifications: Option<String>,
    pub hour: Option<String>,
}

impl RawRecord {
    /// Validate into a typed record. `row` is the 1-based data row number.
    pub fn validate(&self, row: usize) -> Result<ScreenTimeRecord, ComputeError> {
        let date = parse_date(row, required(row, "date", &self.date)?)?;
        let app_name = required(row, "app_name", &self.app_name)?.to_string();
        let category = required(row, "category", &self.category)?.to_string();
        let usage_minutes =
            parse_minutes(row, required(row, "usage_minutes", &self.usage_minutes)?)?;
        let pickups = parse_count(row, "pickups", required(row, "pickups", &self.pickups)?)?;
        let notifications = parse_count(
            row,
            "notifications",
            required(row, "notifications", &self.notifications)?,
        )?;
        let hour = parse_hour(row, required(row, "hour", &self.hour)?)?;

        Ok(ScreenTimeRecord {
            date,
            app_name,
            category,
            usage_minutes,
            pickups,
            notifications,
            hour,
        })
    }
}

/// A row dropped under [`LoadPolicy::Skip`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: usize,
    pub error: String,
}

/// Result of loading a dataset
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub records: Vec<ScreenTimeRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Per-row validation outcome for reporting
#[derive(Debug)]
pub struct ValidationResult {
    pub row: usize,
    pub result: Option<ComputeError>,
}

/// Adapter for screen-time CSV sources
pub struct CsvRecordAdapter;

impl CsvRecordAdapter {
    /// Parse CSV text into raw rows after checking the header
    pub fn parse_raw(csv: &str) -> Result<Vec<RawRecord>, ComputeError> {
        Self::parse_raw_reader(csv.as_bytes())
    }

    /// Parse raw rows from any reader
    pub fn parse_raw_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>, ComputeError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(reader.headers()?)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(columns.extract(&record?));
        }
        debug!(rows = rows.len(), "parsed raw csv rows");
        Ok(rows)
    }

    /// Parse and validate CSV text under the given policy
    pub fn load(csv: &str, policy: LoadPolicy) -> Result<LoadOutcome, ComputeError> {
        Self::load_reader(csv.as_bytes(), policy)
    }

    /// Parse and validate CSV from any reader. Invalid UTF-8 is a [`ComputeError::Csv`].
    pub fn load_reader<R: Read>(reader: R, policy: LoadPolicy) -> Result<LoadOutcome, ComputeError> {
        let raw = Self::parse_raw_reader(reader)?;
        Self::to_records(&raw, policy)
    }

    /// Validate raw rows under the given policy
    pub fn to_records(raw: &[RawRecord], policy: LoadPolicy) -> Result<LoadOutcome, ComputeError> {
        let mut outcome = LoadOutcome::default();

        for (idx, row) in raw.iter().enumerate() {
            match row.validate(idx + 1) {
                Ok(record) => outcome.records.push(record),
                Err(e) => match policy {
                    LoadPolicy::Abort => return Err(e),
                    LoadPolicy::Skip => {
                        warn!(row = idx + 1, error = %e, "skipping malformed record");
                        outcome.rejected.push(RejectedRow {
                            row: idx + 1,
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(outcome)
    }

    /// Validate every row and return only the failures
    pub fn validate_rows(raw: &[RawRecord]) -> Vec<ValidationResult> {
        raw.iter()
            .enumerate()
            .map(|(idx, row)| ValidationResult {
                row: idx + 1,
                result: row.validate(idx + 1).err(),
            })
            .filter(|r| r.result.is_some())
            .collect()
    }
}

/// Positions of the required columns within the header row
struct ColumnIndex([usize; REQUIRED_COLUMNS.len()]);

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ComputeError> {
        let mut positions = [0; REQUIRED_COLUMNS.len()];
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| ComputeError::MissingColumn(column.to_string()))?;
        }
        Ok(Self(positions))
    }

    /// Short rows leave trailing fields as `None`
    fn extract(&self, record: &csv::StringRecord) -> RawRecord {
        let field = |i: usize| record.get(self.0[i]).map(str::to_string);
        RawRecord {
            date: field(0),
            app_name: field(1),
            category: field(2),
            usage_minutes: field(3),
            pickups: field(4),
            notifications: field(5),
            hour: field(6),
        }
    }
}

fn required<'a>(row: usize, field: &str, value: &'a Option<String>) -> Result<&'a str, ComputeError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ComputeError::malformed(row, field, "is missing")),
    }
}

fn parse_date(row: usize, value: &str) -> Result<NaiveDate, ComputeError> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }
    Err(ComputeError::malformed(
        row,
        "date",
        format!("is not a calendar date: {value:?}"),
    ))
}

fn parse_minutes(row: usize, value: &str) -> Result<f64, ComputeError> {
    let minutes: f64 = value
        .parse()
        .map_err(|_| ComputeError::malformed(row, "usage_minutes", format!("is not numeric: {value:?}")))?;

    if !minutes.is_finite() {
        return Err(ComputeError::malformed(row, "usage_minutes", "is not finite"));
    }
    if minutes < 0.0 {
        return Err(ComputeError::malformed(row, "usage_minutes", "is negative"));
    }
    if minutes > MAX_USAGE_MINUTES {
        return Err(ComputeError::malformed(
            row,
            "usage_minutes",
            format!("exceeds {MAX_USAGE_MINUTES} minutes"),
        ));
    }
    Ok(minutes)
}

/// Parse a non-negative integer count, accepting integral decimals like `12.0`
fn parse_count(row: usize, field: &str, value: &str) -> Result<u32, ComputeError> {
    if let Ok(count) = value.parse::<u32>() {
        return Ok(count);
    }

    let number: f64 = value
        .parse()
        .map_err(|_| ComputeError::malformed(row, field, format!("is not numeric: {value:?}")))?;

    if number < 0.0 {
        return Err(ComputeError::malformed(row, field, "is negative"));
    }
    if !number.is_finite() || number.fract() != 0.0 || number > f64::from(u32::MAX) {
        return Err(ComputeError::malformed(
            row,
            field,
            format!("is not a whole count: {value:?}"),
        ));
    }
    Ok(number as u32)
}

fn parse_hour(row: usize, value: &str) -> Result<u8, ComputeError> {
    let hour = parse_count(row, "hour", value)?;
    if hour > 23 {
        return Err(ComputeError::malformed(
            row,
            "hour",
            format!("is outside 0-23: {hour}"),
        ));
    }
    Ok(hour as u8)
}
