//! Loading stop records from CSV.
//!
//! The header names the columns of `traffic_stops`; the order is free and
//! an `id` column, if present, is ignored so the store assigns fresh ones.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{parse_date, parse_flag, parse_time, StopRecord};
use crate::store::schema::STOP_COLUMNS;
use crate::store::Store;

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records written to the store.
    pub inserted: usize,
}

/// Header positions of every column except `id`.
struct Columns {
    index: Vec<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let index = STOP_COLUMNS[1..]
            .iter()
            .map(|name| {
                headers
                    .iter()
                    .position(|h| h.trim() == *name)
                    .ok_or_else(|| Error::ImportRecord {
                        line: 1,
                        message: format!("missing column '{name}'"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { index })
    }

    /// The field for `STOP_COLUMNS[n + 1]`.
    fn get<'r>(&self, row: &'r StringRecord, n: usize) -> &'r str {
        row.get(self.index[n]).unwrap_or("").trim()
    }
}

/// Parse every record of a CSV document.
///
/// # Errors
///
/// Returns [`Error::ImportRecord`] naming the line of the first bad record,
/// or [`Error::Csv`] if the document itself is malformed.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<StopRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::locate(reader.headers()?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, csv::Position::line);
        let record = parse_row(&columns, &row).map_err(|e| Error::ImportRecord {
            line,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    debug!(count = records.len(), "parsed CSV records");
    Ok(records)
}

fn parse_row(columns: &Columns, row: &StringRecord) -> Result<StopRecord> {
    let field = |n| columns.get(row, n);
    let optional = |n| Some(field(n).to_string()).filter(|s| !s.is_empty());

    let driver_age = field(4).parse::<i64>().map_err(|_| {
        Error::invalid_form("driver_age", format!("'{}' is not a whole number", field(4)))
    })?;

    Ok(StopRecord {
        id: None,
        stop_date: parse_date(field(0))?,
        stop_time: parse_time(field(1))?,
        country_name: field(2).to_string(),
        driver_gender: field(3).parse()?,
        driver_age,
        driver_race: field(5).to_string(),
        search_conducted: parse_flag("search_conducted", field(6))?,
        search_type: optional(7),
        drugs_related_stop: parse_flag("drugs_related_stop", field(8))?,
        stop_duration: field(9).to_string(),
        vehicle_number: field(10).to_string(),
        stop_outcome: optional(11),
        violation: optional(12),
        is_arrested: parse_flag("is_arrested", field(13))?,
    })
}

/// Import a CSV file into the store in one transaction.
///
/// Nothing is written if any record fails to parse.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a record is invalid or the
/// insert fails.
pub fn import_csv(store: &Store, path: impl AsRef<Path>) -> Result<ImportSummary> {
    let path = path.as_ref();
    let records = read_csv(File::open(path)?)?;
    let inserted = store.insert_all(&records)?;
    info!(path = %path.display(), inserted, "imported stop records");
    Ok(ImportSummary { inserted })
}
