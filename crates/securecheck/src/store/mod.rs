//! Data access for the stop records store.
//!
//! A [`Store`] only holds connection parameters. Every call opens its own
//! `SQLite` connection and closes it before returning, whatever the outcome;
//! no connection is shared or reused between calls.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{StopRecord, DATE_FORMAT, TIME_FORMAT};
use crate::table::{Table, Value};

/// The query that loads the whole dataset.
pub const BASE_QUERY: &str = "SELECT * FROM traffic_stops";

const INSERT_STOP: &str = r"
INSERT INTO traffic_stops (
    stop_date, stop_time, country_name, driver_gender, driver_age, driver_race,
    search_conducted, search_type, drugs_related_stop, stop_duration,
    vehicle_number, stop_outcome, violation, is_arrested
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
";

/// Handle on the stop records database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
}

impl Store {
    /// A handle on the database at `path`. Nothing is opened yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A handle on the database named by the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.database_path())
    }

    /// Create the database file and schema if needed.
    ///
    /// Creates parent directories as required and brings the schema to the
    /// current version. Safe to run against an existing database.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, the file or the schema cannot be
    /// created.
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        migrations::initialize_schema(&conn)?;
        close(conn, &path);

        info!("Database ready at {}", path.display());
        Ok(Self { path })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection to an existing database.
    ///
    /// The database is never created here: a missing file is a connection
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatabaseOpen`] if the database cannot be opened.
    pub fn connect(&self) -> Result<Connection> {
        debug!("Connecting to {}", self.path.display());
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| Error::DatabaseOpen {
            path: self.path.clone(),
            source,
        })
    }

    /// Run `query` verbatim and materialise every row.
    ///
    /// Column names come from the statement. The connection is closed before
    /// returning on both the success and the error path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the statement
    /// fails.
    pub fn try_fetch(&self, query: &str) -> Result<Table> {
        let conn = self.connect()?;
        debug!(query, "Executing");
        let result = read_table(&conn, query);
        close(conn, &self.path);
        result
    }

    /// Run `query` and return its rows, or an empty table on any failure.
    ///
    /// Failures are logged at error level and never returned, so an empty
    /// table means either "no rows" or "no data available". Use
    /// [`Store::try_fetch`] to tell the two apart.
    #[must_use]
    pub fn fetch(&self, query: &str) -> Table {
        match self.try_fetch(query) {
            Ok(table) => table,
            Err(err) => {
                error!("Database error: {err}");
                Table::empty()
            }
        }
    }

    /// Insert one stop record and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the insert fails.
    pub fn insert(&self, record: &StopRecord) -> Result<i64> {
        let conn = self.connect()?;
        let result = insert_record(&conn, record).map(|()| conn.last_insert_rowid());
        close(conn, &self.path);

        let id = result?;
        info!("Inserted stop record {id}");
        Ok(id)
    }

    /// Insert many records in one transaction, returning how many were written.
    ///
    /// Either every record is written or none is.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or any insert fails.
    pub fn insert_all(&self, records: &[StopRecord]) -> Result<usize> {
        let mut conn = self.connect()?;
        let result = (|| -> Result<usize> {
            let tx = conn.transaction()?;
            for record in records {
                insert_record(&tx, record)?;
            }
            tx.commit()?;
            Ok(records.len())
        })();
        close(conn, &self.path);

        let inserted = result?;
        info!("Inserted {inserted} stop records");
        Ok(inserted)
    }

    /// Count stop records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or queried.
    pub fn count(&self) -> Result<i64> {
        let conn = self.connect()?;
        let result = conn
            .query_row("SELECT COUNT(*) FROM traffic_stops", [], |row| row.get(0))
            .map_err(Error::from);
        close(conn, &self.path);
        result
    }

    /// Summary statistics about the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or queried.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.connect()?;
        let result = read_stats(&conn);
        close(conn, &self.path);

        let (total_stops, first, last) = result?;
        let parse = |s: Option<String>| s.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok());
        Ok(StoreStats {
            total_stops,
            first_stop: parse(first),
            last_stop: parse(last),
            db_size_bytes: std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        })
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of stop records.
    pub total_stops: i64,
    /// Date of the earliest stop.
    pub first_stop: Option<NaiveDate>,
    /// Date of the latest stop.
    pub last_stop: Option<NaiveDate>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

fn read_table(conn: &Connection, query: &str) -> Result<Table> {
    let mut stmt = conn.prepare(query)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(Value::from(row.get_ref(i)?));
        }
        data.push(cells);
    }

    debug!("Fetched {} rows x {} columns", data.len(), width);
    Ok(Table::new(columns, data))
}

fn read_stats(conn: &Connection) -> Result<(i64, Option<String>, Option<String>)> {
    Ok(conn.query_row(
        "SELECT COUNT(*), MIN(stop_date), MAX(stop_date) FROM traffic_stops",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?)
}

fn insert_record(conn: &Connection, record: &StopRecord) -> Result<()> {
    conn.execute(
        INSERT_STOP,
        params![
            record.stop_date.format(DATE_FORMAT).to_string(),
            record.stop_time.format(TIME_FORMAT).to_string(),
            record.country_name,
            record.driver_gender.as_str(),
            record.driver_age,
            record.driver_race,
            record.search_conducted,
            record.search_type,
            record.drugs_related_stop,
            record.stop_duration,
            record.vehicle_number,
            record.stop_outcome,
            record.violation,
            record.is_arrested,
        ],
    )?;
    Ok(())
}

fn close(conn: Connection, path: &Path) {
    if let Err((_, err)) = conn.close() {
        warn!("Failed to close connection to {}: {err}", path.display());
    }
}
