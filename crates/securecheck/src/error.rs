//! Error types for securecheck.
//!
//! Library functions return [`Result`]. The dashboard turns errors into page
//! notices instead of failing; the CLI reports them and exits.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong in securecheck.
#[derive(Error, Debug)]
pub enum Error {
    // === Store ===
    /// The stop records database could not be opened.
    #[error("cannot open stop records database {path}: {source}")]
    DatabaseOpen {
        /// Database file that was opened.
        path: PathBuf,
        /// Reason reported by `SQLite`.
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed against an open database.
    #[error("query against stop records failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The schema could not be brought to the current version.
    #[error("schema migration failed: {message}")]
    DatabaseMigration {
        /// What the migration tripped on.
        message: String,
    },

    // === Configuration ===
    /// The configuration sources could not be merged or parsed.
    #[error("cannot read configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// The configuration parsed but holds an unusable value.
    #[error("configuration rejected: {message}")]
    ConfigValidation {
        /// Which setting is wrong and why.
        message: String,
    },

    // === Dashboard ===
    /// No catalog query is registered under the given key.
    #[error("unknown query '{key}' (run `securecheck queries` for the list)")]
    UnknownQuery {
        /// The key that was looked up.
        key: String,
    },

    /// A prediction form field failed validation.
    #[error("invalid value for {field}: {message}")]
    InvalidForm {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    // === Import ===
    /// A CSV row could not be turned into a stop record.
    #[error("invalid record on line {line}: {message}")]
    ImportRecord {
        /// 1-based line number in the source file.
        line: u64,
        /// What was wrong with the row.
        message: String,
    },

    /// Reading or writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Files ===
    /// Reading or writing a file failed.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory for the database could not be created.
    #[error("cannot create directory {path}: {source}")]
    DirectoryCreate {
        /// Directory that was being created.
        path: PathBuf,
        /// Reason reported by the OS.
        #[source]
        source: std::io::Error,
    },

    /// JSON output could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A broken invariant inside securecheck.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(source: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(source))
    }
}

impl Error {
    /// An [`Error::Internal`] with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a form validation error for the named field.
    #[must_use]
    pub fn invalid_form(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidForm {
            field,
            message: message.into(),
        }
    }

    /// Create an unknown query error.
    #[must_use]
    pub fn unknown_query(key: impl Into<String>) -> Self {
        Self::UnknownQuery { key: key.into() }
    }

    /// Whether the store could not be reached at all.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::DatabaseOpen { .. })
    }

    /// Whether a form field was rejected.
    #[must_use]
    pub fn is_form_error(&self) -> bool {
        matches!(self, Self::InvalidForm { .. })
    }
}
