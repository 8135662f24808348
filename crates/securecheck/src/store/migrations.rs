//! Schema versioning for the stop records database.
//!
//! The version lives in the `metadata` table under `schema_version`. Each
//! [`MIGRATIONS`] step moves the schema up by one version; a fresh database
//! starts at 0 and runs all of them.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{CREATE_VEHICLE_INDEX, SCHEMA_STATEMENTS};

/// The current schema version.
pub const CURRENT_VERSION: i32 = 2;

const VERSION_KEY: &str = "schema_version";

type Migration = fn(&Connection) -> Result<()>;

/// Migration steps; entry `n` upgrades version `n` to `n + 1`.
const MIGRATIONS: [Migration; CURRENT_VERSION as usize] = [
    // 0 -> 1: the base tables from SCHEMA_STATEMENTS, nothing to do
    |_| Ok(()),
    // 1 -> 2
    |conn| {
        conn.execute(CREATE_VEHICLE_INDEX, [])?;
        Ok(())
    },
];

/// Create the base schema and bring it to [`CURRENT_VERSION`].
///
/// Safe to call on every start.
///
/// # Errors
///
/// Returns an error if a statement fails, the stored version is not a
/// number, or the stored version is newer than this build knows.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }
    if version == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    let pending = usize::try_from(version).unwrap_or(0);
    for (from, migrate) in MIGRATIONS.iter().enumerate().skip(pending) {
        migrate(&tx)?;
        info!("Migrated schema from version {from} to {}", from + 1);
    }
    tx.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, CURRENT_VERSION.to_string()),
    )?;
    tx.commit()?;
    Ok(())
}

/// The stored schema version, 0 when none is recorded.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value.map_or(Ok(0), |v| {
        v.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {v}"),
        })
    })
}
