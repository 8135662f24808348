//! `SQLite` schema definitions for securecheck.

/// Name of the stop records table.
pub const STOPS_TABLE: &str = "traffic_stops";

/// SQL statement to create the stop records table.
pub const CREATE_STOPS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS traffic_stops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stop_date TEXT NOT NULL,
    stop_time TEXT NOT NULL,
    country_name TEXT NOT NULL,
    driver_gender TEXT NOT NULL,
    driver_age INTEGER NOT NULL,
    driver_race TEXT NOT NULL,
    search_conducted INTEGER NOT NULL DEFAULT 0,
    search_type TEXT,
    drugs_related_stop INTEGER NOT NULL DEFAULT 0,
    stop_duration TEXT NOT NULL,
    vehicle_number TEXT NOT NULL,
    stop_outcome TEXT,
    violation TEXT,
    is_arrested INTEGER NOT NULL DEFAULT 0
)
";

/// Index backing the per-country breakdowns.
pub const CREATE_COUNTRY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_stops_country ON traffic_stops(country_name)
";

/// Index backing the per-violation breakdowns.
pub const CREATE_VIOLATION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_stops_violation ON traffic_stops(violation)
";

/// Index backing the per-vehicle rankings (schema version 2).
pub const CREATE_VEHICLE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_stops_vehicle ON traffic_stops(vehicle_number)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_STOPS_TABLE,
    CREATE_COUNTRY_INDEX,
    CREATE_VIOLATION_INDEX,
    CREATE_METADATA_TABLE,
];

/// Columns of `traffic_stops` in table order.
pub const STOP_COLUMNS: &[&str] = &[
    "id",
    "stop_date",
    "stop_time",
    "country_name",
    "driver_gender",
    "driver_age",
    "driver_race",
    "search_conducted",
    "search_type",
    "drugs_related_stop",
    "stop_duration",
    "vehicle_number",
    "stop_outcome",
    "violation",
    "is_arrested",
];
