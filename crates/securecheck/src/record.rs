//! The stop record data model.
//!
//! One [`StopRecord`] is one row of the `traffic_stops` table.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Driver gender as recorded in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Stored as `male`.
    Male,
    /// Stored as `female`.
    Female,
}

impl Gender {
    /// The value stored in the `driver_gender` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(Error::invalid_form(
                "driver_gender",
                format!("expected 'male' or 'female', got '{other}'"),
            )),
        }
    }
}

/// One traffic stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    /// Row identifier, assigned by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Day of the stop.
    pub stop_date: NaiveDate,
    /// Time of day of the stop.
    pub stop_time: NaiveTime,
    /// Country the stop happened in.
    pub country_name: String,
    /// Driver gender.
    pub driver_gender: Gender,
    /// Driver age in years.
    pub driver_age: i64,
    /// Driver race, free text.
    pub driver_race: String,
    /// Whether a search was conducted.
    pub search_conducted: bool,
    /// Kind of search, free text.
    pub search_type: Option<String>,
    /// Whether the stop was drug related.
    pub drugs_related_stop: bool,
    /// Duration bucket, e.g. `0-15 Min`.
    pub stop_duration: String,
    /// Vehicle registration number.
    pub vehicle_number: String,
    /// Outcome, e.g. `Citation`, `Warning`, `Arrest`.
    pub stop_outcome: Option<String>,
    /// Violation, e.g. `Speeding`.
    pub violation: Option<String>,
    /// Whether the driver was arrested.
    pub is_arrested: bool,
}

/// Format used for `stop_date` in the store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for `stop_time` in the store.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Parse a stored or user-supplied time, accepting `HH:MM:SS` and `HH:MM`.
///
/// # Errors
///
/// Returns [`Error::InvalidForm`] if the value is not a time of day.
pub fn parse_time(value: &str) -> crate::Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| Error::invalid_form("stop_time", format!("'{value}' is not HH:MM[:SS]")))
}

/// Parse a stored or user-supplied date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`Error::InvalidForm`] if the value is not a date.
pub fn parse_date(value: &str) -> crate::Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| Error::invalid_form("stop_date", format!("'{value}' is not YYYY-MM-DD")))
}

/// Parse a boolean column value: `0`/`1`, `true`/`false`, `yes`/`no`.
///
/// # Errors
///
/// Returns [`Error::InvalidForm`] naming `field` for anything else.
pub fn parse_flag(field: &'static str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::invalid_form(
            field,
            format!("expected 0 or 1, got '{other}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_round_trip_through_str() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" Female ".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(Gender::Female.to_string(), "female");
    }

    #[test]
    fn test_gender_rejects_unknown() {
        let err = "other".parse::<Gender>().unwrap_err();
        assert!(err.is_form_error());
    }

    #[test]
    fn test_parse_time_accepts_both_forms() {
        assert_eq!(
            parse_time("10:30").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("23:05:09").unwrap(),
            NaiveTime::from_hms_opt(23, 5, 9).unwrap()
        );
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2020-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()
        );
        assert!(parse_date("15/01/2020").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("search_conducted", "1").unwrap());
        assert!(parse_flag("search_conducted", "TRUE").unwrap());
        assert!(!parse_flag("search_conducted", "0").unwrap());
        let err = parse_flag("drugs_related_stop", "maybe").unwrap_err();
        assert!(err.to_string().contains("drugs_related_stop"));
    }

    #[test]
    fn test_record_serialization_uses_lowercase_gender() {
        let record = StopRecord {
            id: None,
            stop_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            stop_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            country_name: "Canada".to_string(),
            driver_gender: Gender::Male,
            driver_age: 30,
            driver_race: "Asian".to_string(),
            search_conducted: false,
            search_type: None,
            drugs_related_stop: false,
            stop_duration: "0-15 Min".to_string(),
            vehicle_number: "AB123".to_string(),
            stop_outcome: Some("Warning".to_string()),
            violation: Some("Speeding".to_string()),
            is_arrested: false,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"driver_gender\":\"male\""));
        assert!(!json.contains("\"id\""));
    }
}
