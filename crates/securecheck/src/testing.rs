//! Shared fixtures for unit tests.

use std::ops::Deref;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};

use crate::record::StopRecord;
use crate::store::Store;

/// A file name under the system temp dir, unique to this test process.
pub fn temp_path(name: &str, extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "securecheck_test_{}_{name}.{extension}",
        std::process::id()
    ))
}

/// A test database that is deleted when dropped.
#[derive(Debug)]
pub struct TempStore(Store);

impl Deref for TempStore {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.0
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        std::fs::remove_file(self.0.path()).ok();
    }
}

/// A freshly initialised database under the system temp dir.
pub fn temp_store(name: &str) -> TempStore {
    let path = temp_path(name, "db");
    std::fs::remove_file(&path).ok();
    TempStore(Store::initialize(&path).expect("failed to initialize test store"))
}

/// A stop record with the five prediction fields and the two targets set.
pub fn record(
    gender: &str,
    age: i64,
    search: bool,
    duration: &str,
    drugs: bool,
    outcome: &str,
    violation: &str,
) -> StopRecord {
    StopRecord {
        id: None,
        stop_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
        stop_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        country_name: "Canada".to_string(),
        driver_gender: gender.parse().unwrap(),
        driver_age: age,
        driver_race: "White".to_string(),
        search_conducted: search,
        search_type: None,
        drugs_related_stop: drugs,
        stop_duration: duration.to_string(),
        vehicle_number: format!("VEH{age}"),
        stop_outcome: Some(outcome.to_string()),
        violation: Some(violation.to_string()),
        is_arrested: outcome == "Arrest",
    }
}
