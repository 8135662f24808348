//! Outcome and violation prediction by exact-match lookup.
//!
//! The form is matched against the already fetched base dataset on five
//! fields. The most frequent `stop_outcome` and `violation` of the matching
//! rows are the prediction; when nothing matches the configured fallbacks
//! are reported instead.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::record::{parse_flag, Gender, StopRecord};
use crate::table::{Table, Value};

/// Outcome reported when no row matches.
pub const FALLBACK_OUTCOME: &str = "warning";

/// Violation reported when no row matches.
pub const FALLBACK_VIOLATION: &str = "speeding";

/// Accepted driver ages.
pub const AGE_RANGE: std::ops::RangeInclusive<i64> = 16..=100;

/// Driver age the form starts with.
pub const DEFAULT_AGE: i64 = 27;

/// A yes/no form answer, submitted as `"0"` or `"1"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Flag {
    /// `"0"`
    #[default]
    No,
    /// `"1"`
    Yes,
}

impl Flag {
    /// Whether the answer is yes.
    #[must_use]
    pub fn is_set(self) -> bool {
        self == Self::Yes
    }

    /// The cell a matching stored row carries.
    fn cell(self) -> Value {
        Value::Integer(i64::from(u8::from(self)))
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl From<Flag> for u8 {
    fn from(flag: Flag) -> Self {
        u8::from(flag.is_set())
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Parses `0`/`1` (and `true`/`false`, `yes`/`no`).
impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_flag("flag", s).map(Self::from)
    }
}

/// A submitted "new police log" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionForm {
    /// Day of the stop.
    pub stop_date: NaiveDate,
    /// Time of the stop.
    pub stop_time: NaiveTime,
    /// Country of the stop.
    pub country_name: String,
    /// Driver gender.
    pub driver_gender: Gender,
    /// Driver age, within [`AGE_RANGE`].
    pub driver_age: i64,
    /// Driver race.
    pub driver_race: String,
    /// Was a search conducted.
    pub search_conducted: Flag,
    /// Kind of search.
    pub search_type: String,
    /// Was the stop drug related.
    pub drugs_related_stop: Flag,
    /// One of the durations present in the dataset.
    pub stop_duration: String,
    /// Vehicle registration number.
    pub vehicle_number: String,
}

impl PredictionForm {
    /// Check the bounded fields.
    ///
    /// `durations` is the list offered to the user, see [`duration_choices`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidForm`] for an age outside [`AGE_RANGE`] or a
    /// duration not in `durations`.
    pub fn validate(&self, durations: &[String]) -> Result<()> {
        if !AGE_RANGE.contains(&self.driver_age) {
            return Err(Error::invalid_form(
                "driver_age",
                format!(
                    "{} is outside {}..={}",
                    self.driver_age,
                    AGE_RANGE.start(),
                    AGE_RANGE.end()
                ),
            ));
        }
        if !durations.contains(&self.stop_duration) {
            let message = if durations.is_empty() {
                "no stop durations are recorded yet".to_string()
            } else {
                format!(
                    "'{}' is not one of: {}",
                    self.stop_duration,
                    durations.join(", ")
                )
            };
            return Err(Error::invalid_form("stop_duration", message));
        }
        Ok(())
    }

    /// The stop record this form describes, carrying the prediction.
    #[must_use]
    pub fn to_record(&self, prediction: &Prediction) -> StopRecord {
        StopRecord {
            id: None,
            stop_date: self.stop_date,
            stop_time: self.stop_time,
            country_name: self.country_name.clone(),
            driver_gender: self.driver_gender,
            driver_age: self.driver_age,
            driver_race: self.driver_race.clone(),
            search_conducted: self.search_conducted.is_set(),
            search_type: Some(self.search_type.clone()).filter(|s| !s.trim().is_empty()),
            drugs_related_stop: self.drugs_related_stop.is_set(),
            stop_duration: self.stop_duration.clone(),
            vehicle_number: self.vehicle_number.clone(),
            stop_outcome: Some(prediction.outcome.clone()),
            violation: Some(prediction.violation.clone()),
            is_arrested: false,
        }
    }

    fn matches(&self, row: &[Value], columns: &MatchColumns) -> bool {
        row[columns.gender] == Value::from(self.driver_gender.as_str())
            && row[columns.age] == Value::Integer(self.driver_age)
            && row[columns.search] == self.search_conducted.cell()
            && row[columns.duration] == Value::from(self.stop_duration.as_str())
            && row[columns.drugs] == self.drugs_related_stop.cell()
    }
}

struct MatchColumns {
    gender: usize,
    age: usize,
    search: usize,
    duration: usize,
    drugs: usize,
}

impl MatchColumns {
    fn locate(data: &Table) -> Option<Self> {
        Some(Self {
            gender: data.column_index("driver_gender")?,
            age: data.column_index("driver_age")?,
            search: data.column_index("search_conducted")?,
            duration: data.column_index("stop_duration")?,
            drugs: data.column_index("drugs_related_stop")?,
        })
    }
}

/// The predicted outcome and violation for a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    /// Most likely stop outcome.
    pub outcome: String,
    /// Most likely violation.
    pub violation: String,
    /// Number of historical rows the prediction is drawn from.
    pub matched_rows: usize,
    /// True when no row matched and the fallbacks were used.
    pub used_fallback: bool,
}

impl Prediction {
    /// The sentence describing the submitted stop.
    #[must_use]
    pub fn summary(&self, form: &PredictionForm) -> String {
        let search = if form.search_conducted.is_set() {
            "A search was conducted"
        } else {
            "No search was conducted"
        };
        let drugs = if form.drugs_related_stop.is_set() {
            "was drug-related"
        } else {
            "was not drug-related"
        };
        format!(
            "A {}-year-old {} driver in {} was stopped at {} on {}. \
             {search}, and the stop {drugs}. \
             Stop duration: {}. Vehicle Number: {}.",
            form.driver_age,
            form.driver_gender,
            form.country_name,
            form.stop_time.format("%I:%M %p"),
            form.stop_date,
            form.stop_duration,
            form.vehicle_number,
        )
    }
}

/// Distinct non-null `stop_duration` values of the dataset, for the form.
#[must_use]
pub fn duration_choices(data: &Table) -> Vec<String> {
    data.distinct("stop_duration")
}

/// Looks up predictions with a fixed pair of fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predictor {
    fallback_outcome: String,
    fallback_violation: String,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new(FALLBACK_OUTCOME, FALLBACK_VIOLATION)
    }
}

impl Predictor {
    /// A predictor with the given fallbacks.
    pub fn new(outcome: impl Into<String>, violation: impl Into<String>) -> Self {
        Self {
            fallback_outcome: outcome.into(),
            fallback_violation: violation.into(),
        }
    }

    /// A predictor using the configured fallbacks.
    #[must_use]
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(&config.fallback_outcome, &config.fallback_violation)
    }

    /// Predict the outcome and violation of `form` from `data`.
    ///
    /// `data` is the base dataset; no query is run.
    #[must_use]
    pub fn predict(&self, form: &PredictionForm, data: &Table) -> Prediction {
        let subset = match MatchColumns::locate(data) {
            Some(columns) => data.filter(|row| form.matches(row, &columns)),
            None => Table::empty(),
        };
        debug!(matched = subset.len(), "filtered dataset for prediction");

        if subset.is_empty() {
            return Prediction {
                outcome: self.fallback_outcome.clone(),
                violation: self.fallback_violation.clone(),
                matched_rows: 0,
                used_fallback: true,
            };
        }

        Prediction {
            outcome: mode(&subset, "stop_outcome").unwrap_or_else(|| self.fallback_outcome.clone()),
            violation: mode(&subset, "violation")
                .unwrap_or_else(|| self.fallback_violation.clone()),
            matched_rows: subset.len(),
            used_fallback: false,
        }
    }
}

/// Predict with the default fallbacks.
#[must_use]
pub fn predict(form: &PredictionForm, data: &Table) -> Prediction {
    Predictor::default().predict(form, data)
}

/// Most frequent non-null value; ties go to the smallest value.
fn mode(data: &Table, column: &str) -> Option<String> {
    data.value_counts(column)?
        .into_iter()
        .next()
        .map(|(value, _)| value)
}
