//! The dashboard page as a value.
//!
//! [`Dashboard::render`] is a function of the request and the store
//! contents. It fetches the base dataset once and threads it through the
//! overview, the chart tabs and the prediction form, then runs the selected
//! catalog query. Nothing is cached between calls. Faults never abort the
//! page; they become [`Notice`]s next to the part that failed.

use tracing::{error, info, warn};

use crate::catalog::CatalogEntry;
use crate::charts::{self, ChartUnavailable, FrequencyTable};
use crate::config::DashboardConfig;
use crate::predict::{self, Prediction, PredictionForm, Predictor};
use crate::store::{Store, BASE_QUERY};
use crate::table::Table;

/// Warning shown when a catalog query returns no rows.
pub const EMPTY_QUERY_WARNING: &str = "No results found for the selected query.";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something was skipped or came back empty.
    Warning,
    /// Something failed.
    Error,
}

/// A message shown on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// A warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// An error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// What the user asked for on this page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardRequest {
    /// Catalog query to run, if one was selected.
    pub query: Option<&'static CatalogEntry>,
    /// Submitted prediction form, if any. An empty `stop_duration` takes
    /// the first recorded duration.
    pub form: Option<PredictionForm>,
    /// Row limit for the overview table. `None` shows every row.
    pub overview_limit: Option<usize>,
}

/// Result of running one catalog query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPanel {
    /// The query that was run.
    pub entry: &'static CatalogEntry,
    /// Result rows; empty on failure.
    pub table: Table,
    /// Set when the result is empty or the query failed.
    pub notice: Option<Notice>,
}

/// A prediction for a valid form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionPanel {
    /// The submitted form.
    pub form: PredictionForm,
    /// The lookup result.
    pub prediction: Prediction,
    /// Sentence describing the stop.
    pub summary: String,
}

/// One rendered dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Overview of the stop records.
    pub overview: Table,
    /// Total rows in the base dataset, before the overview limit.
    pub total_rows: usize,
    /// Chart tabs, in [`charts::Dimension::ALL`] order.
    pub charts: Vec<Result<FrequencyTable, ChartUnavailable>>,
    /// Stop durations the form offers.
    pub durations: Vec<String>,
    /// The selected query, if any.
    pub query: Option<QueryPanel>,
    /// The prediction, if a valid form was submitted.
    pub prediction: Option<PredictionPanel>,
    /// Page-level messages.
    pub notices: Vec<Notice>,
}

/// Renders pages from one store.
#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    store: &'a Store,
    predictor: Predictor,
}

impl<'a> Dashboard<'a> {
    /// A dashboard over `store` with the configured fallbacks.
    #[must_use]
    pub fn new(store: &'a Store, config: &DashboardConfig) -> Self {
        Self {
            store,
            predictor: Predictor::from_config(config),
        }
    }

    /// Build the page for one request.
    #[must_use]
    pub fn render(&self, request: &DashboardRequest) -> Page {
        let mut notices = Vec::new();

        let data = match self.store.try_fetch(BASE_QUERY) {
            Ok(table) => table,
            Err(e) => {
                error!(error = %e, "failed to load stop records");
                let message = if e.is_connection_error() {
                    format!("Could not connect to the stop records database: {e}")
                } else {
                    format!("Could not load stop records: {e}")
                };
                notices.push(Notice::error(message));
                Table::empty()
            }
        };

        let overview = match request.overview_limit {
            Some(limit) => data.head(limit),
            None => data.clone(),
        };
        let durations = predict::duration_choices(&data);

        let prediction = request
            .form
            .clone()
            .map(|form| with_default_duration(form, &durations))
            .and_then(|form| match form.validate(&durations) {
                Ok(()) => Some(self.prediction_panel(&form, &data)),
                Err(e) => {
                    warn!(error = %e, "rejected prediction form");
                    notices.push(Notice::error(e.to_string()));
                    None
                }
            });

        Page {
            total_rows: data.len(),
            charts: charts::all_frequencies(&data),
            query: request.query.map(|entry| self.run_query(entry)),
            overview,
            durations,
            prediction,
            notices,
        }
    }

    /// Run one catalog query.
    #[must_use]
    pub fn run_query(&self, entry: &'static CatalogEntry) -> QueryPanel {
        info!(query = entry.key, "running catalog query");
        let (table, notice) = match self.store.try_fetch(entry.statement) {
            Ok(table) if table.is_empty() => {
                warn!(query = entry.key, "query returned no rows");
                (table, Some(Notice::warning(EMPTY_QUERY_WARNING)))
            }
            Ok(table) => (table, None),
            Err(e) => {
                error!(query = entry.key, error = %e, "query failed");
                (Table::empty(), Some(Notice::error(format!("Query failed: {e}"))))
            }
        };
        QueryPanel {
            entry,
            table,
            notice,
        }
    }

    fn prediction_panel(&self, form: &PredictionForm, data: &Table) -> PredictionPanel {
        let prediction = self.predictor.predict(form, data);
        if prediction.used_fallback {
            info!("no matching stops; reporting fallback prediction");
        }
        PredictionPanel {
            summary: prediction.summary(form),
            form: form.clone(),
            prediction,
        }
    }
}

fn with_default_duration(mut form: PredictionForm, durations: &[String]) -> PredictionForm {
    if form.stop_duration.is_empty() {
        if let Some(first) = durations.first() {
            form.stop_duration.clone_from(first);
        }
    }
    form
}
