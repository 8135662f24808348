//! `securecheck` - A police vehicle-stop dashboard over a `SQLite` store
//!
//! This library loads traffic stop records, runs a fixed catalog of
//! analytical queries, draws frequency charts and predicts the likely
//! outcome of a stop from matching historical stops. The [`dashboard`]
//! module assembles all of it into one page per request.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod charts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod html;
pub mod import;
pub mod logging;
pub mod predict;
pub mod record;
pub mod store;
pub mod table;

#[cfg(test)]
mod testing;

pub use catalog::{CatalogEntry, CATALOG};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardRequest, Page};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use predict::{Prediction, PredictionForm, Predictor};
pub use record::{Gender, StopRecord};
pub use store::{Store, StoreStats};
pub use table::{Table, Value};
