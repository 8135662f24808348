//! CLI command definitions.
//!
//! This module defines the arguments of every subcommand and how the
//! prediction arguments become a [`PredictionForm`].

use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Subcommand, ValueEnum};

use crate::charts::Dimension;
use crate::error::Result;
use crate::predict::{Flag, PredictionForm, DEFAULT_AGE};
use crate::record::{parse_date, parse_time, Gender};

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// CSV file with a header row naming the stop record columns
    #[arg(value_name = "CSV")]
    pub file: PathBuf,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Overview command arguments.
#[derive(Debug, Args)]
pub struct OverviewCommand {
    /// Show at most this many rows (default: from configuration)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Charts command arguments.
#[derive(Debug, Args)]
pub struct ChartsCommand {
    /// Chart to draw (all when omitted)
    #[arg(short, long, value_enum)]
    pub dimension: Option<DimensionArg>,
}

/// Query command arguments.
#[derive(Debug, Args)]
pub struct QueryCommand {
    /// Catalog key or exact menu text, see `securecheck queries`
    pub key: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Predict command arguments.
#[derive(Debug, Args)]
pub struct PredictCommand {
    /// The stop to predict.
    #[command(flatten)]
    pub form: FormArgs,

    /// Also insert the stop, with its prediction, into the store
    #[arg(long)]
    pub save: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Where to write the HTML page (default: from configuration)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Catalog query to include
    #[arg(long, value_name = "KEY")]
    pub query: Option<String>,

    /// Show at most this many overview rows (default: from configuration)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Include a prediction for the stop described by the form arguments
    #[arg(long)]
    pub predict: bool,

    /// The stop to predict with `--predict`.
    #[command(flatten)]
    pub form: FormArgs,
}

/// The "new police log" form.
#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    /// Stop date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,

    /// Stop time, HH:MM[:SS] (default: now)
    #[arg(long)]
    pub time: Option<String>,

    /// Country name
    #[arg(long, default_value = "")]
    pub country: String,

    /// Driver gender
    #[arg(long, value_enum, default_value = "male")]
    pub gender: GenderArg,

    /// Driver age, 16 to 100
    #[arg(long, default_value_t = DEFAULT_AGE)]
    pub age: i64,

    /// Driver race
    #[arg(long, default_value = "")]
    pub race: String,

    /// Was a search conducted (0 or 1)
    #[arg(long, default_value = "0", value_parser = parse_flag_arg)]
    pub search: Flag,

    /// Search type
    #[arg(long, default_value = "")]
    pub search_type: String,

    /// Was the stop drug related (0 or 1)
    #[arg(long, default_value = "0", value_parser = parse_flag_arg)]
    pub drugs: Flag,

    /// Stop duration, one of the recorded values (default: the first recorded)
    #[arg(long)]
    pub duration: Option<String>,

    /// Vehicle number
    #[arg(long, default_value = "")]
    pub vehicle: String,
}

impl FormArgs {
    /// Build the form, filling defaults from the clock and `durations`.
    ///
    /// Without `--duration` the first of `durations` is taken. When that is
    /// empty too, the duration stays empty for [`crate::Dashboard::render`]
    /// to fill from the dataset it loads.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidForm`] for an unparseable date or time.
    pub fn to_form(&self, durations: &[String]) -> Result<PredictionForm> {
        let now = Local::now();
        let stop_duration = self
            .duration
            .clone()
            .or_else(|| durations.first().cloned())
            .unwrap_or_default();

        Ok(PredictionForm {
            stop_date: self
                .date
                .as_deref()
                .map_or(Ok(now.date_naive()), parse_date)?,
            stop_time: self
                .time
                .as_deref()
                .map_or(Ok(now.time()), parse_time)?,
            country_name: self.country.clone(),
            driver_gender: self.gender.into(),
            driver_age: self.age,
            driver_race: self.race.clone(),
            search_conducted: self.search,
            search_type: self.search_type.clone(),
            drugs_related_stop: self.drugs,
            stop_duration,
            vehicle_number: self.vehicle.clone(),
        })
    }
}

fn parse_flag_arg(value: &str) -> std::result::Result<Flag, String> {
    match value {
        "0" => Ok(Flag::No),
        "1" => Ok(Flag::Yes),
        other => Err(format!("expected 0 or 1, got '{other}'")),
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Driver gender argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenderArg {
    /// Male driver
    Male,
    /// Female driver
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
        }
    }
}

/// Chart selection argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DimensionArg {
    /// Stops by violation
    Violation,
    /// Driver gender distribution
    Gender,
    /// Driver race metrics
    Race,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Violation => Self::Violation,
            DimensionArg::Gender => Self::Gender,
            DimensionArg::Race => Self::Race,
        }
    }
}

/// Output format for tabular commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON output
    Json,
    /// CSV with a header row
    Csv,
}
