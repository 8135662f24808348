//! Command-line interface for securecheck.
//!
//! This module provides the CLI structure for the `securecheck` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ChartsCommand, ConfigCommand, DimensionArg, FormArgs, GenderArg, ImportCommand,
    OutputFormat, OverviewCommand, PredictCommand, QueryCommand, ReportCommand, StatusCommand,
};

use crate::logging::Verbosity;

/// securecheck - Police vehicle stop dashboard
///
/// Browse traffic stop records, run the predefined analytical queries and
/// predict the likely outcome of a stop from similar historical stops.
#[derive(Debug, Parser)]
#[command(name = "securecheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file (overrides the configuration)
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database and its schema
    Init,

    /// Import stop records from a CSV file
    Import(ImportCommand),

    /// Show database statistics
    Status(StatusCommand),

    /// Show the stop records
    Overview(OverviewCommand),

    /// Draw the violation, gender and race charts
    Charts(ChartsCommand),

    /// List the predefined queries
    Queries,

    /// Run a predefined query
    Query(QueryCommand),

    /// Predict the outcome and violation of a stop
    Predict(PredictCommand),

    /// Write the dashboard as an HTML page
    Report(ReportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::Flag;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "securecheck");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_from_flags() {
        let cli = Cli::try_parse_from(["securecheck", "-q", "queries"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::try_parse_from(["securecheck", "queries"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Normal);

        let cli = Cli::try_parse_from(["securecheck", "-vv", "queries"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from(["securecheck", "import", "stops.csv"]).unwrap();
        match cli.command {
            Command::Import(cmd) => assert_eq!(cmd.file, PathBuf::from("stops.csv")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_query_with_format() {
        let cli =
            Cli::try_parse_from(["securecheck", "query", "busiest-hour", "-f", "csv"]).unwrap();
        match cli.command {
            Command::Query(cmd) => {
                assert_eq!(cmd.key, "busiest-hour");
                assert_eq!(cmd.format, OutputFormat::Csv);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_charts_dimension() {
        let cli = Cli::try_parse_from(["securecheck", "charts", "-d", "gender"]).unwrap();
        match cli.command {
            Command::Charts(cmd) => assert_eq!(cmd.dimension, Some(DimensionArg::Gender)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "securecheck",
            "predict",
            "--gender",
            "female",
            "--age",
            "45",
            "--search",
            "1",
            "--duration",
            "16-30 Min",
            "--save",
        ])
        .unwrap();
        match cli.command {
            Command::Predict(cmd) => {
                assert!(cmd.save);
                assert!(!cmd.json);
                assert_eq!(cmd.form.gender, GenderArg::Female);
                assert_eq!(cmd.form.age, 45);
                assert_eq!(cmd.form.search, Flag::Yes);
                assert_eq!(cmd.form.drugs, Flag::No);
                assert_eq!(cmd.form.duration.as_deref(), Some("16-30 Min"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_predict_rejects_bad_flag() {
        assert!(Cli::try_parse_from(["securecheck", "predict", "--drugs", "maybe"]).is_err());
    }

    #[test]
    fn test_parse_report() {
        let cli = Cli::try_parse_from([
            "securecheck",
            "report",
            "-o",
            "out.html",
            "--query",
            "night-arrests",
            "--predict",
        ])
        .unwrap();
        match cli.command {
            Command::Report(cmd) => {
                assert_eq!(cmd.output, Some(PathBuf::from("out.html")));
                assert_eq!(cmd.query.as_deref(), Some("night-arrests"));
                assert!(cmd.predict);
                assert_eq!(cmd.form.age, 27);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "securecheck",
            "status",
            "--database",
            "/tmp/stops.db",
            "-c",
            "/custom/config.toml",
        ])
        .unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/stops.db")));
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["securecheck", "config", "validate", "-f", "x.toml"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
