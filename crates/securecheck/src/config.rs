//! Configuration management for securecheck.
//!
//! Configuration is loaded with figment from defaults, an optional TOML file
//! and `SECURECHECK_`-prefixed environment variables (`__` separates nested
//! keys, e.g. `SECURECHECK_STORE__DATABASE_PATH`). The store connection
//! parameters live here instead of in the code.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "securecheck";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "traffic_stops.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SECURECHECK_`)
/// 2. TOML config file at `~/.config/securecheck/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store connection configuration.
    pub store: StoreConfig,
    /// Dashboard presentation configuration.
    pub dashboard: DashboardConfig,
    /// HTML report configuration.
    pub report: ReportConfig,
}

/// Store connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/securecheck/traffic_stops.db`
    pub database_path: Option<PathBuf>,
}

/// Dashboard presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Page title and main header.
    pub title: String,
    /// Maximum rows shown in the overview table. 0 shows every row.
    pub overview_limit: usize,
    /// Outcome reported when no historical row matches the form.
    pub fallback_outcome: String,
    /// Violation reported when no historical row matches the form.
    pub fallback_violation: String,
}

/// HTML report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Where `securecheck report` writes the page when `--output` is absent.
    pub output_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "SecureCheck: Police Vehicle Check Dashboard".to_string(),
            overview_limit: 0,
            fallback_outcome: crate::predict::FALLBACK_OUTCOME.to_string(),
            fallback_violation: crate::predict::FALLBACK_VIOLATION.to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("securecheck.html"),
        }
    }
}

impl Config {
    /// Load configuration from all sources, reading `config_path` or the
    /// default file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SECURECHECK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.dashboard.title.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "dashboard.title must not be empty".to_string(),
            });
        }

        if self.dashboard.fallback_outcome.trim().is_empty()
            || self.dashboard.fallback_violation.trim().is_empty()
        {
            return Err(Error::ConfigValidation {
                message: "fallback_outcome and fallback_violation must not be empty".to_string(),
            });
        }

        if self.report.output_path.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "report.output_path must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Overview row limit, `None` meaning unlimited.
    #[must_use]
    pub fn overview_limit(&self) -> Option<usize> {
        match self.dashboard.overview_limit {
            0 => None,
            n => Some(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.store.database_path.is_none());
        assert_eq!(config.dashboard.fallback_outcome, "warning");
        assert_eq!(config.dashboard.fallback_violation, "speeding");
        assert_eq!(config.dashboard.overview_limit, 0);
        assert!(config.dashboard.title.starts_with("SecureCheck"));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_title() {
        let mut config = Config::default();
        config.dashboard.title = "   ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("dashboard.title"));
    }

    #[test]
    fn test_validate_empty_fallback() {
        let mut config = Config::default();
        config.dashboard.fallback_violation = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("fallback"));
    }

    #[test]
    fn test_validate_empty_output_path() {
        let mut config = Config::default();
        config.report.output_path = PathBuf::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("traffic_stops.db"));
        assert!(path.to_string_lossy().contains("securecheck"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.store.database_path = Some(PathBuf::from("/custom/path/stops.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/stops.sqlite")
        );
    }

    #[test]
    fn test_overview_limit() {
        let mut config = Config::default();
        assert_eq!(config.overview_limit(), None);

        config.dashboard.overview_limit = 25;
        assert_eq!(config.overview_limit(), Some(25));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("securecheck"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.dashboard, DashboardConfig::default());
    }

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = crate::testing::temp_path(name, "toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = temp_config(
            "config_test",
            "[store]\ndatabase_path = \"/tmp/stops.db\"\n\n[dashboard]\noverview_limit = 10\n",
        );

        let config = Config::load_from(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/stops.db"));
        assert_eq!(config.overview_limit(), Some(10));
        assert_eq!(config.dashboard.fallback_outcome, "warning");
    }

    #[test]
    fn test_every_section_is_read_from_file() {
        let path = temp_config(
            "config_sections",
            "[dashboard]\nfallback_outcome = \"citation\"\nfallback_violation = \"dui\"\n\n\
             [report]\noutput_path = \"/tmp/report.html\"\n",
        );

        let config = Config::load_from(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.dashboard.fallback_outcome, "citation");
        assert_eq!(config.dashboard.fallback_violation, "dui");
        assert_eq!(config.report.output_path, PathBuf::from("/tmp/report.html"));
    }

    #[test]
    fn test_dashboard_config_deserialize() {
        let json = r#"{"fallback_outcome": "citation"}"#;
        let dashboard: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(dashboard.fallback_outcome, "citation");
        assert_eq!(dashboard.fallback_violation, "speeding");
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("database_path"));
        assert!(json.contains("fallback_violation"));
    }
}
