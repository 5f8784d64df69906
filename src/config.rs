//! User configuration read from `config.toml`.
//!
//! ```toml
//! [allocation]
//! holiday_policy = "redistribute"    # or "drop"
//! mixed_event_policy = "prefer_planned"
//! row_mode = "compact"               # or "expanded"
//!
//! [view]
//! mode = "days"                      # or "weeks"
//! days_before = 7
//! days_after = 30
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::model::TimelineMode;
use crate::timeline::AllocationPolicy;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "WORKLOAD_TIMELINE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub allocation: AllocationPolicy,
    pub view: ViewConfig,
}

/// Initial viewport placement around today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub mode: TimelineMode,
    pub days_before: i64,
    pub days_after: i64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mode: TimelineMode::Days,
            days_before: 7,
            days_after: 30,
        }
    }
}

impl Config {
    /// `$WORKLOAD_TIMELINE_CONFIG`, else the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "workload-timeline").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location; defaults when there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{HolidayPolicy, MixedEventPolicy, RowMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::parse(
            r#"
            [allocation]
            holiday_policy = "drop"
            row_mode = "expanded"

            [view]
            mode = "weeks"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.allocation.holiday_policy, HolidayPolicy::Drop);
        assert_eq!(cfg.allocation.mixed_event_policy, MixedEventPolicy::PreferPlanned);
        assert_eq!(cfg.allocation.row_mode, RowMode::Expanded);
        assert_eq!(cfg.view.mode, TimelineMode::Weeks);
        assert_eq!(cfg.view.days_after, 30);
    }

    #[test]
    fn unknown_policy_is_an_error() {
        assert!(Config::parse("[allocation]\nholiday_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[view\nmode = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
