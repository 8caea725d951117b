//! Global clinic calendar configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ClinicError, ClinicResult};

static DEFAULT_DATA_DIR: &str = "~/.clinic";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_narrow_width() -> u16 {
    100
}

fn default_day_start_hour() -> u32 {
    8
}

fn default_day_end_hour() -> u32 {
    18
}

/// Configuration at ~/.config/clinic/config.toml
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClinicConfig {
    /// Where appointments, the session and the roster live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Start in dark mode.
    #[serde(default)]
    pub dark_mode: bool,

    /// Terminals narrower than this render the day list.
    #[serde(default = "default_narrow_width")]
    pub narrow_width: u16,

    /// First hour row of the week grid.
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,

    /// Hour the week grid stops at (exclusive).
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        ClinicConfig {
            data_dir: default_data_dir(),
            dark_mode: false,
            narrow_width: default_narrow_width(),
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
        }
    }
}

impl ClinicConfig {
    pub fn config_path() -> ClinicResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ClinicError::Config("Could not determine config directory".into()))?
            .join("clinic");

        Ok(config_dir.join("config.toml"))
    }

    pub fn validate(&self) -> ClinicResult<()> {
        if self.day_start_hour >= self.day_end_hour || self.day_end_hour > 24 {
            return Err(ClinicError::Config(format!(
                "Invalid grid hours {}..{}: need start < end <= 24",
                self.day_start_hour, self.day_end_hour
            )));
        }
        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ClinicResult<()> {
        let contents = format!(
            "\
# clinic calendar configuration

# Where appointments, the login session and roster.toml live:
# data_dir = \"{}\"

# Start in dark mode:
# dark_mode = false

# Terminals narrower than this many columns show the day list:
# narrow_width = {}

# Hours shown in the week grid:
# day_start_hour = {}
# day_end_hour = {}
",
            DEFAULT_DATA_DIR,
            default_narrow_width(),
            default_day_start_hour(),
            default_day_end_hour(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClinicError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ClinicError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic/config.toml");
        ClinicConfig::create_default_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: ClinicConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, ClinicConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let parsed: ClinicConfig = toml::from_str("dark_mode = true\nnarrow_width = 60\n").unwrap();
        assert!(parsed.dark_mode);
        assert_eq!(parsed.narrow_width, 60);
        assert_eq!(parsed.day_start_hour, 8);
    }

    #[test]
    fn rejects_inverted_hours() {
        let config = ClinicConfig {
            day_start_hour: 18,
            day_end_hour: 8,
            ..ClinicConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(ClinicConfig::default().validate().is_ok());
    }
}
