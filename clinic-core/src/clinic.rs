//! Clinic data directory management.

use std::path::PathBuf;

use ::config::{Config, File};

use crate::config::ClinicConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::kv::FileStore;
use crate::roster::Roster;

const STORAGE_DIR: &str = "storage";
const ROSTER_FILE: &str = "roster.toml";

#[derive(Clone, Debug)]
pub struct Clinic {
    config: ClinicConfig,
}

impl Clinic {
    /// Read ~/.config/clinic/config.toml, creating it on first use.
    pub fn load() -> ClinicResult<Self> {
        let config_path = ClinicConfig::config_path()?;

        if !config_path.exists() {
            ClinicConfig::create_default_config(&config_path)?;
        }

        let config: ClinicConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .build()
            .map_err(|e| ClinicError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ClinicError::Config(e.to_string()))?;

        Self::from_config(config)
    }

    pub fn from_config(config: ClinicConfig) -> ClinicResult<Self> {
        config.validate()?;
        Ok(Clinic { config })
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.config.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Returns the data directory in display-friendly form, keeping `~`.
    pub fn display_path(&self) -> PathBuf {
        self.config.data_dir.clone()
    }

    /// The key-value slots standing in for browser local storage.
    pub fn storage(&self) -> FileStore {
        FileStore::new(self.data_path().join(STORAGE_DIR))
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_path().join(ROSTER_FILE)
    }

    pub fn roster(&self) -> ClinicResult<Roster> {
        Roster::load(&self.roster_path())
    }
}
