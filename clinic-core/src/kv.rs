//! Key-value slots for persisted state.
//!
//! Each slot holds one serialized value and is always overwritten whole.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ClinicError, ClinicResult};

/// A store of string values by key.
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` when the slot was never written.
    fn get(&self, key: &str) -> ClinicResult<Option<String>>;

    /// Overwrite a slot.
    fn set(&mut self, key: &str, value: &str) -> ClinicResult<()>;

    /// Clear a slot. Clearing an empty slot is not an error.
    fn remove(&mut self, key: &str) -> ClinicResult<()>;
}

/// Slots kept as `<dir>/<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ClinicResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ClinicError::Storage(format!("Invalid slot name '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ClinicResult<Option<String>> {
        let path = self.path_for(key)?;

        if !path.exists() {
            return Ok(None);
        }

        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> ClinicResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a reader never sees a partial slot
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;

        debug!(slot = key, bytes = value.len(), "wrote slot");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ClinicResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Slots held in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ClinicResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> ClinicResult<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ClinicResult<()> {
        self.slots.remove(key);
        Ok(())
    }
}
