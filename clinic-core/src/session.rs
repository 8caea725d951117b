//! The login gate.
//!
//! There are no credentials: logging in flips a flag. The flag lives in its
//! own slot so every invocation of the calendar sees the same session.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClinicError, ClinicResult};
use crate::kv::KeyValueStore;

pub const SESSION_KEY: &str = "session";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionData {
    logged_in: bool,
}

pub struct Session<S> {
    backend: S,
    logged_in: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Read the session slot. Anything unreadable counts as logged out.
    pub fn load(backend: S) -> Self {
        let data = match backend.get(SESSION_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding malformed session data");
                SessionData::default()
            }),
            Ok(None) => SessionData::default(),
            Err(e) => {
                warn!(error = %e, "could not read session");
                SessionData::default()
            }
        };

        Session {
            backend,
            logged_in: data.logged_in,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// `Err(NotLoggedIn)` unless logged in.
    pub fn require(&self) -> ClinicResult<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(ClinicError::NotLoggedIn)
        }
    }

    pub fn login(&mut self) -> ClinicResult<()> {
        self.set(true)
    }

    pub fn logout(&mut self) -> ClinicResult<()> {
        self.set(false)
    }

    fn set(&mut self, logged_in: bool) -> ClinicResult<()> {
        let json = serde_json::to_string(&SessionData { logged_in })
            .map_err(|e| ClinicError::Serialization(e.to_string()))?;
        self.backend.set(SESSION_KEY, &json)?;
        self.logged_in = logged_in;
        debug!(logged_in, "session updated");
        Ok(())
    }
}
