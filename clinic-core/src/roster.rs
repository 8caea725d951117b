//! Patient and doctor rosters.
//!
//! Rosters are read-only: the calendar only offers their names as choices
//! and checks saved appointments against them.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ClinicError, ClinicResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Person {
    pub id: u32,
    pub name: String,
}

impl Person {
    fn new(id: u32, name: &str) -> Self {
        Person {
            id,
            name: name.to_string(),
        }
    }
}

/// `roster.toml` in the data directory:
///
/// ```toml
/// [[patients]]
/// id = 1
/// name = "Alice"
///
/// [[doctors]]
/// id = 1
/// name = "Dr. Smith"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub patients: Vec<Person>,
    #[serde(default)]
    pub doctors: Vec<Person>,
}

impl Default for Roster {
    fn default() -> Self {
        Roster {
            patients: vec![
                Person::new(1, "Alice"),
                Person::new(2, "Bob"),
                Person::new(3, "Charlie"),
                Person::new(4, "Diana"),
            ],
            doctors: vec![
                Person::new(1, "Dr. Smith"),
                Person::new(2, "Dr. Jones"),
                Person::new(3, "Dr. Patel"),
            ],
        }
    }
}

impl Roster {
    /// Load from `path`, falling back to the built-in roster when the file
    /// does not exist.
    pub fn load(path: &Path) -> ClinicResult<Self> {
        if !path.exists() {
            return Ok(Roster::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| ClinicError::Roster(format!("{}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn contains_patient(&self, name: &str) -> bool {
        self.patients.iter().any(|p| p.name == name)
    }

    pub fn contains_doctor(&self, name: &str) -> bool {
        self.doctors.iter().any(|d| d.name == name)
    }

    pub fn patient_names(&self) -> Vec<&str> {
        self.patients.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn doctor_names(&self) -> Vec<&str> {
        self.doctors.iter().map(|d| d.name.as_str()).collect()
    }
}
