//! The appointment form.
//!
//! A small state machine: `Closed`, `Create` (a new appointment on a fixed
//! date) and `Edit` (an existing appointment). The form never touches the
//! store. A successful submit or delete yields a [`FormMessage`] for the
//! calendar view to apply.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::roster::Roster;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Closed,
    Create {
        date: NaiveDate,
    },
    Edit {
        appointment: Appointment,
    },
}

/// What the form asks the calendar view to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Save {
        id: Option<AppointmentId>,
        fields: AppointmentFields,
    },
    Delete {
        id: AppointmentId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Patient,
    Doctor,
    Time,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Field::Patient => "patient",
            Field::Doctor => "doctor",
            Field::Time => "time",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(Field),

    #[error("Invalid time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Unknown patient '{0}'")]
    UnknownPatient(String),

    #[error("Unknown doctor '{0}'")]
    UnknownDoctor(String),

    #[error("The appointment form is not open")]
    NotOpen,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentForm {
    mode: FormMode,
    patient: Option<String>,
    doctor: Option<String>,
    time: Option<NaiveTime>,
}

impl AppointmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Edit { .. } => "Edit Appointment",
            _ => "Add Appointment",
        }
    }

    pub fn patient(&self) -> Option<&str> {
        self.patient.as_deref()
    }

    pub fn doctor(&self) -> Option<&str> {
        self.doctor.as_deref()
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// The date the appointment will be saved on.
    pub fn date(&self) -> Option<NaiveDate> {
        match &self.mode {
            FormMode::Closed => None,
            FormMode::Create { date } => Some(*date),
            FormMode::Edit { appointment } => Some(appointment.date()),
        }
    }

    /// Delete is only offered for an existing appointment.
    pub fn can_delete(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn open_create(&mut self, date: NaiveDate) {
        self.mode = FormMode::Create { date };
        self.patient = None;
        self.doctor = None;
        self.time = None;
    }

    pub fn open_edit(&mut self, appointment: &Appointment) {
        self.patient = Some(appointment.patient().to_string());
        self.doctor = Some(appointment.doctor().to_string());
        self.time = Some(appointment.start().time());
        self.mode = FormMode::Edit {
            appointment: appointment.clone(),
        };
    }

    /// Discard any edits and close.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn set_patient(&mut self, name: &str) {
        self.patient = Some(name.to_string()).filter(|n| !n.is_empty());
    }

    pub fn set_doctor(&mut self, name: &str) {
        self.doctor = Some(name.to_string()).filter(|n| !n.is_empty());
    }

    /// Set the time from `HH:MM` text. Empty text clears it.
    pub fn set_time(&mut self, text: &str) -> Result<(), FormError> {
        let text = text.trim();
        if text.is_empty() {
            self.time = None;
            return Ok(());
        }
        let time = parse_time(text).ok_or_else(|| FormError::InvalidTime(text.to_string()))?;
        self.time = Some(time);
        Ok(())
    }

    /// Validate and close. The form stays open (with its fields) on error.
    pub fn submit(&mut self, roster: &Roster) -> Result<FormMessage, FormError> {
        let (id, date) = match &self.mode {
            FormMode::Closed => return Err(FormError::NotOpen),
            FormMode::Create { date } => (None, *date),
            FormMode::Edit { appointment } => (Some(appointment.id()), appointment.date()),
        };

        let patient = self
            .patient
            .clone()
            .ok_or(FormError::MissingField(Field::Patient))?;
        let doctor = self
            .doctor
            .clone()
            .ok_or(FormError::MissingField(Field::Doctor))?;
        let time = self.time.ok_or(FormError::MissingField(Field::Time))?;

        if !roster.contains_patient(&patient) {
            return Err(FormError::UnknownPatient(patient));
        }
        if !roster.contains_doctor(&doctor) {
            return Err(FormError::UnknownDoctor(doctor));
        }

        let fields = AppointmentFields::on(date, time, patient, doctor);
        self.cancel();
        Ok(FormMessage::Save { id, fields })
    }

    /// Close with a delete request. `None` (and no state change) unless an
    /// existing appointment is being edited.
    pub fn delete(&mut self) -> Option<FormMessage> {
        let id = match &self.mode {
            FormMode::Edit { appointment } => appointment.id(),
            _ => return None,
        };
        self.cancel();
        Some(FormMessage::Delete { id })
    }
}

/// Parse an `HH:MM` time; seconds are not accepted.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}
