//! The appointment record.
//!
//! An appointment always lasts exactly one hour: `end` is derived from
//! `start` and cannot be set on its own. Times are local wall-clock values
//! with minute precision.

use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{ClinicError, ClinicResult};

/// Length of every appointment, in minutes.
pub const APPOINTMENT_MINUTES: i64 = 60;

/// Format used when writing date-times to storage.
const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Formats accepted when reading naive date-times back.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn appointment_length() -> Duration {
    Duration::minutes(APPOINTMENT_MINUTES)
}

/// The end of an appointment starting at `start`. Fails when the hour would
/// run past the last representable date-time.
fn end_of(start: NaiveDateTime) -> ClinicResult<NaiveDateTime> {
    start
        .checked_add_signed(appointment_length())
        .ok_or_else(|| ClinicError::OutOfRange(start.to_string()))
}

/// Unique appointment identifier.
///
/// Stored as a JSON number. Numeric strings are accepted on read so that
/// collections written by other tools still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl<'de> Deserialize<'de> for AppointmentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(AppointmentId(n)),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map(AppointmentId)
                .map_err(|_| de::Error::custom(format!("invalid appointment id '{s}'"))),
        }
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AppointmentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(AppointmentId)
    }
}

/// The user-editable part of an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentFields {
    pub patient: String,
    pub doctor: String,
    pub start: NaiveDateTime,
}

impl AppointmentFields {
    pub fn new(
        patient: impl Into<String>,
        doctor: impl Into<String>,
        start: NaiveDateTime,
    ) -> Self {
        AppointmentFields {
            patient: patient.into(),
            doctor: doctor.into(),
            start: truncate_to_minute(start),
        }
    }

    /// Build fields from a fixed date and an hour:minute time.
    pub fn on(
        date: NaiveDate,
        time: NaiveTime,
        patient: impl Into<String>,
        doctor: impl Into<String>,
    ) -> Self {
        Self::new(patient, doctor, date.and_time(time))
    }

    pub fn end(&self) -> ClinicResult<NaiveDateTime> {
        end_of(self.start)
    }
}

/// A scheduled patient-doctor meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredAppointment")]
pub struct Appointment {
    id: AppointmentId,
    patient: String,
    doctor: String,
    #[serde(serialize_with = "serialize_wall_clock")]
    start: NaiveDateTime,
    #[serde(serialize_with = "serialize_wall_clock")]
    end: NaiveDateTime,
}

impl Appointment {
    pub fn new(id: AppointmentId, fields: AppointmentFields) -> ClinicResult<Self> {
        let start = truncate_to_minute(fields.start);
        Ok(Appointment {
            id,
            patient: fields.patient,
            doctor: fields.doctor,
            start,
            end: end_of(start)?,
        })
    }

    pub fn id(&self) -> AppointmentId {
        self.id
    }

    pub fn patient(&self) -> &str {
        &self.patient
    }

    pub fn doctor(&self) -> &str {
        &self.doctor
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn fields(&self) -> AppointmentFields {
        AppointmentFields {
            patient: self.patient.clone(),
            doctor: self.doctor.clone(),
            start: self.start,
        }
    }

    /// Overwrite everything except the id. `end` follows `start`.
    pub(crate) fn set_fields(&mut self, fields: AppointmentFields) -> ClinicResult<()> {
        let start = truncate_to_minute(fields.start);
        self.end = end_of(start)?;
        self.patient = fields.patient;
        self.doctor = fields.doctor;
        self.start = start;
        Ok(())
    }

    pub(crate) fn reassign_id(&mut self, id: AppointmentId) {
        self.id = id;
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.patient, self.doctor)
    }
}

/// Shape of an appointment as read from storage. A stored `end` is ignored:
/// the loaded record always ends one hour after it starts.
#[derive(Deserialize)]
struct StoredAppointment {
    id: AppointmentId,
    patient: String,
    doctor: String,
    #[serde(deserialize_with = "deserialize_wall_clock")]
    start: NaiveDateTime,
}

impl TryFrom<StoredAppointment> for Appointment {
    type Error = ClinicError;

    fn try_from(stored: StoredAppointment) -> ClinicResult<Self> {
        Appointment::new(
            stored.id,
            AppointmentFields::new(stored.patient, stored.doctor, stored.start),
        )
    }
}

fn serialize_wall_clock<S: Serializer>(
    dt: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.format(STORAGE_FORMAT).to_string())
}

fn deserialize_wall_clock<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_wall_clock(&text)
        .ok_or_else(|| de::Error::custom(format!("invalid date-time '{text}'")))
}

/// Parse date-time text into local wall-clock time.
///
/// Text carrying an offset (RFC 3339, e.g. `2024-01-10T09:00:00.000Z`) is
/// converted to the local time zone; naive text is taken as-is.
pub fn parse_wall_clock(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}
