//! Deriving the visible appointments.

use chrono::{NaiveDate, NaiveDateTime};

use crate::appointment::Appointment;

/// Patient and/or doctor predicate. `None` (or an empty name) matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub patient: Option<String>,
    pub doctor: Option<String>,
}

impl Filter {
    pub fn new(patient: Option<&str>, doctor: Option<&str>) -> Self {
        Filter {
            patient: non_empty(patient),
            doctor: non_empty(doctor),
        }
    }

    pub fn is_empty(&self) -> bool {
        non_empty(self.patient.as_deref()).is_none() && non_empty(self.doctor.as_deref()).is_none()
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        matches_name(self.patient.as_deref(), appointment.patient())
            && matches_name(self.doctor.as_deref(), appointment.doctor())
    }
}

fn non_empty(name: Option<&str>) -> Option<String> {
    name.filter(|n| !n.is_empty()).map(String::from)
}

fn matches_name(wanted: Option<&str>, actual: &str) -> bool {
    match wanted {
        Some(name) if !name.is_empty() => name == actual,
        _ => true,
    }
}

/// The appointments matching `filter`, in collection order.
pub fn project<'a>(appointments: &'a [Appointment], filter: &Filter) -> Vec<&'a Appointment> {
    appointments.iter().filter(|a| filter.matches(a)).collect()
}

/// The appointments starting on `date`, in input order.
pub fn on_day<'a, I>(appointments: I, date: NaiveDate) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    appointments.into_iter().filter(|a| a.date() == date).collect()
}

/// The appointments starting in `[from, to)`, in input order.
pub fn in_range<'a, I>(
    appointments: I,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    appointments
        .into_iter()
        .filter(|a| a.start() >= from && a.start() < to)
        .collect()
}
