pub mod add;
pub mod calendar;
pub mod delete;
pub mod edit;
pub mod open;
pub mod roster;
pub mod session;

use anyhow::{Context, Result};
use chrono::Local;
use clinic_core::clinic::Clinic;
use clinic_core::kv::FileStore;
use clinic_core::roster::Roster;
use clinic_core::session::Session;
use clinic_core::view::CalendarView;

/// Width assumed when the terminal size cannot be read (e.g. piped output).
const FALLBACK_WIDTH: u16 = 120;

/// Gate for every command that reads or changes appointments.
fn require_session(clinic: &Clinic) -> Result<()> {
    Session::load(clinic.storage())
        .require()
        .context("Log in with `clinic login` first")
}

/// Load the calendar view from the clinic's storage, starting on today.
fn mount_view(clinic: &Clinic) -> CalendarView<FileStore> {
    let today = Local::now().date_naive();

    CalendarView::mount(clinic.storage(), today)
        .with_dark_mode(clinic.config().dark_mode)
        .with_narrow(terminal_width() < clinic.config().narrow_width)
}

fn terminal_width() -> u16 {
    crossterm::terminal::size()
        .map(|(cols, _)| cols)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Reject filter names the roster doesn't know, listing what it does.
fn check_filter_names(roster: &Roster, patient: Option<&str>, doctor: Option<&str>) -> Result<()> {
    if let Some(name) = patient.filter(|n| !n.is_empty()) {
        if !roster.contains_patient(name) {
            anyhow::bail!(
                "Patient '{}' not found. Available: {}",
                name,
                roster.patient_names().join(", ")
            );
        }
    }
    if let Some(name) = doctor.filter(|n| !n.is_empty()) {
        if !roster.contains_doctor(name) {
            anyhow::bail!(
                "Doctor '{}' not found. Available: {}",
                name,
                roster.doctor_names().join(", ")
            );
        }
    }
    Ok(())
}
