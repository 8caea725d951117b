use anyhow::Result;
use chrono::NaiveTime;
use clinic_core::clinic::Clinic;
use clinic_core::view::ViewAction;
use owo_colors::OwoColorize;

use super::{mount_view, require_session};
use crate::input::{FormInput, fill_form, now, parse_date, prompt_date};

pub fn run(
    clinic: &Clinic,
    patient: Option<String>,
    doctor: Option<String>,
    date: Option<String>,
    time: Option<String>,
) -> Result<()> {
    require_session(clinic)?;

    let roster = clinic.roster()?;
    let now = now();
    let mut view = mount_view(clinic);

    let interactive = patient.is_none() || doctor.is_none() || date.is_none() || time.is_none();

    let date = match date {
        Some(text) => parse_date(&text, now.date())?,
        None => prompt_date("  Date", now.date())?,
    };

    view.dispatch(ViewAction::SelectSlot(date.and_time(NaiveTime::MIN)), now)?;
    if !view.form().is_open() {
        anyhow::bail!("Cannot book an appointment in the past ({date})");
    }

    fill_form(
        view.form_mut(),
        &roster,
        FormInput {
            patient,
            doctor,
            time,
        },
        true,
    )?;

    let id = view.submit(&roster)?;

    if interactive {
        println!();
    }
    if let Some(appointment) = view.store().get(id) {
        println!(
            "{}",
            format!(
                "  Created: {} on {} at {} (#{})",
                appointment,
                appointment.start().format("%a %b %-d"),
                appointment.start().format("%H:%M"),
                appointment.id()
            )
            .green()
        );
    }

    Ok(())
}
