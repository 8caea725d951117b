use anyhow::Result;
use clinic_core::clinic::Clinic;
use clinic_core::view::ViewAction;
use owo_colors::OwoColorize;

use super::{mount_view, require_session};
use crate::input::{FormInput, fill_form, now, parse_id};

pub fn run(
    clinic: &Clinic,
    id: &str,
    patient: Option<String>,
    doctor: Option<String>,
    time: Option<String>,
) -> Result<()> {
    require_session(clinic)?;

    let id = parse_id(id)?;
    let roster = clinic.roster()?;
    let mut view = mount_view(clinic);

    view.dispatch(ViewAction::SelectEvent(id), now())?;
    if !view.form().is_open() {
        anyhow::bail!("No appointment with id {id}");
    }

    // Nothing given on the command line: walk through every field
    let prompt = patient.is_none() && doctor.is_none() && time.is_none();
    fill_form(
        view.form_mut(),
        &roster,
        FormInput {
            patient,
            doctor,
            time,
        },
        prompt,
    )?;

    view.submit(&roster)?;

    if let Some(appointment) = view.store().get(id) {
        println!(
            "{}",
            format!(
                "  Updated: {} on {} at {}",
                appointment,
                appointment.start().format("%a %b %-d"),
                appointment.start().format("%H:%M")
            )
            .yellow()
        );
    }

    Ok(())
}
