use anyhow::Result;
use clinic_core::clinic::Clinic;
use clinic_core::view::ViewAction;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::{mount_view, require_session};
use crate::input::{now, parse_id};

pub fn run(clinic: &Clinic, id: &str, force: bool) -> Result<()> {
    require_session(clinic)?;

    let id = parse_id(id)?;
    let mut view = mount_view(clinic);

    view.dispatch(ViewAction::SelectEvent(id), now())?;
    let Some(appointment) = view.selected().cloned() else {
        anyhow::bail!("No appointment with id {id}");
    };

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} on {}?",
                appointment,
                appointment.start().format("%a %b %-d at %H:%M")
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    view.delete_selected()?;
    println!("{}", format!("  Deleted: {appointment}").red());

    Ok(())
}
