//! Interactive calendar: the login gate, then a menu loop over the view's
//! actions until the user quits or logs out.

use anyhow::Result;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use clinic_core::clinic::Clinic;
use clinic_core::filter::Filter;
use clinic_core::kv::FileStore;
use clinic_core::roster::Roster;
use clinic_core::session::Session;
use clinic_core::view::{CalendarView, ViewAction};
use dialoguer::{Confirm, Select};
use owo_colors::OwoColorize;

use super::{mount_view, terminal_width};
use crate::input::{FormInput, fill_form, now, prompt_choice, prompt_date};
use crate::render::{Palette, Render, render_calendar};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum MenuItem {
    New,
    Open,
    Previous,
    Next,
    Today,
    PickDate,
    FilterPatient,
    FilterDoctor,
    ToggleTheme,
    Logout,
    Quit,
}

const MENU: [MenuItem; 11] = [
    MenuItem::New,
    MenuItem::Open,
    MenuItem::Previous,
    MenuItem::Next,
    MenuItem::Today,
    MenuItem::PickDate,
    MenuItem::FilterPatient,
    MenuItem::FilterDoctor,
    MenuItem::ToggleTheme,
    MenuItem::Logout,
    MenuItem::Quit,
];

impl MenuItem {
    fn label(self, narrow: bool, dark: bool) -> &'static str {
        match self {
            MenuItem::New => "+ New appointment",
            MenuItem::Open => "Open appointment",
            MenuItem::Previous if narrow => "Previous day",
            MenuItem::Previous => "Previous week",
            MenuItem::Next if narrow => "Next day",
            MenuItem::Next => "Next week",
            MenuItem::Today => "Today",
            MenuItem::PickDate => "Go to date",
            MenuItem::FilterPatient => "Filter by patient",
            MenuItem::FilterDoctor => "Filter by doctor",
            MenuItem::ToggleTheme if dark => "Light mode",
            MenuItem::ToggleTheme => "Dark mode",
            MenuItem::Logout => "Log out",
            MenuItem::Quit => "Quit",
        }
    }
}

pub fn run(clinic: &Clinic) -> Result<()> {
    let mut session = Session::load(clinic.storage());

    if !session.is_logged_in() {
        println!("{}", "Clinic Calendar".bold());
        let confirmed = Confirm::new()
            .with_prompt("Log in?")
            .default(true)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
        session.login()?;
    }

    let roster = clinic.roster()?;
    let mut view = mount_view(clinic);

    loop {
        let now = now();
        let width = terminal_width();
        view.dispatch(
            ViewAction::SetNarrow(width < clinic.config().narrow_width),
            now,
        )?;

        println!();
        println!("{}", render_calendar(&view, clinic.config(), width));
        println!();

        let labels: Vec<&str> = MENU
            .iter()
            .map(|item| item.label(view.is_narrow(), view.is_dark_mode()))
            .collect();
        let choice = Select::new().items(&labels).default(0).interact()?;

        match MENU[choice] {
            MenuItem::New => {
                if view.is_narrow() {
                    view.dispatch(ViewAction::AddAppointment, now)?;
                } else {
                    let date = prompt_date("  Date", now.date())?;
                    view.dispatch(ViewAction::SelectSlot(date.and_time(NaiveTime::MIN)), now)?;
                }
                if !view.form().is_open() {
                    eprintln!("  {}", "Appointments cannot be booked in the past".red());
                    continue;
                }
                run_form(&mut view, &roster)?;
            }
            MenuItem::Open => {
                let visible = if view.is_narrow() {
                    view.visible_on(view.selected_date())
                } else {
                    view.visible_week()
                };
                if visible.is_empty() {
                    println!("  {}", "Nothing to open".dimmed());
                    continue;
                }
                let palette = Palette::new(view.is_dark_mode());
                let items: Vec<String> = visible
                    .iter()
                    .map(|a| format!("{} {}", a.start().format("%a %-d"), a.render(&palette)))
                    .collect();
                let ids: Vec<_> = visible.iter().map(|a| a.id()).collect();
                let picked = Select::new()
                    .with_prompt("  Appointment")
                    .items(&items)
                    .default(0)
                    .interact()?;

                view.dispatch(ViewAction::SelectEvent(ids[picked]), now)?;
                run_form(&mut view, &roster)?;
            }
            MenuItem::Previous => step(&mut view, -1, now)?,
            MenuItem::Next => step(&mut view, 1, now)?,
            MenuItem::Today => view.dispatch(ViewAction::PickDate(now.date()), now)?,
            MenuItem::PickDate => {
                let date = prompt_date("  Date", now.date())?;
                view.dispatch(ViewAction::PickDate(date), now)?;
            }
            MenuItem::FilterPatient => {
                let patient = prompt_filter(
                    "  Patient",
                    "All patients",
                    &roster.patient_names(),
                    view.filter().patient.as_deref(),
                )?;
                let filter = Filter::new(patient.as_deref(), view.filter().doctor.as_deref());
                view.dispatch(ViewAction::FilterChange(filter), now)?;
            }
            MenuItem::FilterDoctor => {
                let doctor = prompt_filter(
                    "  Doctor",
                    "All doctors",
                    &roster.doctor_names(),
                    view.filter().doctor.as_deref(),
                )?;
                let filter = Filter::new(view.filter().patient.as_deref(), doctor.as_deref());
                view.dispatch(ViewAction::FilterChange(filter), now)?;
            }
            MenuItem::ToggleTheme => view.dispatch(ViewAction::ToggleTheme, now)?,
            MenuItem::Logout => {
                session.logout()?;
                println!("{}", "Logged out".green());
                return Ok(());
            }
            MenuItem::Quit => return Ok(()),
        }
    }
}

/// Move by one day in the list, one week in the grid. Stays put at the
/// ends of the calendar.
fn step(view: &mut CalendarView<FileStore>, direction: i64, now: NaiveDateTime) -> Result<()> {
    let action = if view.is_narrow() {
        view.selected_date()
            .checked_add_signed(Duration::days(direction))
            .map(ViewAction::PickDate)
    } else {
        view.navigated_date()
            .checked_add_signed(Duration::weeks(direction))
            .map(ViewAction::Navigate)
    };

    if let Some(action) = action {
        view.dispatch(action, now)?;
    }
    Ok(())
}

/// Fill in the open form, then save, delete or cancel.
fn run_form(view: &mut CalendarView<FileStore>, roster: &Roster) -> Result<()> {
    let palette = Palette::new(view.is_dark_mode());
    println!();
    println!("{}", view.form().render(&palette));

    fill_form(view.form_mut(), roster, FormInput::default(), true)?;

    let mut actions = vec!["Save"];
    if view.form().can_delete() {
        actions.push("Delete");
    }
    actions.push("Cancel");

    let choice = Select::new().items(&actions).default(0).interact()?;

    match actions[choice] {
        "Save" => match view.submit(roster) {
            Ok(id) => println!("{}", format!("  Saved #{id}").green()),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
                view.dispatch(ViewAction::CloseForm, now())?;
            }
        },
        "Delete" => {
            view.delete_selected()?;
            println!("{}", "  Deleted".red());
        }
        _ => view.dispatch(ViewAction::CloseForm, now())?,
    }

    Ok(())
}

/// Choose a name or "all". `None` means no filter.
fn prompt_filter(
    prompt: &str,
    all_label: &str,
    names: &[&str],
    current: Option<&str>,
) -> Result<Option<String>> {
    let mut items = vec![all_label];
    items.extend_from_slice(names);

    let picked = prompt_choice(prompt, &items, current)?;
    Ok(Some(picked).filter(|p| p != all_label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_labels_follow_layout_and_theme() {
        assert_eq!(MenuItem::Next.label(true, false), "Next day");
        assert_eq!(MenuItem::Next.label(false, false), "Next week");
        assert_eq!(MenuItem::ToggleTheme.label(false, true), "Light mode");
    }

    #[test]
    fn menu_has_every_item_once() {
        for (i, item) in MENU.iter().enumerate() {
            assert_eq!(MENU.iter().position(|m| m == item), Some(i));
        }
    }
}
