use anyhow::Result;
use clinic_core::clinic::Clinic;
use clinic_core::filter::Filter;
use clinic_core::view::ViewAction;

use super::{check_filter_names, mount_view, require_session, terminal_width};
use crate::input::{now, parse_date};
use crate::render::render_calendar;

pub struct CalendarArgs {
    pub date: Option<String>,
    pub patient: Option<String>,
    pub doctor: Option<String>,
    pub list: bool,
    pub grid: bool,
    pub json: bool,
}

pub fn run(clinic: &Clinic, args: CalendarArgs) -> Result<()> {
    require_session(clinic)?;

    let roster = clinic.roster()?;
    check_filter_names(&roster, args.patient.as_deref(), args.doctor.as_deref())?;

    let now = now();
    let mut view = mount_view(clinic);

    if let Some(text) = &args.date {
        let date = parse_date(text, now.date())?;
        view.dispatch(ViewAction::PickDate(date), now)?;
    }

    let filter = Filter::new(args.patient.as_deref(), args.doctor.as_deref());
    view.dispatch(ViewAction::FilterChange(filter), now)?;

    if args.list {
        view.dispatch(ViewAction::SetNarrow(true), now)?;
    } else if args.grid {
        view.dispatch(ViewAction::SetNarrow(false), now)?;
    }

    if args.json {
        let visible = if view.is_narrow() {
            view.visible_on(view.selected_date())
        } else {
            view.visible_week()
        };
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    println!("{}", render_calendar(&view, clinic.config(), terminal_width()));
    Ok(())
}
