//! Terminal rendering for the calendar.
//!
//! Wide terminals get a week grid, narrow ones a single-day list. Both draw
//! from the view's filtered appointments, never the raw store.

use std::ops::Range;

use chrono::{Days, Local, NaiveDate, Timelike};
use clinic_core::config::ClinicConfig;
use clinic_core::filter::Filter;
use clinic_core::form::AppointmentForm;
use clinic_core::kv::KeyValueStore;
use clinic_core::view::{CalendarView, week_start};
use clinic_core::Appointment;
use owo_colors::OwoColorize;

/// Width of the hour column in the week grid, separator included.
const TIME_COLUMN: usize = 6;
const MIN_CELL: usize = 8;
const MAX_CELL: usize = 24;

/// Light or dark color scheme.
pub struct Palette {
    dark: bool,
}

impl Palette {
    pub fn new(dark: bool) -> Self {
        Palette { dark }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.dark {
            text.bright_white().bold().to_string()
        } else {
            text.blue().bold().to_string()
        }
    }

    pub fn time(&self, text: &str) -> String {
        if self.dark {
            text.bright_cyan().to_string()
        } else {
            text.cyan().to_string()
        }
    }

    pub fn accent(&self, text: &str) -> String {
        if self.dark {
            text.bright_yellow().to_string()
        } else {
            text.magenta().to_string()
        }
    }

    pub fn muted(&self, text: &str) -> String {
        text.dimmed().to_string()
    }
}

/// Extension trait for rendering with a palette.
pub trait Render {
    fn render(&self, palette: &Palette) -> String;
}

impl Render for Appointment {
    fn render(&self, palette: &Palette) -> String {
        let span = format!(
            "{} - {}",
            self.start().format("%H:%M"),
            self.end().format("%H:%M")
        );
        format!(
            "{}  {}  {}",
            palette.time(&span),
            self,
            palette.muted(&format!("#{}", self.id()))
        )
    }
}

impl Render for Filter {
    fn render(&self, palette: &Palette) -> String {
        let patient = self.patient.as_deref().unwrap_or("All patients");
        let doctor = self.doctor.as_deref().unwrap_or("All doctors");
        palette.muted(&format!("Showing: {patient} / {doctor}"))
    }
}

impl Render for AppointmentForm {
    fn render(&self, palette: &Palette) -> String {
        let mut lines = vec![palette.heading(self.title())];

        if let Some(date) = self.date() {
            lines.push(format!("  Date:    {}", date.format("%a %b %-d, %Y")));
        }
        lines.push(format!("  Patient: {}", self.patient().unwrap_or("-")));
        lines.push(format!("  Doctor:  {}", self.doctor().unwrap_or("-")));
        let time = self
            .time()
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!("  Time:    {time}"));

        lines.join("\n")
    }
}

/// Render whichever layout the view's viewport flag asks for.
pub fn render_calendar<S: KeyValueStore>(
    view: &CalendarView<S>,
    config: &ClinicConfig,
    width: u16,
) -> String {
    let palette = Palette::new(view.is_dark_mode());
    let body = if view.is_narrow() {
        render_day_list(view, &palette)
    } else {
        render_week_grid(view, &palette, config.day_start_hour..config.day_end_hour, width)
    };

    let mut lines = vec![palette.heading("Clinic Calendar")];
    if !view.filter().is_empty() {
        lines.push(view.filter().render(&palette));
    }
    lines.push(String::new());
    lines.push(body);
    lines.join("\n")
}

/// One day, one line per appointment.
pub fn render_day_list<S: KeyValueStore>(view: &CalendarView<S>, palette: &Palette) -> String {
    let date = view.selected_date();
    let mut lines = vec![palette.heading(&format_date_label(date))];

    let items = view.visible_on(date);
    if items.is_empty() {
        lines.push(format!("  {}", palette.muted("No appointments")));
    }
    for appointment in items {
        lines.push(format!("  {}", appointment.render(palette)));
    }

    lines.join("\n")
}

/// Seven day columns by `hours` rows for the navigated week.
pub fn render_week_grid<S: KeyValueStore>(
    view: &CalendarView<S>,
    palette: &Palette,
    hours: Range<u32>,
    width: u16,
) -> String {
    let first = week_start(view.navigated_date());
    let days: Vec<NaiveDate> = (0..7)
        .filter_map(|i| first.checked_add_days(Days::new(i)))
        .collect();
    let cell = cell_width(width);
    let today = Local::now().date_naive();
    let week = view.visible_week();

    let mut lines = Vec::new();

    let mut header = " ".repeat(TIME_COLUMN);
    for day in &days {
        let label = fit(&day.format("%a %-d").to_string(), cell);
        let label = if *day == today {
            palette.accent(&label)
        } else {
            palette.heading(&label)
        };
        header.push_str(&label);
        header.push(' ');
    }
    lines.push(header.trim_end().to_string());

    for hour in hours.clone() {
        let mut row = palette.time(&format!("{hour:02}:00 "));
        for day in &days {
            let slot: Vec<&Appointment> = week
                .iter()
                .filter(|a| a.date() == *day && a.start().hour() == hour)
                .copied()
                .collect();
            let text = match slot.as_slice() {
                [] => String::new(),
                [only] => only.to_string(),
                [first, rest @ ..] => format!("{} +{}", first, rest.len()),
            };
            let text = fit(&text, cell);
            if text.trim().is_empty() {
                row.push_str(&palette.muted(&fit("·", cell)));
            } else {
                row.push_str(&text);
            }
            row.push(' ');
        }
        lines.push(row.trim_end().to_string());
    }

    let outside = week
        .iter()
        .filter(|a| !hours.contains(&a.start().hour()))
        .count();
    if week.is_empty() {
        lines.push(format!("\n  {}", palette.muted("No appointments this week")));
    } else if outside > 0 {
        lines.push(format!(
            "\n  {}",
            palette.muted(&format!("{outside} outside the hours shown"))
        ));
    }

    lines.join("\n")
}

fn cell_width(width: u16) -> usize {
    (usize::from(width).saturating_sub(TIME_COLUMN) / 7)
        .saturating_sub(1)
        .clamp(MIN_CELL, MAX_CELL)
}

/// Truncate or pad `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        truncated.push('…');
        truncated
    } else {
        format!("{text:<width$}")
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Jan 10")
pub fn format_date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::kv::MemoryStore;
    use clinic_core::roster::Roster;
    use clinic_core::view::ViewAction;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, d).unwrap()
    }

    fn view_with(bookings: &[(u32, &str, &str, &str)]) -> CalendarView<MemoryStore> {
        let now = date(1).and_hms_opt(8, 0, 0).unwrap();
        let mut view = CalendarView::mount(MemoryStore::new(), date(1));
        for (day, patient, doctor, time) in bookings {
            view.dispatch(ViewAction::SelectSlot(date(*day).and_hms_opt(0, 0, 0).unwrap()), now)
                .unwrap();
            let form = view.form_mut();
            form.set_patient(patient);
            form.set_doctor(doctor);
            form.set_time(time).unwrap();
            view.submit(&Roster::default()).unwrap();
        }
        view
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefgh", 5), "abcd…");
        assert_eq!(fit("abcde", 5), "abcde");
    }

    #[test]
    fn cell_width_is_clamped() {
        assert_eq!(cell_width(40), MIN_CELL);
        assert_eq!(cell_width(500), MAX_CELL);
        assert_eq!(cell_width(120), 15);
    }

    #[test]
    fn day_list_shows_selected_day_in_order() {
        let mut view = view_with(&[
            (2, "Alice", "Dr. Smith", "15:00"),
            (2, "Bob", "Dr. Jones", "09:00"),
            (3, "Charlie", "Dr. Patel", "09:00"),
        ]);
        view.dispatch(ViewAction::PickDate(date(2)), date(1).and_hms_opt(8, 0, 0).unwrap())
            .unwrap();

        let out = render_day_list(&view, &Palette::new(false));

        let bob = out.find("Bob - Dr. Jones").unwrap();
        let alice = out.find("Alice - Dr. Smith").unwrap();
        assert!(bob < alice);
        assert!(!out.contains("Charlie"));
        assert!(out.contains("09:00 - 10:00"));
    }

    #[test]
    fn day_list_empty_message() {
        let view = view_with(&[]);
        let out = render_day_list(&view, &Palette::new(true));
        assert!(out.contains("No appointments"));
    }

    #[test]
    fn week_grid_places_appointments_in_hour_rows() {
        let view = view_with(&[
            (2, "Alice", "Dr. Smith", "09:00"),
            (2, "Bob", "Dr. Jones", "09:30"),
            (3, "Charlie", "Dr. Patel", "20:00"),
        ]);

        let out = render_week_grid(&view, &Palette::new(false), 8..18, 300);

        let nine = out.lines().find(|l| l.contains("09:00")).unwrap();
        assert!(nine.contains("Alice - Dr. Smith +1"));
        assert!(out.contains("1 outside the hours shown"));
    }

    #[test]
    fn week_grid_respects_filter() {
        let mut view = view_with(&[
            (2, "Alice", "Dr. Smith", "09:00"),
            (2, "Bob", "Dr. Jones", "10:00"),
        ]);
        view.dispatch(
            ViewAction::FilterChange(Filter::new(Some("Bob"), None)),
            date(1).and_hms_opt(8, 0, 0).unwrap(),
        )
        .unwrap();

        let out = render_week_grid(&view, &Palette::new(false), 8..18, 300);

        assert!(!out.contains("Alice"));
        assert!(out.contains("Bob - Dr. Jones"));
    }

    #[test]
    fn week_grid_at_the_last_date_shows_remaining_days() {
        let mut view = view_with(&[]);
        view.dispatch(ViewAction::Navigate(NaiveDate::MAX), date(1).and_hms_opt(8, 0, 0).unwrap())
            .unwrap();

        let out = render_week_grid(&view, &Palette::new(false), 8..10, 300);

        assert!(out.contains("No appointments this week"));
    }

    #[test]
    fn calendar_picks_layout_from_viewport() {
        let view = view_with(&[(2, "Alice", "Dr. Smith", "09:00")]).with_narrow(true);
        let out = render_calendar(&view, &ClinicConfig::default(), 60);
        assert!(!out.contains("08:00 "));
        assert!(out.contains("Clinic Calendar"));
    }

    #[test]
    fn form_render_shows_title_and_fields() {
        let mut form = AppointmentForm::new();
        form.open_create(date(2));
        form.set_patient("Alice");

        let out = form.render(&Palette::new(false));

        assert!(out.contains("Add Appointment"));
        assert!(out.contains("Patient: Alice"));
        assert!(out.contains("Time:    -"));
    }
}
