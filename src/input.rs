//! Parsing and prompting for user input.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use clinic_core::form::AppointmentForm;
use clinic_core::roster::Roster;
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;

/// Years a typed date may fall in.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// Local wall-clock time, the clock every view action is judged against.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Values given on the command line; `None` means "ask" or "keep".
#[derive(Default)]
pub struct FormInput {
    pub patient: Option<String>,
    pub doctor: Option<String>,
    pub time: Option<String>,
}

/// Apply `input` to the form, prompting for fields it leaves out when
/// `prompt_missing` is set. Prompts default to the form's current values.
pub fn fill_form(
    form: &mut AppointmentForm,
    roster: &Roster,
    input: FormInput,
    prompt_missing: bool,
) -> Result<()> {
    match input.patient {
        Some(name) => form.set_patient(&name),
        None if prompt_missing => {
            let name = prompt_choice("  Patient", &roster.patient_names(), form.patient())?;
            form.set_patient(&name);
        }
        None => {}
    }

    match input.doctor {
        Some(name) => form.set_doctor(&name),
        None if prompt_missing => {
            let name = prompt_choice("  Doctor", &roster.doctor_names(), form.doctor())?;
            form.set_doctor(&name);
        }
        None => {}
    }

    match input.time {
        Some(text) => form.set_time(&text)?,
        None if prompt_missing => prompt_time(form)?,
        None => {}
    }

    Ok(())
}

/// Pick one of `items`, starting on `current` when it is listed.
pub fn prompt_choice(prompt: &str, items: &[&str], current: Option<&str>) -> Result<String> {
    if items.is_empty() {
        anyhow::bail!("Nothing to choose for {}", prompt.trim());
    }

    let default = current
        .and_then(|c| items.iter().position(|item| *item == c))
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()?;

    Ok(items[selection].to_string())
}

/// Ask for an HH:MM time until the form accepts it.
fn prompt_time(form: &mut AppointmentForm) -> Result<()> {
    let current = form.time().map(|t| t.format("%H:%M").to_string());

    loop {
        let mut prompt = Input::<String>::new().with_prompt("  Time (HH:MM)");
        if let Some(current) = &current {
            prompt = prompt.default(current.clone());
        }
        let text = prompt.interact_text()?;

        match form.set_time(&text) {
            Ok(()) if form.time().is_some() => return Ok(()),
            Ok(()) => eprintln!("  {}", "A time is required".red()),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

/// Ask for a day until one parses.
pub fn prompt_date(prompt: &str, today: NaiveDate) -> Result<NaiveDate> {
    loop {
        let text: String = Input::new()
            .with_prompt(prompt)
            .default("today".to_string())
            .interact_text()?;
        match parse_date(&text, today) {
            Ok(date) => return Ok(date),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    let abbrevs = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    lower_words(input)
        .map(|word| {
            abbrevs
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| (*full).to_string())
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn lower_words(input: &str) -> impl Iterator<Item = String> + '_ {
    input.split_whitespace().map(str::to_lowercase)
}

/// Parse a day: `YYYY-MM-DD`, `today`, or natural language via fuzzydate.
/// Years outside `MIN_YEAR..=MAX_YEAR` are rejected.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = input.trim();

    let date = if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        date
    } else if trimmed.eq_ignore_ascii_case("today") {
        today
    } else {
        let expanded = expand_abbreviations(trimmed);
        fuzzydate::parse(&expanded)
            .map(|dt| dt.date())
            .map_err(|_| anyhow::anyhow!("Could not parse date: \"{}\"", input))?
    };

    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        anyhow::bail!(
            "Date out of range: \"{}\" (years {} to {})",
            input,
            MIN_YEAR,
            MAX_YEAR
        );
    }

    Ok(date)
}

/// Parse an appointment id as printed by the calendar (`#123` or `123`).
pub fn parse_id(input: &str) -> Result<clinic_core::AppointmentId> {
    input
        .parse()
        .with_context(|| format!("Invalid appointment id '{input}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use clinic_core::form::FormMode;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn expand_day_abbreviations() {
        assert_eq!(expand_abbreviations("sat"), "saturday");
        assert_eq!(expand_abbreviations("next Fri"), "next friday");
        assert_eq!(expand_abbreviations("tues"), "tuesday");
    }

    #[test]
    fn expand_month_abbreviations() {
        assert_eq!(expand_abbreviations("jan 20"), "january 20");
        assert_eq!(expand_abbreviations("sept 5"), "september 5");
    }

    #[test]
    fn expand_preserves_non_abbreviations() {
        assert_eq!(expand_abbreviations("tomorrow"), "tomorrow");
        assert_eq!(expand_abbreviations("  next   week "), "next week");
    }

    #[test]
    fn parse_iso_date() {
        assert_eq!(
            parse_date("2024-03-05", today()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn parse_today_uses_given_day() {
        assert_eq!(parse_date("Today", today()).unwrap(), today());
    }

    #[test]
    fn parse_natural_language_date() {
        let date = parse_date("tomorrow", today()).unwrap();
        assert_eq!(date, Local::now().date_naive() + chrono::Duration::days(1));
    }

    #[test]
    fn parse_rejects_far_off_years() {
        let err = parse_date("+262142-12-31", today()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_date("0005-06-01", today()).is_err());
        assert!(parse_date("9999-12-31", today()).is_ok());
    }

    #[test]
    fn parse_invalid_date() {
        assert!(parse_date("not a date at all xyz", today()).is_err());
    }

    #[test]
    fn parse_id_accepts_hash() {
        assert_eq!(parse_id("#42").unwrap(), clinic_core::AppointmentId(42));
        assert!(parse_id("forty-two").is_err());
    }

    #[test]
    fn fill_form_without_prompts_applies_given_values() {
        let mut form = AppointmentForm::new();
        form.open_create(today());

        let input = FormInput {
            patient: Some("Alice".into()),
            doctor: None,
            time: Some("09:30".into()),
        };
        fill_form(&mut form, &Roster::default(), input, false).unwrap();

        assert_eq!(form.patient(), Some("Alice"));
        assert_eq!(form.doctor(), None);
        assert_eq!(form.time(), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(form.mode(), &FormMode::Create { date: today() });
    }

    #[test]
    fn fill_form_rejects_bad_time() {
        let mut form = AppointmentForm::new();
        form.open_create(today());

        let input = FormInput {
            time: Some("half past nine".into()),
            ..FormInput::default()
        };
        assert!(fill_form(&mut form, &Roster::default(), input, false).is_err());
    }
}
