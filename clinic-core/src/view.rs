//! The calendar view: appointments, filter, form and UI state.
//!
//! Every user action is a [`ViewAction`] passed to [`CalendarView::dispatch`],
//! which is the only place the appointment store is mutated from.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::error::{ClinicError, ClinicResult};
use crate::filter::{self, Filter};
use crate::form::{AppointmentForm, FormMessage};
use crate::kv::KeyValueStore;
use crate::roster::Roster;
use crate::store::AppointmentStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// A grid slot was picked. Ignored when the slot is before today.
    SelectSlot(NaiveDateTime),
    /// The day list's add button: a slot on the selected date.
    AddAppointment,
    /// An existing appointment was picked.
    SelectEvent(AppointmentId),
    /// Save or delete coming back from the form.
    Form(FormMessage),
    CloseForm,
    FilterChange(Filter),
    ToggleTheme,
    SetNarrow(bool),
    /// Move the visible week or day without changing the selected date.
    Navigate(NaiveDate),
    /// The day list's date picker.
    PickDate(NaiveDate),
}

pub struct CalendarView<S> {
    store: AppointmentStore<S>,
    form: AppointmentForm,
    filter: Filter,
    selected_date: NaiveDate,
    selected: Option<AppointmentId>,
    dark_mode: bool,
    narrow: bool,
    navigated_date: NaiveDate,
}

impl<S: KeyValueStore> CalendarView<S> {
    /// Load the persisted appointments and start on `today`.
    pub fn mount(backend: S, today: NaiveDate) -> Self {
        CalendarView {
            store: AppointmentStore::load(backend),
            form: AppointmentForm::new(),
            filter: Filter::default(),
            selected_date: today,
            selected: None,
            dark_mode: false,
            narrow: false,
            navigated_date: today,
        }
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }

    pub fn with_narrow(mut self, narrow: bool) -> Self {
        self.narrow = narrow;
        self
    }

    pub fn store(&self) -> &AppointmentStore<S> {
        &self.store
    }

    pub fn form(&self) -> &AppointmentForm {
        &self.form
    }

    /// Field edits go straight to the form; saving goes through
    /// [`CalendarView::submit`].
    pub fn form_mut(&mut self) -> &mut AppointmentForm {
        &mut self.form
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn selected(&self) -> Option<&Appointment> {
        self.selected.and_then(|id| self.store.get(id))
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn is_narrow(&self) -> bool {
        self.narrow
    }

    pub fn navigated_date(&self) -> NaiveDate {
        self.navigated_date
    }

    /// Apply one user action. `now` is the local wall-clock time the action
    /// happened at.
    pub fn dispatch(&mut self, action: ViewAction, now: NaiveDateTime) -> ClinicResult<()> {
        match action {
            ViewAction::SelectSlot(slot) => self.select_slot(slot.date(), now),
            ViewAction::AddAppointment => self.select_slot(self.selected_date, now),
            ViewAction::SelectEvent(id) => self.select_event(id),
            ViewAction::Form(message) => {
                self.apply(message)?;
            }
            ViewAction::CloseForm => {
                self.form.cancel();
                self.selected = None;
            }
            ViewAction::FilterChange(filter) => self.filter = filter,
            ViewAction::ToggleTheme => self.dark_mode = !self.dark_mode,
            ViewAction::SetNarrow(narrow) => self.narrow = narrow,
            ViewAction::Navigate(date) => self.navigated_date = date,
            ViewAction::PickDate(date) => {
                self.selected_date = date;
                self.navigated_date = date;
            }
        }
        Ok(())
    }

    /// Submit the open form and apply the save. Returns the id of the saved
    /// appointment. On a storage failure the form is reopened with the
    /// user's edits.
    pub fn submit(&mut self, roster: &Roster) -> ClinicResult<AppointmentId> {
        let draft = self.form.clone();
        let message = self.form.submit(roster)?;
        match self.apply(message) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(ClinicError::Storage(
                "saved appointment missing from the collection".into(),
            )),
            Err(e) => {
                self.form = draft;
                Err(e)
            }
        }
    }

    /// Delete the appointment open in the form. `false` when the form is
    /// not editing an existing appointment.
    pub fn delete_selected(&mut self) -> ClinicResult<bool> {
        let draft = self.form.clone();
        let Some(message) = self.form.delete() else {
            return Ok(false);
        };
        if let Err(e) = self.apply(message) {
            self.form = draft;
            return Err(e);
        }
        Ok(true)
    }

    /// Appointments matching the filter, in collection order.
    pub fn visible(&self) -> Vec<&Appointment> {
        filter::project(self.store.appointments(), &self.filter)
    }

    /// Visible appointments on `date`, ordered by start.
    pub fn visible_on(&self, date: NaiveDate) -> Vec<&Appointment> {
        let mut items = filter::on_day(self.visible(), date);
        items.sort_by_key(|a| a.start());
        items
    }

    /// Visible appointments in the navigated week, ordered by start.
    pub fn visible_week(&self) -> Vec<&Appointment> {
        let from = week_start(self.navigated_date).and_time(NaiveTime::MIN);
        let to = from.checked_add_days(Days::new(7)).unwrap_or(NaiveDateTime::MAX);
        let mut items = filter::in_range(self.visible(), from, to);
        items.sort_by_key(|a| a.start());
        items
    }

    fn select_slot(&mut self, date: NaiveDate, now: NaiveDateTime) {
        if date < now.date() {
            debug!(%date, "ignoring slot in the past");
            return;
        }
        self.selected_date = date;
        self.selected = None;
        self.form.open_create(date);
    }

    fn select_event(&mut self, id: AppointmentId) {
        let Some(appointment) = self.store.get(id) else {
            debug!(%id, "ignoring selection of unknown appointment");
            return;
        };
        self.form.open_edit(appointment);
        self.selected = Some(id);
    }

    /// The form closes only once the store has been written.
    fn apply(&mut self, message: FormMessage) -> ClinicResult<Option<AppointmentId>> {
        let saved = match message {
            FormMessage::Save { id, fields } => Some(self.save(id, fields)?),
            FormMessage::Delete { id } => {
                self.store.remove(id)?;
                debug!(%id, "deleted appointment");
                None
            }
        };

        self.form.cancel();
        self.selected = None;
        Ok(saved)
    }

    fn save(
        &mut self,
        id: Option<AppointmentId>,
        fields: AppointmentFields,
    ) -> ClinicResult<AppointmentId> {
        let existing = id.filter(|id| self.store.get(*id).is_some());
        let saved = self.store.upsert(existing, fields)?;

        let saved_id = match existing {
            Some(id) => Some(id),
            None => saved.last().map(Appointment::id),
        };
        if let Some(id) = saved_id {
            debug!(%id, updated = existing.is_some(), "saved appointment");
        }
        saved_id.ok_or_else(|| ClinicError::Storage("appointment was not stored".into()))
    }
}

/// The Sunday starting the week that contains `date`, or the earliest
/// representable date when that Sunday would fall before it.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = Days::new(u64::from(date.weekday().num_days_from_sunday()));
    date.checked_sub_days(back).unwrap_or(NaiveDate::MIN)
}
