//! The appointment collection and its persisted slot.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};

use crate::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::error::{ClinicError, ClinicResult};
use crate::kv::KeyValueStore;

/// Slot holding the serialized appointment array.
pub const APPOINTMENTS_KEY: &str = "appointments";

/// Owns the ordered appointment collection.
///
/// Every mutating operation rewrites the whole slot before returning;
/// nothing else writes to it.
pub struct AppointmentStore<S> {
    backend: S,
    appointments: Vec<Appointment>,
}

impl<S: KeyValueStore> AppointmentStore<S> {
    /// Rehydrate from the backend. Absent or malformed data loads as an
    /// empty collection.
    pub fn load(backend: S) -> Self {
        let appointments = read_appointments(&backend);
        debug!(count = appointments.len(), "loaded appointments");
        AppointmentStore {
            backend,
            appointments,
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id() == id)
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Overwrite the slot with the full collection.
    pub fn save(&mut self) -> ClinicResult<()> {
        let json = serde_json::to_string(&self.appointments)
            .map_err(|e| ClinicError::Serialization(e.to_string()))?;
        self.backend.set(APPOINTMENTS_KEY, &json)?;
        debug!(count = self.appointments.len(), "saved appointments");
        Ok(())
    }

    /// Replace the fields of appointment `id` in place, or append a new
    /// appointment with a fresh id when `id` is `None` or unknown.
    pub fn upsert(
        &mut self,
        id: Option<AppointmentId>,
        fields: AppointmentFields,
    ) -> ClinicResult<&[Appointment]> {
        let previous = self.appointments.clone();
        match id.and_then(|id| self.position(id)) {
            Some(index) => self.appointments[index].set_fields(fields)?,
            None => {
                let id = self.next_id();
                self.appointments.push(Appointment::new(id, fields)?);
            }
        }

        self.save_or_restore(previous)?;
        Ok(&self.appointments)
    }

    /// Remove appointment `id`. Unknown ids leave the collection (and the
    /// slot) untouched.
    pub fn remove(&mut self, id: AppointmentId) -> ClinicResult<&[Appointment]> {
        if let Some(index) = self.position(id) {
            let previous = self.appointments.clone();
            self.appointments.remove(index);
            self.save_or_restore(previous)?;
        } else {
            debug!(%id, "remove of unknown appointment ignored");
        }
        Ok(&self.appointments)
    }

    /// Save, putting `previous` back when the slot cannot be written.
    fn save_or_restore(&mut self, previous: Vec<Appointment>) -> ClinicResult<()> {
        let result = self.save();
        if result.is_err() {
            self.appointments = previous;
        }
        result
    }

    fn position(&self, id: AppointmentId) -> Option<usize> {
        self.appointments.iter().position(|a| a.id() == id)
    }

    fn next_id(&self) -> AppointmentId {
        let now = Utc::now().timestamp_millis();
        let used: HashSet<_> = self.appointments.iter().map(Appointment::id).collect();
        let from = next_after(&self.appointments).map_or(now, |next| now.max(next));
        unused_id(&used, from)
    }
}

/// Smallest id strictly greater than every id in `appointments`. `None` when
/// the collection is empty or already holds `i64::MAX`.
fn next_after(appointments: &[Appointment]) -> Option<i64> {
    appointments
        .iter()
        .map(|a| a.id().0)
        .max()
        .and_then(|max| max.checked_add(1))
}

/// First id at or after `from` that is not in `used`, wrapping around past
/// `i64::MAX`.
fn unused_id(used: &HashSet<AppointmentId>, from: i64) -> AppointmentId {
    (from..=i64::MAX)
        .chain(i64::MIN..from)
        .map(AppointmentId)
        .find(|id| !used.contains(id))
        .unwrap_or(AppointmentId(from))
}

fn read_appointments<S: KeyValueStore>(backend: &S) -> Vec<Appointment> {
    let raw = match backend.get(APPOINTMENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "could not read appointments, starting empty");
            return Vec::new();
        }
    };

    let mut appointments: Vec<Appointment> = match serde_json::from_str(&raw) {
        Ok(appointments) => appointments,
        Err(e) => {
            warn!(error = %e, "discarding malformed appointment data");
            return Vec::new();
        }
    };

    dedupe_ids(&mut appointments);
    appointments
}

/// Give later duplicates of an id fresh ids so ids stay unique.
fn dedupe_ids(appointments: &mut [Appointment]) {
    let mut used: HashSet<_> = appointments.iter().map(Appointment::id).collect();
    let mut seen = HashSet::new();
    let from = next_after(appointments).unwrap_or(i64::MIN);

    for appointment in appointments.iter_mut() {
        if !seen.insert(appointment.id()) {
            let fresh = unused_id(&used, from);
            warn!(old = %appointment.id(), new = %fresh, "duplicate appointment id reassigned");
            appointment.reassign_id(fresh);
            used.insert(fresh);
            seen.insert(fresh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FileStore, MemoryStore};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn fields(patient: &str, doctor: &str, start: NaiveDateTime) -> AppointmentFields {
        AppointmentFields::new(patient, doctor, start)
    }

    fn seeded() -> AppointmentStore<MemoryStore> {
        let mut store = AppointmentStore::load(MemoryStore::new());
        store.upsert(None, fields("Alice", "Dr. Smith", at(10, 9))).unwrap();
        store.upsert(None, fields("Bob", "Dr. Jones", at(11, 14))).unwrap();
        store
    }

    #[test]
    fn empty_backend_loads_empty() {
        let store = AppointmentStore::load(MemoryStore::new());
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_slot_loads_empty() {
        for raw in ["not json", "null", "{\"id\":1}", "[{\"id\":1,\"patient\":\"A\"}]"] {
            let mut backend = MemoryStore::new();
            backend.set(APPOINTMENTS_KEY, raw).unwrap();
            assert!(AppointmentStore::load(backend).is_empty(), "{raw}");
        }
    }

    #[test]
    fn start_too_late_for_an_hour_loads_empty() {
        let raw = r#"[{"id":1,"patient":"Alice","doctor":"Dr. Smith",
            "start":"+262142-12-31T23:30:00"}]"#;
        let mut backend = MemoryStore::new();
        backend.set(APPOINTMENTS_KEY, raw).unwrap();

        assert!(AppointmentStore::load(backend).is_empty());
    }

    #[test]
    fn upsert_out_of_range_start_fails_without_saving() {
        let mut store = seeded();
        let before = store.appointments().to_vec();
        let late = fields("Carol", "Dr. Patel", NaiveDateTime::MAX);

        let err = store.upsert(None, late.clone()).unwrap_err();
        assert!(matches!(err, ClinicError::OutOfRange(_)));

        let target = before[0].id();
        assert!(store.upsert(Some(target), late).is_err());
        assert_eq!(store.appointments(), before.as_slice());

        let reloaded = AppointmentStore::load(store.backend.clone());
        assert_eq!(reloaded.appointments(), before.as_slice());
    }

    #[test]
    fn upsert_without_id_appends_with_fresh_id() {
        let mut store = seeded();
        let before: Vec<_> = store.appointments().iter().map(|a| a.id()).collect();

        let new_fields = fields("Carol", "Dr. Patel", at(12, 10));
        let after = store.upsert(None, new_fields.clone()).unwrap();

        assert_eq!(after.len(), before.len() + 1);
        let added = after.last().unwrap();
        assert!(!before.contains(&added.id()));
        assert_eq!(added.fields(), new_fields);
    }

    #[test]
    fn upsert_existing_id_replaces_in_place() {
        let mut store = seeded();
        let target = store.appointments()[0].id();

        let after = store
            .upsert(Some(target), fields("Alice", "Dr. Patel", at(10, 15)))
            .unwrap();

        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id(), target);
        assert_eq!(after[0].doctor(), "Dr. Patel");
        assert_eq!(after[0].end(), at(10, 16));
        assert_eq!(after[1].patient(), "Bob");
    }

    #[test]
    fn upsert_unknown_id_appends_with_fresh_id() {
        let mut store = seeded();
        let after = store
            .upsert(Some(AppointmentId(-5)), fields("Carol", "Dr. Patel", at(12, 10)))
            .unwrap();

        assert_eq!(after.len(), 3);
        assert_ne!(after[2].id(), AppointmentId(-5));
    }

    #[test]
    fn ids_are_unique_when_created_back_to_back() {
        let mut store = AppointmentStore::load(MemoryStore::new());
        for hour in 8..16 {
            store.upsert(None, fields("Alice", "Dr. Smith", at(10, hour))).unwrap();
        }
        let ids: HashSet<_> = store.appointments().iter().map(|a| a.id()).collect();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut store = seeded();
        let before = store.appointments().to_vec();

        let after = store.remove(AppointmentId(123)).unwrap();

        assert_eq!(after, before.as_slice());
    }

    #[test]
    fn remove_deletes_and_persists() {
        let mut store = seeded();
        let target = store.appointments()[0].id();

        store.remove(target).unwrap();

        let reloaded = AppointmentStore::load(store.backend.clone());
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get(target).is_none());
    }

    #[test]
    fn load_after_save_roundtrips() {
        let store = seeded();
        let reloaded = AppointmentStore::load(store.backend.clone());
        assert_eq!(reloaded.appointments(), store.appointments());
    }

    #[test]
    fn file_backed_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AppointmentStore::load(FileStore::new(dir.path()));
        store.upsert(None, fields("Alice", "Dr. Smith", at(10, 9))).unwrap();

        let reloaded = AppointmentStore::load(FileStore::new(dir.path()));
        assert_eq!(reloaded.appointments(), store.appointments());
    }

    #[test]
    fn loads_browser_style_records() {
        let raw = r#"[{"id":1704877200000,"patient":"Alice","doctor":"Dr. Smith",
            "start":"2024-01-10T09:00","end":"2024-01-10T10:00"}]"#;
        let mut backend = MemoryStore::new();
        backend.set(APPOINTMENTS_KEY, raw).unwrap();

        let store = AppointmentStore::load(backend);

        assert_eq!(store.len(), 1);
        assert_eq!(store.appointments()[0].start(), at(10, 9));
    }

    #[test]
    fn duplicate_ids_are_reassigned_on_load() {
        let raw = r#"[
            {"id":5,"patient":"Alice","doctor":"Dr. Smith","start":"2024-01-10T09:00"},
            {"id":5,"patient":"Bob","doctor":"Dr. Jones","start":"2024-01-10T11:00"}
        ]"#;
        let mut backend = MemoryStore::new();
        backend.set(APPOINTMENTS_KEY, raw).unwrap();

        let store = AppointmentStore::load(backend);

        assert_eq!(store.appointments()[0].id(), AppointmentId(5));
        assert_eq!(store.appointments()[1].id(), AppointmentId(6));
    }

    #[test]
    fn max_id_does_not_repeat() {
        let raw = r#"[{"id":9223372036854775807,"patient":"Alice","doctor":"Dr. Smith",
            "start":"2024-01-10T09:00"}]"#;
        let mut backend = MemoryStore::new();
        backend.set(APPOINTMENTS_KEY, raw).unwrap();
        let mut store = AppointmentStore::load(backend);

        store.upsert(None, fields("Bob", "Dr. Jones", at(10, 11))).unwrap();
        store.upsert(None, fields("Carol", "Dr. Patel", at(10, 13))).unwrap();

        let ids: HashSet<_> = store.appointments().iter().map(|a| a.id()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&AppointmentId(i64::MAX)));
    }

    #[test]
    fn duplicate_max_ids_are_reassigned_uniquely() {
        let raw = r#"[
            {"id":9223372036854775807,"patient":"Alice","doctor":"Dr. Smith","start":"2024-01-10T09:00"},
            {"id":9223372036854775807,"patient":"Bob","doctor":"Dr. Jones","start":"2024-01-10T11:00"},
            {"id":9223372036854775807,"patient":"Carol","doctor":"Dr. Patel","start":"2024-01-10T13:00"}
        ]"#;
        let mut backend = MemoryStore::new();
        backend.set(APPOINTMENTS_KEY, raw).unwrap();

        let store = AppointmentStore::load(backend);

        let ids: HashSet<_> = store.appointments().iter().map(|a| a.id()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(store.appointments()[0].id(), AppointmentId(i64::MAX));
    }
}
