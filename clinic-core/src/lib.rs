//! Core types for the clinic calendar.
//!
//! This crate holds everything below the terminal front end:
//! - `Appointment` and its fixed one-hour span
//! - `AppointmentStore`, persisted through a `KeyValueStore` slot
//! - `filter` for deriving the visible appointments
//! - `AppointmentForm`, the create/edit state machine
//! - `CalendarView`, which composes the above and handles every user action
//! - `Session`, the login gate
//! - `Roster`, `ClinicConfig` and `Clinic` for rosters and configuration

pub mod appointment;
pub mod clinic;
pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod kv;
pub mod roster;
pub mod session;
pub mod store;
pub mod view;

pub use appointment::{Appointment, AppointmentFields, AppointmentId};
pub use error::{ClinicError, ClinicResult};
