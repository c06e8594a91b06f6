//! Files kept in the application directory:
//!  - `events.jsonl`, the append-only activity log read through [event_log::EventLog].
//!  - `holidays.jsonl` and `vacations.jsonl`, read through [calendar_repository].
//!
//! Every file holds one JSON entity per line. Readers take a shared lock, writers an exclusive one.
//!
//! Timesheets can also be exported as CSV to any path through [timesheet_exporter].

pub mod calendar_repository;
pub mod entities;
pub mod error;
pub mod event_log;
pub mod timesheet_exporter;

pub use error::StorageError;
