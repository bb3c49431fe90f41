//! SeaORM entities.
//!
//! Kept apart from `models`: storage works with these rows and converts them
//! into business models before returning.

pub mod prelude;

pub mod attendance_records;
pub mod course_assignments;
pub mod events;
pub mod grades;
pub mod messages;
pub mod notifications;
pub mod sanctions;
pub mod students;
pub mod users;
