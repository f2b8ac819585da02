//! University course timetabling core.
//!
//! Assigns course sections to lecturers under credit-hour load quotas,
//! places every section into a conflict-free `(day, room, time)` slot
//! on a fixed weekly grid, and repairs the timetable when a lecturer
//! reports new unavailability.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Lecturer`, `Section`,
//!   `Placement`, `Timetable`, `UnavailabilityReport`, the weekly grid
//! - **`generator`**: Two-phase GA search for section/lecturer
//!   assignments balancing load inside a credit band
//! - **`placement`**: Greedy slot placement with window packing and
//!   weekday rebalancing
//! - **`repair`**: Unavailability-driven relocation through a cascading
//!   relaxation ladder, slot swaps included
//! - **`preference`**: The shared preference-scoring model
//! - **`calendar`**: Booking indexes shared by placement and repair
//! - **`conflict`**: Interval-overlap scans over committed timetables
//! - **`search`**: The generic GA runner driving the generator
//! - **`validation`**: Input integrity checks (duplicate IDs, quota and
//!   range sanity)
//! - **`metrics`**: Timetable quality indicators
//!
//! # Pipeline
//!
//! ```text
//! Courses + Lecturers
//!   → generator (sections)
//!   → placement (timetable + calendar)
//!   → repair    (patched timetable, per report)
//! ```
//!
//! Everything operates on in-memory snapshots; persistence, import, and
//! the request layer live outside this crate.

pub mod calendar;
pub mod conflict;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod models;
pub mod placement;
pub mod preference;
pub mod relaxation;
pub mod repair;
pub mod search;
pub mod validation;

pub use error::ScheduleError;
