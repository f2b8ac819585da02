//! Timetabling domain models.
//!
//! Core data types shared by the generator, placement engine, conflict
//! detector, and repair engine.
//!
//! # Ownership
//!
//! | Type | Created by | Mutated by |
//! |------|-----------|------------|
//! | `Course`, `Lecturer` | external import | nobody (core reads only) |
//! | `Section` | section generator | nobody |
//! | `Placement`, `Timetable` | placement engine | repair engine |
//! | `UnavailabilityReport` | lecturer workflow | repair engine |

mod course;
pub mod grid;
mod lecturer;
mod placement;
mod report;
mod section;
pub mod time;

pub use course::Course;
pub use lecturer::{DaySpec, Lecturer, Preferences, UnavailableRange, DEFAULT_MAX_LOAD};
pub use placement::{MatchQuality, Placement, Timetable, ROOM_ONLINE};
pub use report::{
    FailedSection, RepairOutcome, ReportStatus, TimeSpec, UnavailabilityEntry,
    UnavailabilityReport, SPECIFIC_SLACK_MIN,
};
pub use section::Section;
pub use time::{TimeRange, Weekday};
