//! Crate-level error type.
//!
//! Expected infeasibility (unplaceable sections, failed repairs) is not
//! an error: it travels inside result objects. These variants cover the
//! cases that abort a run outright.

use thiserror::Error;

use crate::validation::ValidationError;

/// Fatal scheduling errors.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// No lecturer can be matched to any course. Aborts generation.
    #[error("no eligible lecturer/course assignment exists")]
    NoEligibleAssignment,

    /// A post-commit conflict scan found overlaps. Indicates an engine bug.
    #[error("committed timetable contains {count} conflicting booking pair(s)")]
    ConflictDetected {
        /// Total conflicting pairs found.
        count: usize,
    },

    /// Input records failed structural validation.
    #[error("invalid input: {}", format_errors(.0))]
    InvalidInput(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
