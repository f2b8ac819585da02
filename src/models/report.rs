//! Unavailability reports and repair outcomes.
//!
//! A lecturer-facing workflow creates [`UnavailabilityReport`]s; the
//! repair engine consumes them, relocates the affected sections, and
//! writes the outcome back into the report.

use serde::{Deserialize, Serialize};

use super::lecturer::DaySpec;
use super::time::TimeRange;

/// Slack applied around a `Specific` time point (minutes).
pub const SPECIFIC_SLACK_MIN: u16 = 10;

/// How an unavailability entry describes its time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSpec {
    /// The whole teaching day.
    FullDay,
    /// A single time point, blocked with ±10 minutes of slack.
    Specific {
        /// The reported time point (minutes from midnight).
        at: u16,
    },
    /// An explicit interval.
    Range {
        /// Interval start.
        start: u16,
        /// Interval end (exclusive).
        end: u16,
    },
}

impl TimeSpec {
    /// Expands the spec into a concrete blocked interval.
    ///
    /// `day_span` is the full teaching span of the day, used for `FullDay`.
    pub fn expand(&self, day_span: TimeRange) -> TimeRange {
        match *self {
            TimeSpec::FullDay => day_span,
            TimeSpec::Specific { at } => TimeRange::new(
                at.saturating_sub(SPECIFIC_SLACK_MIN),
                at + SPECIFIC_SLACK_MIN,
            ),
            TimeSpec::Range { start, end } => TimeRange::new(start, end),
        }
    }
}

/// One entry of an unavailability report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityEntry {
    /// Affected day(s).
    pub day: DaySpec,
    /// Affected time span.
    pub time: TimeSpec,
}

/// Processing state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Not yet processed by the repair engine.
    Pending,
    /// Processed; `result` carries the outcome.
    Approved,
}

/// A lecturer's new-unavailability report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityReport {
    /// Reporting lecturer.
    pub lecturer_id: String,
    /// Blocked day/time entries.
    pub entries: Vec<UnavailabilityEntry>,
    /// Processing state.
    pub status: ReportStatus,
    /// Repair outcome, set when the report is approved.
    pub result: Option<RepairOutcome>,
}

impl UnavailabilityReport {
    /// Creates a pending report.
    pub fn new(lecturer_id: impl Into<String>, entries: Vec<UnavailabilityEntry>) -> Self {
        Self {
            lecturer_id: lecturer_id.into(),
            entries,
            status: ReportStatus::Pending,
            result: None,
        }
    }
}

/// A section the repair engine could not relocate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedSection {
    /// The stuck section.
    pub section_id: String,
    /// Why every relaxation tier failed.
    pub reason: String,
}

/// Summary of one repair run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepairOutcome {
    /// Sections successfully relocated.
    pub moved_sections: Vec<String>,
    /// Sections left in place with a failure reason.
    pub failed_sections: Vec<FailedSection>,
}

impl RepairOutcome {
    /// Number of relocated sections.
    pub fn moved(&self) -> usize {
        self.moved_sections.len()
    }

    /// Number of stuck sections.
    pub fn failed(&self) -> usize {
        self.failed_sections.len()
    }
}
