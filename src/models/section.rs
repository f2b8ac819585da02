//! Section model.
//!
//! A section is one teaching unit of a course taught by one lecturer.
//! Sections are created by the generator and immutable afterwards;
//! their slot lives in a separate [`Placement`](super::Placement).

use serde::{Deserialize, Serialize};

use super::grid::session_duration;

/// One teaching unit of a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Parent course ID.
    pub course_id: String,
    /// Credit-hour weight (denormalized from the course).
    pub credit_hours: u8,
    /// Whether the section needs a lab room.
    pub is_lab: bool,
    /// Whether the section runs online.
    pub is_online: bool,
    /// Assigned lecturer ID.
    pub lecturer_id: String,
    /// Section label within the course (e.g. "A3").
    pub label: String,
}

impl Section {
    /// Creates a new section.
    pub fn new(
        id: impl Into<String>,
        course_id: impl Into<String>,
        credit_hours: u8,
        lecturer_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            credit_hours,
            is_lab: false,
            is_online: false,
            lecturer_id: lecturer_id.into(),
            label: label.into(),
        }
    }

    /// Marks the section as a lab section.
    pub fn with_lab(mut self, is_lab: bool) -> Self {
        self.is_lab = is_lab;
        self
    }

    /// Marks the section as online.
    pub fn with_online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    /// Session duration in minutes, a pure function of credit hours.
    #[inline]
    pub fn duration(&self) -> u16 {
        session_duration(self.credit_hours)
    }
}
