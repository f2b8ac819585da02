//! Course model.
//!
//! Courses arrive from an external import/selection workflow. The core
//! reads them but never mutates them: lecturer opt-ins live in
//! `selected_by`, capped at three per course.

use serde::{Deserialize, Serialize};

/// A course offered in a semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Credit-hour weight (1-3). Drives session duration and lecturer load.
    pub credit_hours: u8,
    /// Whether sessions need a lab room.
    pub is_lab: bool,
    /// Whether sessions run online (no physical room).
    pub is_online: bool,
    /// Semester tag (e.g. "2025-fall").
    pub semester: String,
    /// Lecturers who opted to teach this course, in selection order. At most 3.
    pub selected_by: Vec<String>,
}

impl Course {
    /// Creates a new course.
    pub fn new(id: impl Into<String>, name: impl Into<String>, credit_hours: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            credit_hours,
            is_lab: false,
            is_online: false,
            semester: String::new(),
            selected_by: Vec::new(),
        }
    }

    /// Sets the semester tag.
    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = semester.into();
        self
    }

    /// Marks the course as a lab course.
    pub fn with_lab(mut self) -> Self {
        self.is_lab = true;
        self
    }

    /// Marks the course as online.
    pub fn with_online(mut self) -> Self {
        self.is_online = true;
        self
    }

    /// Sets the opted-in lecturers.
    pub fn with_selected_by(mut self, lecturer_ids: Vec<String>) -> Self {
        self.selected_by = lecturer_ids;
        self
    }
}
