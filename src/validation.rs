//! Input validation for timetabling runs.
//!
//! Checks structural integrity of course and lecturer records before
//! generation. Detects:
//! - Duplicate IDs
//! - `selected_by` entries referencing unknown lecturers
//! - More than three opted-in lecturers per course
//! - Credit hours outside 1-3
//! - Malformed preference time ranges

use std::collections::HashSet;

use crate::models::{Course, Lecturer};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A course references a lecturer that doesn't exist.
    UnknownLecturer,
    /// A course has more than three opted-in lecturers.
    TooManySelections,
    /// Credit hours outside the 1-3 band.
    InvalidCreditHours,
    /// A preference time range with end <= start.
    InvalidTimeRange,
    /// A lecturer with a zero load cap.
    InvalidLoadCap,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates course and lecturer records.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(courses: &[Course], lecturers: &[Lecturer]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut lecturer_ids = HashSet::new();
    for l in lecturers {
        if !lecturer_ids.insert(l.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate lecturer ID: {}", l.id),
            ));
        }
        if l.preferences.max_load == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLoadCap,
                format!("Lecturer '{}' has a zero load cap", l.id),
            ));
        }
        for ranges in l.preferences.preferred_times.values() {
            for r in ranges {
                if !r.is_valid() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidTimeRange,
                        format!("Lecturer '{}' has preferred range {r} with end <= start", l.id),
                    ));
                }
            }
        }
        for u in &l.preferences.unavailable {
            if !u.range.is_valid() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeRange,
                    format!(
                        "Lecturer '{}' has unavailable range {} with end <= start",
                        l.id, u.range
                    ),
                ));
            }
        }
    }

    let mut course_ids = HashSet::new();
    for c in courses {
        if !course_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", c.id),
            ));
        }
        if !(1..=3).contains(&c.credit_hours) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCreditHours,
                format!(
                    "Course '{}' has {} credit hours (expected 1-3)",
                    c.id, c.credit_hours
                ),
            ));
        }
        if c.selected_by.len() > 3 {
            errors.push(ValidationError::new(
                ValidationErrorKind::TooManySelections,
                format!(
                    "Course '{}' has {} opted-in lecturers (max 3)",
                    c.id,
                    c.selected_by.len()
                ),
            ));
        }
        for lecturer_id in &c.selected_by {
            if !lecturer_ids.contains(lecturer_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownLecturer,
                    format!(
                        "Course '{}' references unknown lecturer '{}'",
                        c.id, lecturer_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::at;
    use crate::models::{Preferences, TimeRange, Weekday};

    fn sample_lecturers() -> Vec<Lecturer> {
        vec![
            Lecturer::new("L1", "Dr. One"),
            Lecturer::new("L2", "Dr. Two"),
        ]
    }

    fn sample_courses() -> Vec<Course> {
        vec![
            Course::new("CS101", "Intro", 3).with_selected_by(vec!["L1".into(), "L2".into()]),
            Course::new("CS102", "Structures", 2).with_selected_by(vec!["L1".into()]),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_courses(), &sample_lecturers()).is_ok());
    }

    #[test]
    fn test_duplicate_course_id() {
        let courses = vec![Course::new("C1", "A", 2), Course::new("C1", "B", 2)];
        let errors = validate_input(&courses, &sample_lecturers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_duplicate_lecturer_id() {
        let lecturers = vec![Lecturer::new("L1", "A"), Lecturer::new("L1", "B")];
        let errors = validate_input(&[], &lecturers).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("lecturer")));
    }

    #[test]
    fn test_unknown_lecturer_reference() {
        let courses = vec![Course::new("C1", "A", 2).with_selected_by(vec!["GHOST".into()])];
        let errors = validate_input(&courses, &sample_lecturers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownLecturer));
    }

    #[test]
    fn test_too_many_selections() {
        let lecturers: Vec<Lecturer> = (1..=4)
            .map(|i| Lecturer::new(format!("L{i}"), format!("Dr. {i}")))
            .collect();
        let courses = vec![Course::new("C1", "A", 2)
            .with_selected_by(vec!["L1".into(), "L2".into(), "L3".into(), "L4".into()])];
        let errors = validate_input(&courses, &lecturers).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::TooManySelections));
    }

    #[test]
    fn test_invalid_credit_hours() {
        let courses = vec![Course::new("C1", "A", 0), Course::new("C2", "B", 5)];
        let errors = validate_input(&courses, &sample_lecturers()).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidCreditHours)
                .count(),
            2
        );
    }

    #[test]
    fn test_invalid_time_range() {
        let prefs = Preferences::new()
            .with_preferred_time(Weekday::Mon, TimeRange::new(at(10, 0), at(9, 0)));
        let lecturers = vec![Lecturer::new("L1", "A").with_preferences(prefs)];
        let errors = validate_input(&[], &lecturers).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidTimeRange));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let courses = vec![
            Course::new("C1", "A", 0),
            Course::new("C1", "B", 2).with_selected_by(vec!["GHOST".into()]),
        ];
        let errors = validate_input(&courses, &sample_lecturers()).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
