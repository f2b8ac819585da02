//! Weekday and time-of-day primitives.
//!
//! All times of day are minutes from midnight. Intervals are half-open
//! `[start, end)`: two sessions touching at a boundary do not overlap.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Teaching weekdays. Weekends are outside the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    /// All teaching days in week order.
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// Position in the week (Mon = 0).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Weekday::Mon => 0,
            Weekday::Tue => 1,
            Weekday::Wed => 2,
            Weekday::Thu => 3,
            Weekday::Fri => 4,
        }
    }

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minutes from midnight for `h:m`.
#[inline]
pub const fn at(h: u16, m: u16) -> u16 {
    h * 60 + m
}

/// Formats minutes-from-midnight as `HH:MM`.
pub fn fmt_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// A time-of-day interval `[start, end)` in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Interval start (inclusive).
    pub start: u16,
    /// Interval end (exclusive).
    pub end: u16,
}

impl TimeRange {
    /// Creates a new time range.
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration(&self) -> u16 {
        self.end.saturating_sub(self.start)
    }

    /// Whether two ranges overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies fully inside this range.
    #[inline]
    pub fn contains_range(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the range is well-formed (non-empty, positive duration).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", fmt_minutes(self.start), fmt_minutes(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_order() {
        assert_eq!(Weekday::Mon.index(), 0);
        assert_eq!(Weekday::Fri.index(), 4);
        assert_eq!(Weekday::ALL.len(), 5);
        assert!(Weekday::Tue < Weekday::Thu);
    }

    #[test]
    fn test_at_and_format() {
        assert_eq!(at(8, 0), 480);
        assert_eq!(at(13, 30), 810);
        assert_eq!(fmt_minutes(at(9, 40)), "09:40");
    }

    #[test]
    fn test_range_overlap() {
        let a = TimeRange::new(at(8, 0), at(9, 40));
        let b = TimeRange::new(at(9, 0), at(10, 30));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        // Touching boundaries do not overlap
        let c = TimeRange::new(at(9, 40), at(11, 20));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_range_containment() {
        let outer = TimeRange::new(at(8, 0), at(12, 10));
        let inner = TimeRange::new(at(8, 50), at(10, 30));
        assert!(outer.contains_range(&inner));
        assert!(!inner.contains_range(&outer));
        assert!(outer.contains_range(&outer));
    }

    #[test]
    fn test_range_validity() {
        assert!(TimeRange::new(100, 200).is_valid());
        assert!(!TimeRange::new(200, 200).is_valid());
        assert!(!TimeRange::new(300, 200).is_valid());
    }

    #[test]
    fn test_duration() {
        assert_eq!(TimeRange::new(at(8, 0), at(9, 40)).duration(), 100);
        assert_eq!(TimeRange::new(at(14, 0), at(16, 30)).duration(), 150);
    }
}
