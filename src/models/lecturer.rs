//! Lecturer model and typed preferences.
//!
//! Preferences are external input, validated on load and read-only to the
//! core. Every field is optional in spirit: an empty `available_days`
//! means the lecturer stated no day preference, never that they are
//! unavailable; availability by day is a soft signal. Only
//! `unavailable` time ranges are hard for physical sessions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::time::{TimeRange, Weekday};

/// Default load-unit cap per lecturer.
pub const DEFAULT_MAX_LOAD: u8 = 12;

/// A lecturer who can be assigned course sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecturer {
    /// Unique lecturer identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Scheduling preferences.
    pub preferences: Preferences,
}

impl Lecturer {
    /// Creates a lecturer with default preferences.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            preferences: Preferences::default(),
        }
    }

    /// Sets the preferences.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Day selector for an unavailability entry: one weekday or every weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaySpec {
    /// A single weekday.
    Day(Weekday),
    /// Wildcard: applies to all weekdays.
    Any,
}

impl DaySpec {
    /// Whether this spec matches the given weekday.
    #[inline]
    pub fn matches(&self, day: Weekday) -> bool {
        match self {
            DaySpec::Day(d) => *d == day,
            DaySpec::Any => true,
        }
    }

    /// Concrete weekdays this spec expands to.
    pub fn expand(&self) -> Vec<Weekday> {
        match self {
            DaySpec::Day(d) => vec![*d],
            DaySpec::Any => Weekday::ALL.to_vec(),
        }
    }
}

/// A hard-blocked time range, optionally on every weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableRange {
    /// Which day(s) the block applies to.
    pub day: DaySpec,
    /// Blocked interval.
    pub range: TimeRange,
}

/// Scheduling preferences of a lecturer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Days the lecturer prefers to teach. Soft signal, never a hard filter
    /// on its own.
    pub available_days: Vec<Weekday>,
    /// Preferred time ranges per day. A session fully inside one scores 100.
    pub preferred_times: HashMap<Weekday, Vec<TimeRange>>,
    /// Hard-blocked time ranges for physical sessions.
    pub unavailable: Vec<UnavailableRange>,
    /// Load-unit cap.
    pub max_load: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            available_days: Vec::new(),
            preferred_times: HashMap::new(),
            unavailable: Vec::new(),
            max_load: DEFAULT_MAX_LOAD,
        }
    }
}

impl Preferences {
    /// Creates empty preferences with the default load cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the available days.
    pub fn with_available_days(mut self, days: Vec<Weekday>) -> Self {
        self.available_days = days;
        self
    }

    /// Adds a preferred time range on a day.
    pub fn with_preferred_time(mut self, day: Weekday, range: TimeRange) -> Self {
        self.preferred_times.entry(day).or_default().push(range);
        self
    }

    /// Adds a hard-blocked range.
    pub fn with_unavailable(mut self, day: DaySpec, range: TimeRange) -> Self {
        self.unavailable.push(UnavailableRange { day, range });
        self
    }

    /// Sets the load cap.
    pub fn with_max_load(mut self, max_load: u8) -> Self {
        self.max_load = max_load;
        self
    }

    /// Whether the lecturer listed `day` as an available day.
    ///
    /// An empty list is treated as "no preference stated", which counts
    /// as available everywhere.
    #[inline]
    pub fn is_available_day(&self, day: Weekday) -> bool {
        self.available_days.is_empty() || self.available_days.contains(&day)
    }

    /// Whether `session` overlaps a hard-blocked range on `day`.
    pub fn is_blocked(&self, day: Weekday, session: &TimeRange) -> bool {
        self.unavailable
            .iter()
            .any(|u| u.day.matches(day) && u.range.overlaps(session))
    }

    /// Whether `session` lies fully inside a preferred range on `day`.
    pub fn is_preferred(&self, day: Weekday, session: &TimeRange) -> bool {
        self.preferred_times
            .get(&day)
            .map(|ranges| ranges.iter().any(|r| r.contains_range(session)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::at;

    #[test]
    fn test_default_preferences() {
        let p = Preferences::default();
        assert_eq!(p.max_load, 12);
        assert!(p.is_available_day(Weekday::Mon));
        assert!(p.is_available_day(Weekday::Fri));
    }

    #[test]
    fn test_available_days_listed() {
        let p = Preferences::new().with_available_days(vec![Weekday::Tue, Weekday::Wed]);
        assert!(p.is_available_day(Weekday::Tue));
        assert!(!p.is_available_day(Weekday::Mon));
    }

    #[test]
    fn test_blocked_single_day() {
        let p = Preferences::new().with_unavailable(
            DaySpec::Day(Weekday::Mon),
            TimeRange::new(at(8, 0), at(10, 0)),
        );
        let session = TimeRange::new(at(9, 40), at(11, 20));
        assert!(p.is_blocked(Weekday::Mon, &session));
        assert!(!p.is_blocked(Weekday::Tue, &session));
    }

    #[test]
    fn test_blocked_wildcard() {
        let p = Preferences::new()
            .with_unavailable(DaySpec::Any, TimeRange::new(at(14, 0), at(17, 20)));
        let afternoon = TimeRange::new(at(14, 0), at(15, 40));
        for day in Weekday::ALL {
            assert!(p.is_blocked(day, &afternoon));
        }
        let morning = TimeRange::new(at(8, 0), at(9, 40));
        assert!(!p.is_blocked(Weekday::Mon, &morning));
    }

    #[test]
    fn test_preferred_containment() {
        let p = Preferences::new()
            .with_preferred_time(Weekday::Tue, TimeRange::new(at(8, 0), at(10, 30)));
        assert!(p.is_preferred(Weekday::Tue, &TimeRange::new(at(8, 0), at(10, 30))));
        assert!(p.is_preferred(Weekday::Tue, &TimeRange::new(at(8, 50), at(10, 30))));
        // Partial overlap is not preferred
        assert!(!p.is_preferred(Weekday::Tue, &TimeRange::new(at(9, 40), at(11, 20))));
        assert!(!p.is_preferred(Weekday::Wed, &TimeRange::new(at(8, 0), at(10, 30))));
    }

    #[test]
    fn test_dayspec_expand() {
        assert_eq!(DaySpec::Day(Weekday::Wed).expand(), vec![Weekday::Wed]);
        assert_eq!(DaySpec::Any.expand().len(), 5);
    }
}
