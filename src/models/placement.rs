//! Placement (slot assignment) and timetable models.
//!
//! A placement binds one section to a `(day, room, time)` slot. A
//! timetable is the full committed set of placements; the placement
//! engine always computes it as a whole replacement, the repair engine
//! patches individual entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::time::{TimeRange, Weekday};

/// Room sentinel for online sessions. Excluded from room-conflict checks.
pub const ROOM_ONLINE: &str = "ONLINE";

/// Banded preference fit of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchQuality {
    /// Score >= 90.
    Excellent,
    /// Score >= 70.
    Good,
    /// Score >= 50.
    Acceptable,
    /// Score < 50.
    Poor,
}

impl MatchQuality {
    /// Bands a preference score.
    pub fn from_score(score: i32) -> Self {
        if score >= 90 {
            MatchQuality::Excellent
        } else if score >= 70 {
            MatchQuality::Good
        } else if score >= 50 {
            MatchQuality::Acceptable
        } else {
            MatchQuality::Poor
        }
    }
}

/// A committed `(day, room, time)` slot for one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Placed section ID.
    pub section_id: String,
    /// Lecturer ID (denormalized for query convenience).
    pub lecturer_id: String,
    /// Teaching day.
    pub day: Weekday,
    /// Physical room ID, or [`ROOM_ONLINE`].
    pub room: String,
    /// Session start (minutes from midnight).
    pub start: u16,
    /// Session end (exclusive).
    pub end: u16,
    /// Preference score 0-100 at commit time.
    pub preference_score: i32,
    /// Banded preference fit.
    pub match_quality: MatchQuality,
}

impl Placement {
    /// Creates a placement, deriving the quality band from the score.
    pub fn new(
        section_id: impl Into<String>,
        lecturer_id: impl Into<String>,
        day: Weekday,
        room: impl Into<String>,
        start: u16,
        end: u16,
        preference_score: i32,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            lecturer_id: lecturer_id.into(),
            day,
            room: room.into(),
            start,
            end,
            preference_score,
            match_quality: MatchQuality::from_score(preference_score),
        }
    }

    /// The session interval.
    #[inline]
    pub fn session(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Whether the session occupies a physical room.
    #[inline]
    pub fn is_physical(&self) -> bool {
        self.room != ROOM_ONLINE
    }
}

/// A full committed timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// All placements, one per scheduled section.
    pub placements: Vec<Placement>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing placement set (repair round-trip).
    pub fn from_placements(placements: Vec<Placement>) -> Self {
        Self { placements }
    }

    /// Adds a placement.
    pub fn add(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the timetable is empty.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Finds the placement of a section.
    pub fn for_section(&self, section_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.section_id == section_id)
    }

    /// All placements of a lecturer.
    pub fn for_lecturer(&self, lecturer_id: &str) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.lecturer_id == lecturer_id)
            .collect()
    }

    /// Distinct teaching days of a lecturer.
    pub fn days_for_lecturer(&self, lecturer_id: &str) -> Vec<Weekday> {
        let mut days: Vec<Weekday> = self
            .for_lecturer(lecturer_id)
            .iter()
            .map(|p| p.day)
            .collect();
        days.sort();
        days.dedup();
        days
    }

    /// Replaces the placement of a section, returning the old one.
    pub fn replace(&mut self, placement: Placement) -> Option<Placement> {
        let old = self
            .placements
            .iter()
            .position(|p| p.section_id == placement.section_id)
            .map(|idx| self.placements.remove(idx));
        self.placements.push(placement);
        old
    }

    /// Placed-section counts per weekday.
    pub fn per_day_counts(&self) -> HashMap<Weekday, usize> {
        let mut counts: HashMap<Weekday, usize> = HashMap::new();
        for day in Weekday::ALL {
            counts.insert(day, 0);
        }
        for p in &self.placements {
            *counts.entry(p.day).or_insert(0) += 1;
        }
        counts
    }
}
