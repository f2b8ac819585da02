//! Preference scoring model.
//!
//! One pure scoring function shared by the placement and repair engines:
//! `(lecturer, day, session, is_online, mode)` → allowed + score 0-100.
//!
//! # Rules
//!
//! - Hard: a physical session overlapping a blocked range is rejected.
//!   Online sessions are only penalized (nothing physically blocks them).
//! - Soft ladder: 100 inside a preferred range, 75 on an available day,
//!   50 otherwise. Listed available days never reject on their own,
//!   except in [`PreferenceMode::Strict`], which the first placement pass
//!   uses to keep lecturers on their stated days.

use serde::{Deserialize, Serialize};

use crate::models::{Preferences, TimeRange, Weekday};

/// Score for a session fully inside a preferred time range.
pub const SCORE_PREFERRED: i32 = 100;
/// Score for a session on an available day outside preferred times.
pub const SCORE_AVAILABLE_DAY: i32 = 75;
/// Score for a session on a day the lecturer did not list.
pub const SCORE_OTHER_DAY: i32 = 50;
/// Score for an online session over a blocked range (soft penalty).
pub const SCORE_BLOCKED_ONLINE: i32 = 25;

/// How strictly stated available days are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferenceMode {
    /// Days outside `available_days` are rejected. First-pass placement.
    Strict,
    /// Days outside `available_days` only lower the score. Repair tiers.
    Relaxed,
}

/// Result of scoring one candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceScore {
    /// Whether the slot is admissible at all.
    pub allowed: bool,
    /// Fit score 0-100. Zero when not allowed.
    pub score: i32,
}

impl PreferenceScore {
    fn rejected() -> Self {
        Self {
            allowed: false,
            score: 0,
        }
    }

    fn accepted(score: i32) -> Self {
        Self {
            allowed: true,
            score,
        }
    }
}

/// Scores a candidate session against a lecturer's preferences.
pub fn score(
    prefs: &Preferences,
    day: Weekday,
    session: TimeRange,
    is_online: bool,
    mode: PreferenceMode,
) -> PreferenceScore {
    if prefs.is_blocked(day, &session) {
        if !is_online {
            return PreferenceScore::rejected();
        }
        // Online sessions are not physically blocked; penalize instead.
        return PreferenceScore::accepted(SCORE_BLOCKED_ONLINE);
    }

    let on_available_day = prefs.is_available_day(day);
    if mode == PreferenceMode::Strict && !on_available_day {
        return PreferenceScore::rejected();
    }

    if prefs.is_preferred(day, &session) {
        PreferenceScore::accepted(SCORE_PREFERRED)
    } else if on_available_day {
        PreferenceScore::accepted(SCORE_AVAILABLE_DAY)
    } else {
        PreferenceScore::accepted(SCORE_OTHER_DAY)
    }
}
