//! The fixed weekly time grid.
//!
//! Sessions sit on a 50-minute period lattice inside two daily blocks
//! separated by a midday break:
//!
//! | Day     | Morning       | Break         | Afternoon     |
//! |---------|---------------|---------------|---------------|
//! | Mon-Thu | 08:00 - 12:10 | 13:00 - 14:00 | 14:00 - 17:20 |
//! | Fri     | 08:00 - 11:20 | 11:20 - 13:30 | 13:30 - 16:30 |
//!
//! Session duration is a pure function of credit hours: 1-2 credits run
//! 100 minutes, 3 credits run 150. A start time is legal iff the whole
//! session fits inside one block.

use super::time::{at, TimeRange, Weekday};

/// Period length of the lattice (minutes).
pub const PERIOD_MIN: u16 = 50;

/// Session length for 1-2 credit sections (minutes).
pub const SHORT_SESSION_MIN: u16 = 100;

/// Session length for 3 credit sections (minutes).
pub const LONG_SESSION_MIN: u16 = 150;

/// Session duration for a credit-hour load.
#[inline]
pub fn session_duration(credit_hours: u8) -> u16 {
    if credit_hours >= 3 {
        LONG_SESSION_MIN
    } else {
        SHORT_SESSION_MIN
    }
}

/// The two teaching blocks of one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindows {
    /// Morning block.
    pub morning: TimeRange,
    /// Afternoon block.
    pub afternoon: TimeRange,
}

impl DayWindows {
    /// Full span of the teaching day, break included.
    pub fn span(&self) -> TimeRange {
        TimeRange::new(self.morning.start, self.afternoon.end)
    }
}

/// Teaching blocks for a weekday. Friday is shorter on both ends.
pub fn day_windows(day: Weekday) -> DayWindows {
    match day {
        Weekday::Fri => DayWindows {
            morning: TimeRange::new(at(8, 0), at(11, 20)),
            afternoon: TimeRange::new(at(13, 30), at(16, 30)),
        },
        _ => DayWindows {
            morning: TimeRange::new(at(8, 0), at(12, 10)),
            afternoon: TimeRange::new(at(14, 0), at(17, 20)),
        },
    }
}

/// Legal start times for a session of `duration` minutes on `day`.
///
/// Walks the period lattice of each block and keeps the starts whose
/// session ends inside the block.
pub fn start_times(day: Weekday, duration: u16) -> Vec<u16> {
    let windows = day_windows(day);
    let mut starts = Vec::new();
    for block in [windows.morning, windows.afternoon] {
        let mut t = block.start;
        while t + duration <= block.end {
            starts.push(t);
            t += PERIOD_MIN;
        }
    }
    starts
}

/// Legal start times for a section with the given credit hours.
#[inline]
pub fn start_times_for_credits(day: Weekday, credit_hours: u8) -> Vec<u16> {
    start_times(day, session_duration(credit_hours))
}
