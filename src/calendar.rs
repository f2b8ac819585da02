//! Booking calendar: the single source of truth for occupied slots.
//!
//! Two interval indexes, one keyed by `(lecturer, day)` and one by
//! `(room, day)`. The virtual room [`ROOM_ONLINE`] never enters the room
//! index, so online sections can share a "room" freely.
//!
//! All placement and repair logic goes through `conflicts` → `commit`;
//! `release` undoes one booking exactly, leaving no residue, which is
//! what makes tentative moves and slot swaps safe to roll back.

use std::collections::HashMap;

use crate::models::{Placement, TimeRange, Weekday, ROOM_ONLINE};

/// In-memory index of booked lecturer and room intervals.
#[derive(Debug, Clone, Default)]
pub struct SlotCalendar {
    by_lecturer: HashMap<(String, Weekday), Vec<TimeRange>>,
    by_room: HashMap<(String, Weekday), Vec<TimeRange>>,
}

impl SlotCalendar {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a calendar from an already-committed placement set.
    ///
    /// Used by the repair engine to load the persisted timetable.
    pub fn rebuild_from(placements: &[Placement]) -> Self {
        let mut cal = Self::new();
        for p in placements {
            cal.commit(p.day, p.session(), &p.room, &p.lecturer_id);
        }
        cal
    }

    /// Whether booking `(day, session, room, lecturer)` would collide
    /// with an existing booking.
    pub fn conflicts(&self, day: Weekday, session: TimeRange, room: &str, lecturer: &str) -> bool {
        if let Some(booked) = self.by_lecturer.get(&(lecturer.to_string(), day)) {
            if booked.iter().any(|b| b.overlaps(&session)) {
                return true;
            }
        }
        if room != ROOM_ONLINE {
            if let Some(booked) = self.by_room.get(&(room.to_string(), day)) {
                if booked.iter().any(|b| b.overlaps(&session)) {
                    return true;
                }
            }
        }
        false
    }

    /// Books a slot. Callers must check [`conflicts`](Self::conflicts) first.
    pub fn commit(&mut self, day: Weekday, session: TimeRange, room: &str, lecturer: &str) {
        self.by_lecturer
            .entry((lecturer.to_string(), day))
            .or_default()
            .push(session);
        if room != ROOM_ONLINE {
            self.by_room
                .entry((room.to_string(), day))
                .or_default()
                .push(session);
        }
    }

    /// Releases one previously committed booking.
    ///
    /// Removes exactly one matching interval from each index. A lecturer
    /// booked twice on the same interval (a bug upstream) loses one entry.
    pub fn release(&mut self, day: Weekday, session: TimeRange, room: &str, lecturer: &str) {
        remove_one(
            &mut self.by_lecturer,
            (lecturer.to_string(), day),
            &session,
        );
        if room != ROOM_ONLINE {
            remove_one(&mut self.by_room, (room.to_string(), day), &session);
        }
    }

    /// Booked intervals of a lecturer on a day, sorted by start.
    pub fn lecturer_bookings(&self, lecturer: &str, day: Weekday) -> Vec<TimeRange> {
        let mut booked = self
            .by_lecturer
            .get(&(lecturer.to_string(), day))
            .cloned()
            .unwrap_or_default();
        booked.sort_by_key(|b| b.start);
        booked
    }

    /// Total number of booked intervals in the lecturer index.
    pub fn booking_count(&self) -> usize {
        self.by_lecturer.values().map(|v| v.len()).sum()
    }
}

fn remove_one(
    index: &mut HashMap<(String, Weekday), Vec<TimeRange>>,
    key: (String, Weekday),
    session: &TimeRange,
) {
    if let Some(booked) = index.get_mut(&key) {
        if let Some(pos) = booked.iter().position(|b| b == session) {
            booked.swap_remove(pos);
        }
        if booked.is_empty() {
            index.remove(&key);
        }
    }
}
