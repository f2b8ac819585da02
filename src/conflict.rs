//! Conflict detection over committed timetables.
//!
//! Pure scan: groups placements by room and by lecturer per day, sorts
//! by start time, and sweeps for interval overlaps
//! (`start1 < end2 && start2 < end1`). The virtual online room is
//! skipped in the room scan. Also used as a post-condition check after
//! generation, placement, and repair: any hit there is an engine bug.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::models::{Timetable, Weekday, ROOM_ONLINE};

/// Upper bound on sampled conflicting pairs in a report.
pub const SAMPLE_LIMIT: usize = 20;

/// What kind of double-booking a pair represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Two sections share a physical room and overlap.
    Room,
    /// One lecturer teaches two overlapping sections.
    Lecturer,
}

/// One conflicting pair of placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPair {
    /// Room or lecturer conflict.
    pub kind: ConflictKind,
    /// The shared party: room ID or lecturer ID.
    pub party: String,
    /// Day of the overlap.
    pub day: Weekday,
    /// First section and its interval (minutes from midnight).
    pub first: (String, u16, u16),
    /// Second section and its interval.
    pub second: (String, u16, u16),
}

/// Structured conflict report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Total room double-bookings.
    pub room_conflicts: usize,
    /// Total lecturer double-bookings.
    pub lecturer_conflicts: usize,
    /// Bounded sample of conflicting pairs.
    pub samples: Vec<ConflictPair>,
}

impl ConflictReport {
    /// Whether the timetable is conflict-free.
    pub fn is_clean(&self) -> bool {
        self.room_conflicts == 0 && self.lecturer_conflicts == 0
    }

    /// Total conflicting pairs.
    pub fn total(&self) -> usize {
        self.room_conflicts + self.lecturer_conflicts
    }
}

/// Scans a timetable for room and lecturer double-bookings.
///
/// Deterministic: grouping keys are ordered, so repeated runs over the
/// same timetable yield identical reports.
pub fn detect(timetable: &Timetable) -> ConflictReport {
    let mut report = ConflictReport::default();

    // (room, day) → placements, physical rooms only.
    let room_groups: BTreeMap<(&str, usize), Vec<usize>> = timetable
        .placements
        .iter()
        .enumerate()
        .filter(|(_, p)| p.room != ROOM_ONLINE)
        .map(|(i, p)| ((p.room.as_str(), p.day.index()), i))
        .into_group_map()
        .into_iter()
        .collect();
    scan_groups(timetable, room_groups, ConflictKind::Room, &mut report);

    let lecturer_groups: BTreeMap<(&str, usize), Vec<usize>> = timetable
        .placements
        .iter()
        .enumerate()
        .map(|(i, p)| ((p.lecturer_id.as_str(), p.day.index()), i))
        .into_group_map()
        .into_iter()
        .collect();
    scan_groups(
        timetable,
        lecturer_groups,
        ConflictKind::Lecturer,
        &mut report,
    );

    report
}

fn scan_groups(
    timetable: &Timetable,
    groups: BTreeMap<(&str, usize), Vec<usize>>,
    kind: ConflictKind,
    report: &mut ConflictReport,
) {
    for ((party, day_idx), mut indices) in groups {
        indices.sort_by_key(|&i| {
            let p = &timetable.placements[i];
            (p.start, p.section_id.clone())
        });

        // Sorted sweep: compare each booking with later ones until starts
        // pass its end.
        for a in 0..indices.len() {
            let pa = &timetable.placements[indices[a]];
            for &ib in &indices[a + 1..] {
                let pb = &timetable.placements[ib];
                if pb.start >= pa.end {
                    break;
                }
                if pa.session().overlaps(&pb.session()) {
                    match kind {
                        ConflictKind::Room => report.room_conflicts += 1,
                        ConflictKind::Lecturer => report.lecturer_conflicts += 1,
                    }
                    if report.samples.len() < SAMPLE_LIMIT {
                        report.samples.push(ConflictPair {
                            kind,
                            party: party.to_string(),
                            day: Weekday::ALL[day_idx],
                            first: (pa.section_id.clone(), pa.start, pa.end),
                            second: (pb.section_id.clone(), pb.start, pb.end),
                        });
                    }
                }
            }
        }
    }
}
