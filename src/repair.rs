//! Unavailability-driven timetable repair.
//!
//! Consumes a pending [`UnavailabilityReport`], relocates every
//! placement of the reporting lecturer that overlaps the newly blocked
//! windows, and writes the outcome back into the report. Relocation
//! walks the four-tier repair ladder; the last tier swaps slots with
//! another lecturer's section, relocating that donor first and rolling
//! back if either half fails.
//!
//! Report windows are hard at every tier, including for online
//! sections: a report states the lecturer genuinely cannot teach then.
//! Sections that exhaust the ladder stay at their original slot and are
//! listed in the outcome rather than treated as errors.

use std::collections::HashMap;

use log::{debug, info};

use crate::calendar::SlotCalendar;
use crate::conflict;
use crate::error::ScheduleError;
use crate::models::{
    grid, FailedSection, Lecturer, Placement, Preferences, RepairOutcome, ReportStatus, Section,
    TimeRange, Timetable, UnavailabilityEntry, UnavailabilityReport, Weekday,
};
use crate::placement::{prefs_for, PlacementConfig};
use crate::preference::{self, PreferenceMode, SCORE_PREFERRED};
use crate::relaxation::{try_tiers, RelaxationTier};

/// A candidate relocation slot.
#[derive(Debug, Clone)]
struct RepairSlot {
    day: Weekday,
    start: u16,
    room: String,
    score: i32,
}

/// Repairs a timetable after a lecturer reports new unavailability.
pub struct RepairEngine {
    config: PlacementConfig,
}

impl RepairEngine {
    /// Creates an engine sharing the placement room configuration.
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Processes one pending report against the committed timetable.
    ///
    /// Moves and failures are recorded in the returned outcome and in
    /// `report.result`; the report transitions to `Approved` either
    /// way. A `ConflictDetected` error means a move corrupted the
    /// timetable, which indicates an engine bug.
    pub fn apply(
        &self,
        report: &mut UnavailabilityReport,
        timetable: &mut Timetable,
        calendar: &mut SlotCalendar,
        sections: &[Section],
        lecturers: &[Lecturer],
    ) -> Result<RepairOutcome, ScheduleError> {
        let blocked = expand_entries(&report.entries);
        let by_id: HashMap<&str, &Section> =
            sections.iter().map(|s| (s.id.as_str(), s)).collect();
        let default_prefs = Preferences::default();
        let prefs_by_id: HashMap<&str, &Preferences> = lecturers
            .iter()
            .map(|l| (l.id.as_str(), &l.preferences))
            .collect();
        let prefs = prefs_for(&prefs_by_id, &default_prefs, &report.lecturer_id);

        let mut affected: Vec<Placement> = timetable
            .for_lecturer(&report.lecturer_id)
            .into_iter()
            .filter(|p| is_blocked_slot(&blocked, p.day, p.session()))
            .cloned()
            .collect();
        affected.sort_by(|a, b| {
            (a.day.index(), a.start, a.section_id.as_str()).cmp(&(
                b.day.index(),
                b.start,
                b.section_id.as_str(),
            ))
        });
        debug!(
            "Report from {}: {} blocked window(s), {} affected section(s)",
            report.lecturer_id,
            blocked.len(),
            affected.len()
        );

        let mut outcome = RepairOutcome::default();
        for old in affected {
            let Some(section) = by_id.get(old.section_id.as_str()).copied() else {
                outcome.failed_sections.push(FailedSection {
                    section_id: old.section_id.clone(),
                    reason: "placement references an unknown section".to_string(),
                });
                continue;
            };
            calendar.release(old.day, old.session(), &old.room, &old.lecturer_id);
            match self.relocate(
                calendar,
                timetable,
                &blocked,
                section,
                prefs,
                &by_id,
                &prefs_by_id,
                &default_prefs,
            ) {
                Some(placement) => {
                    timetable.replace(placement);
                    outcome.moved_sections.push(old.section_id.clone());
                }
                None => {
                    // Stays at the original slot, flagged for manual review.
                    calendar.commit(old.day, old.session(), &old.room, &old.lecturer_id);
                    outcome.failed_sections.push(FailedSection {
                        section_id: old.section_id.clone(),
                        reason: "all relaxation tiers exhausted".to_string(),
                    });
                }
            }
        }

        let scan = conflict::detect(timetable);
        if !scan.is_clean() {
            return Err(ScheduleError::ConflictDetected {
                count: scan.total(),
            });
        }

        info!(
            "Repair for {}: {} moved, {} failed",
            report.lecturer_id,
            outcome.moved(),
            outcome.failed()
        );
        report.status = ReportStatus::Approved;
        report.result = Some(outcome.clone());
        Ok(outcome)
    }

    /// Walks the repair ladder for one affected section. The winning
    /// slot (and, for a swap, the donor's new slot) is committed before
    /// returning.
    #[allow(clippy::too_many_arguments)]
    fn relocate(
        &self,
        calendar: &mut SlotCalendar,
        timetable: &mut Timetable,
        blocked: &[(Weekday, TimeRange)],
        section: &Section,
        prefs: &Preferences,
        by_id: &HashMap<&str, &Section>,
        prefs_by_id: &HashMap<&str, &Preferences>,
        default_prefs: &Preferences,
    ) -> Option<Placement> {
        let stated: Vec<Weekday> = if prefs.available_days.is_empty() {
            Weekday::ALL.to_vec()
        } else {
            prefs.available_days.clone()
        };
        let found = try_tiers(&RelaxationTier::REPAIR, |tier| {
            if tier == RelaxationTier::Swap {
                return self.try_swap(
                    calendar,
                    timetable,
                    blocked,
                    section,
                    prefs,
                    by_id,
                    prefs_by_id,
                    default_prefs,
                );
            }
            let (days, mode, require_preferred): (&[Weekday], _, _) = match tier {
                RelaxationTier::PreferredSlot => (&stated, PreferenceMode::Strict, true),
                RelaxationTier::AvailableDay => (&stated, PreferenceMode::Strict, false),
                _ => (&Weekday::ALL, PreferenceMode::Relaxed, false),
            };
            let c =
                self.best_slot(calendar, prefs, section, days, mode, require_preferred, blocked)?;
            let session = TimeRange::new(c.start, c.start + section.duration());
            calendar.commit(c.day, session, &c.room, &section.lecturer_id);
            Some(Placement::new(
                &section.id,
                &section.lecturer_id,
                c.day,
                c.room,
                c.start,
                session.end,
                c.score,
            ))
        });
        found.map(|(tier, placement)| {
            debug!("Relocated {} at tier {}", section.id, tier.label());
            placement
        })
    }

    /// Tier four: take over a donor section's slot.
    ///
    /// The donor's slot is freed and claimed before the donor searches
    /// for a new one, so the relocation cannot hand the same slot back.
    /// Both commits stand together or the whole attempt is rolled back.
    #[allow(clippy::too_many_arguments)]
    fn try_swap(
        &self,
        calendar: &mut SlotCalendar,
        timetable: &mut Timetable,
        blocked: &[(Weekday, TimeRange)],
        section: &Section,
        prefs: &Preferences,
        by_id: &HashMap<&str, &Section>,
        prefs_by_id: &HashMap<&str, &Preferences>,
        default_prefs: &Preferences,
    ) -> Option<Placement> {
        let duration = section.duration();
        let mut donors: Vec<Placement> = timetable
            .placements
            .iter()
            .filter(|p| p.lecturer_id != section.lecturer_id)
            .filter(|p| p.end - p.start == duration)
            .filter(|p| !is_blocked_slot(blocked, p.day, p.session()))
            .cloned()
            .collect();
        donors.sort_by(|a, b| {
            (a.day.index(), a.start, a.section_id.as_str()).cmp(&(
                b.day.index(),
                b.start,
                b.section_id.as_str(),
            ))
        });

        for donor in donors {
            let Some(donor_section) = by_id.get(donor.section_id.as_str()).copied() else {
                continue;
            };
            if donor_section.is_lab != section.is_lab
                || donor_section.is_online != section.is_online
            {
                continue;
            }
            let fit = preference::score(
                prefs,
                donor.day,
                donor.session(),
                section.is_online,
                PreferenceMode::Relaxed,
            );
            if !fit.allowed {
                continue;
            }

            calendar.release(donor.day, donor.session(), &donor.room, &donor.lecturer_id);
            if calendar.conflicts(donor.day, donor.session(), &donor.room, &section.lecturer_id) {
                calendar.commit(donor.day, donor.session(), &donor.room, &donor.lecturer_id);
                continue;
            }
            calendar.commit(donor.day, donor.session(), &donor.room, &section.lecturer_id);

            let donor_prefs = prefs_for(prefs_by_id, default_prefs, &donor.lecturer_id);
            if let Some(new_donor) =
                self.relocate_direct(calendar, donor_prefs, donor_section)
            {
                debug!(
                    "Swap: {} takes the slot of {}, donor moved to {} {}",
                    section.id,
                    donor.section_id,
                    new_donor.day,
                    new_donor.start
                );
                timetable.replace(new_donor);
                return Some(Placement::new(
                    &section.id,
                    &section.lecturer_id,
                    donor.day,
                    donor.room.clone(),
                    donor.start,
                    donor.end,
                    fit.score,
                ));
            }

            // Donor has nowhere to go: undo the claim, restore the donor.
            calendar.release(donor.day, donor.session(), &donor.room, &section.lecturer_id);
            calendar.commit(donor.day, donor.session(), &donor.room, &donor.lecturer_id);
        }
        None
    }

    /// Direct relocation of a swap donor through the first three tiers.
    /// Donors are not bound by the reporting lecturer's blocked windows.
    fn relocate_direct(
        &self,
        calendar: &mut SlotCalendar,
        prefs: &Preferences,
        section: &Section,
    ) -> Option<Placement> {
        let stated: Vec<Weekday> = if prefs.available_days.is_empty() {
            Weekday::ALL.to_vec()
        } else {
            prefs.available_days.clone()
        };
        let found = try_tiers(&RelaxationTier::PLACEMENT, |tier| {
            let (days, mode, require_preferred): (&[Weekday], _, _) = match tier {
                RelaxationTier::PreferredSlot => (&stated, PreferenceMode::Strict, true),
                RelaxationTier::PreferredTime => (&Weekday::ALL, PreferenceMode::Relaxed, true),
                RelaxationTier::AnyDay => (&Weekday::ALL, PreferenceMode::Relaxed, false),
                RelaxationTier::AvailableDay | RelaxationTier::Swap => return None,
            };
            self.best_slot(calendar, prefs, section, days, mode, require_preferred, &[])
        });
        found.map(|(_, c)| {
            let session = TimeRange::new(c.start, c.start + section.duration());
            calendar.commit(c.day, session, &c.room, &section.lecturer_id);
            Placement::new(
                &section.id,
                &section.lecturer_id,
                c.day,
                c.room,
                c.start,
                session.end,
                c.score,
            )
        })
    }

    /// Best free slot over `days` that avoids the blocked windows.
    /// Highest score wins, ties go to the earliest day and start.
    #[allow(clippy::too_many_arguments)]
    fn best_slot(
        &self,
        calendar: &SlotCalendar,
        prefs: &Preferences,
        section: &Section,
        days: &[Weekday],
        mode: PreferenceMode,
        require_preferred: bool,
        blocked: &[(Weekday, TimeRange)],
    ) -> Option<RepairSlot> {
        let duration = section.duration();
        let mut best: Option<RepairSlot> = None;
        for &day in days {
            for start in grid::start_times(day, duration) {
                let session = TimeRange::new(start, start + duration);
                if is_blocked_slot(blocked, day, session) {
                    continue;
                }
                let fit = preference::score(prefs, day, session, section.is_online, mode);
                if !fit.allowed {
                    continue;
                }
                if require_preferred && fit.score < SCORE_PREFERRED {
                    continue;
                }
                if best.as_ref().is_some_and(|b| fit.score <= b.score) {
                    continue;
                }
                let Some(room) = self.free_room(calendar, section, day, session) else {
                    continue;
                };
                best = Some(RepairSlot {
                    day,
                    start,
                    room,
                    score: fit.score,
                });
            }
        }
        best
    }

    fn free_room(
        &self,
        calendar: &SlotCalendar,
        section: &Section,
        day: Weekday,
        session: TimeRange,
    ) -> Option<String> {
        use crate::models::ROOM_ONLINE;
        if section.is_online {
            let free = !calendar.conflicts(day, session, ROOM_ONLINE, &section.lecturer_id);
            return free.then(|| ROOM_ONLINE.to_string());
        }
        let pool = if section.is_lab {
            &self.config.lab_rooms
        } else {
            &self.config.rooms
        };
        pool.iter()
            .find(|room| !calendar.conflicts(day, session, room, &section.lecturer_id))
            .cloned()
    }
}

/// Expands report entries into concrete `(day, interval)` blocked
/// windows. `FullDay` covers the whole teaching span of that day.
fn expand_entries(entries: &[UnavailabilityEntry]) -> Vec<(Weekday, TimeRange)> {
    let mut blocked = Vec::new();
    for entry in entries {
        for day in entry.day.expand() {
            let span = grid::day_windows(day).span();
            blocked.push((day, entry.time.expand(span)));
        }
    }
    blocked
}

fn is_blocked_slot(blocked: &[(Weekday, TimeRange)], day: Weekday, session: TimeRange) -> bool {
    blocked
        .iter()
        .any(|(d, window)| *d == day && window.overlaps(&session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::at;
    use crate::models::{DaySpec, TimeSpec};

    fn lecturer(id: &str, prefs: Preferences) -> Lecturer {
        Lecturer::new(id, format!("Dr. {id}")).with_preferences(prefs)
    }

    fn section(id: &str, credits: u8, lecturer: &str) -> Section {
        Section::new(id, "CS101", credits, lecturer, "A1")
    }

    fn placed(section: &Section, day: Weekday, room: &str, start: u16) -> Placement {
        Placement::new(
            &section.id,
            &section.lecturer_id,
            day,
            room,
            start,
            start + section.duration(),
            75,
        )
    }

    fn engine(rooms: Vec<&str>) -> RepairEngine {
        RepairEngine::new(PlacementConfig::new(
            rooms.into_iter().map(String::from).collect(),
        ))
    }

    fn full_day(day: Weekday) -> UnavailabilityEntry {
        UnavailabilityEntry {
            day: DaySpec::Day(day),
            time: TimeSpec::FullDay,
        }
    }

    #[test]
    fn test_full_day_report_moves_only_that_day() {
        let lecturers = vec![lecturer(
            "L1",
            Preferences::new().with_available_days(vec![Weekday::Mon, Weekday::Tue]),
        )];
        let sections = vec![section("S1", 2, "L1"), section("S2", 2, "L1")];
        let p1 = placed(&sections[0], Weekday::Mon, "R1", at(8, 0));
        let p2 = placed(&sections[1], Weekday::Tue, "R1", at(8, 0));
        let mut timetable = Timetable::from_placements(vec![p1, p2]);
        let mut calendar = SlotCalendar::rebuild_from(&timetable.placements);
        let mut report = UnavailabilityReport::new("L1", vec![full_day(Weekday::Mon)]);

        let outcome = engine(vec!["R1"])
            .apply(&mut report, &mut timetable, &mut calendar, &sections, &lecturers)
            .unwrap();

        assert_eq!(outcome.moved_sections, vec!["S1"]);
        assert!(outcome.failed_sections.is_empty());
        assert_eq!(report.status, ReportStatus::Approved);
        assert!(report.result.is_some());

        let moved = timetable.for_section("S1").unwrap();
        assert_eq!(moved.day, Weekday::Tue);
        // S2 still holds Tue 08:00, so S1 lands later that day.
        assert_eq!(moved.start, at(9, 40));
        let untouched = timetable.for_section("S2").unwrap();
        assert_eq!((untouched.day, untouched.start), (Weekday::Tue, at(8, 0)));
        assert!(conflict::detect(&timetable).is_clean());
    }

    #[test]
    fn test_specific_time_blocks_with_slack() {
        let lecturers = vec![lecturer("L1", Preferences::new())];
        let sections = vec![section("S1", 2, "L1"), section("S2", 2, "L1")];
        // S1 ends 09:40, inside the 09:30-09:50 slack window; S2 starts
        // at 14:00, well clear of it.
        let p1 = placed(&sections[0], Weekday::Mon, "R1", at(8, 0));
        let p2 = placed(&sections[1], Weekday::Mon, "R1", at(14, 0));
        let mut timetable = Timetable::from_placements(vec![p1, p2]);
        let mut calendar = SlotCalendar::rebuild_from(&timetable.placements);
        let mut report = UnavailabilityReport::new(
            "L1",
            vec![UnavailabilityEntry {
                day: DaySpec::Day(Weekday::Mon),
                time: TimeSpec::Specific { at: at(9, 40) },
            }],
        );

        let outcome = engine(vec!["R1"])
            .apply(&mut report, &mut timetable, &mut calendar, &sections, &lecturers)
            .unwrap();

        assert_eq!(outcome.moved_sections, vec!["S1"]);
        let moved = timetable.for_section("S1").unwrap();
        let blocked = TimeRange::new(at(9, 30), at(9, 50));
        assert!(!moved.session().overlaps(&blocked) || moved.day != Weekday::Mon);
        assert_eq!(timetable.for_section("S2").unwrap().start, at(14, 0));
    }

    #[test]
    fn test_wildcard_day_expands_to_whole_week() {
        let entries = vec![UnavailabilityEntry {
            day: DaySpec::Any,
            time: TimeSpec::Range {
                start: at(8, 0),
                end: at(10, 0),
            },
        }];
        let blocked = expand_entries(&entries);
        assert_eq!(blocked.len(), 5);
        assert!(is_blocked_slot(&blocked, Weekday::Fri, TimeRange::new(at(8, 0), at(9, 40))));
        assert!(!is_blocked_slot(&blocked, Weekday::Fri, TimeRange::new(at(13, 30), at(15, 10))));
    }

    #[test]
    fn test_swap_tier_relocates_donor_first() {
        // L1 blocks Mon-Thu entirely and Friday until 14:20, leaving a
        // single legal start, currently held by L2's section.
        let lecturers = vec![
            lecturer("L1", Preferences::new().with_available_days(vec![Weekday::Mon])),
            lecturer("L2", Preferences::new()),
        ];
        let sections = vec![section("S1", 2, "L1"), section("S2", 2, "L2")];
        let p1 = placed(&sections[0], Weekday::Mon, "R1", at(8, 0));
        let p2 = placed(&sections[1], Weekday::Fri, "R1", at(14, 20));
        let mut timetable = Timetable::from_placements(vec![p1, p2]);
        let mut calendar = SlotCalendar::rebuild_from(&timetable.placements);
        let mut entries: Vec<UnavailabilityEntry> =
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu]
                .into_iter()
                .map(full_day)
                .collect();
        entries.push(UnavailabilityEntry {
            day: DaySpec::Day(Weekday::Fri),
            time: TimeSpec::Range {
                start: at(8, 0),
                end: at(14, 20),
            },
        });
        let mut report = UnavailabilityReport::new("L1", entries);

        let outcome = engine(vec!["R1"])
            .apply(&mut report, &mut timetable, &mut calendar, &sections, &lecturers)
            .unwrap();

        assert_eq!(outcome.moved_sections, vec!["S1"]);
        assert!(outcome.failed_sections.is_empty());
        let s1 = timetable.for_section("S1").unwrap();
        assert_eq!((s1.day, s1.start), (Weekday::Fri, at(14, 20)));
        // The donor moved into the slot S1 vacated.
        let s2 = timetable.for_section("S2").unwrap();
        assert_eq!((s2.day, s2.start), (Weekday::Mon, at(8, 0)));
        assert!(conflict::detect(&timetable).is_clean());
    }

    #[test]
    fn test_exhausted_ladder_keeps_section_in_place() {
        let lecturers = vec![lecturer("L1", Preferences::new())];
        let sections = vec![section("S1", 2, "L1")];
        let p1 = placed(&sections[0], Weekday::Mon, "R1", at(8, 0));
        let mut timetable = Timetable::from_placements(vec![p1]);
        let mut calendar = SlotCalendar::rebuild_from(&timetable.placements);
        // Blocked everywhere, no donor to swap with.
        let mut report = UnavailabilityReport::new(
            "L1",
            vec![UnavailabilityEntry {
                day: DaySpec::Any,
                time: TimeSpec::FullDay,
            }],
        );

        let outcome = engine(vec!["R1"])
            .apply(&mut report, &mut timetable, &mut calendar, &sections, &lecturers)
            .unwrap();

        assert!(outcome.moved_sections.is_empty());
        assert_eq!(outcome.failed_sections.len(), 1);
        assert_eq!(outcome.failed_sections[0].section_id, "S1");
        assert_eq!(report.status, ReportStatus::Approved);

        // The original booking is restored, slot and calendar intact.
        let p = timetable.for_section("S1").unwrap();
        assert_eq!((p.day, p.start), (Weekday::Mon, at(8, 0)));
        assert!(calendar.conflicts(Weekday::Mon, p.session(), "R1", "L2"));
    }

    #[test]
    fn test_unreported_lecturer_untouched() {
        let lecturers = vec![
            lecturer("L1", Preferences::new()),
            lecturer("L2", Preferences::new()),
        ];
        let sections = vec![section("S1", 2, "L1"), section("S2", 2, "L2")];
        let p1 = placed(&sections[0], Weekday::Mon, "R1", at(8, 0));
        let p2 = placed(&sections[1], Weekday::Mon, "R2", at(8, 0));
        let mut timetable = Timetable::from_placements(vec![p1, p2]);
        let mut calendar = SlotCalendar::rebuild_from(&timetable.placements);
        let mut report = UnavailabilityReport::new("L1", vec![full_day(Weekday::Mon)]);

        engine(vec!["R1", "R2"])
            .apply(&mut report, &mut timetable, &mut calendar, &sections, &lecturers)
            .unwrap();

        let s2 = timetable.for_section("S2").unwrap();
        assert_eq!((s2.day, s2.start), (Weekday::Mon, at(8, 0)));
    }
}
