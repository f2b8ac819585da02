//! Greedy slot placement engine.
//!
//! Turns generated sections into a conflict-free timetable in four
//! passes:
//!
//! 1. Online sections are packed onto one designated weekday from the
//!    first legal start, checking lecturer conflicts only.
//! 2. Remaining lecturers are ordered by restrictiveness so the
//!    hardest-to-place ones get first pick of slots.
//! 3. Each lecturer's sections are packed into the best 2- or 3-day
//!    contiguous window under strict preference mode, preferring fewer
//!    distinct days, then higher total score.
//! 4. Sections a window could not hold fall back per-section through
//!    the relaxation ladder; whatever still fails is reported unplaced.
//!
//! A final rebalancing pass drains overloaded weekdays into the
//! lightest one (typically Friday, whose legal window is shorter). The
//! committed timetable is scanned once more before returning; any
//! overlap there is an engine bug and aborts the run.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::calendar::SlotCalendar;
use crate::conflict;
use crate::error::ScheduleError;
use crate::models::{
    grid, Lecturer, Placement, Preferences, Section, TimeRange, Timetable, Weekday, ROOM_ONLINE,
};
use crate::preference::{self, PreferenceMode, SCORE_PREFERRED};
use crate::relaxation::{try_tiers, RelaxationTier};

/// Upper bound on rebalancing moves per run.
const REBALANCE_MOVE_CAP: usize = 64;

/// Tuning knobs for the placement engine.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    /// Physical rooms for non-lab sections, tried in order.
    pub rooms: Vec<String>,
    /// Lab rooms. Lab sections place only here.
    pub lab_rooms: Vec<String>,
    /// Weekday online sections are packed onto.
    pub online_day: Weekday,
    /// Rebalance when the lightest day is this fraction below the
    /// weekly average.
    pub rebalance_threshold: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            rooms: Vec::new(),
            lab_rooms: Vec::new(),
            online_day: Weekday::Wed,
            rebalance_threshold: 0.2,
        }
    }
}

impl PlacementConfig {
    /// Creates a config with the given general-purpose rooms.
    pub fn new(rooms: Vec<String>) -> Self {
        Self {
            rooms,
            ..Self::default()
        }
    }

    /// Sets the lab room pool.
    pub fn with_lab_rooms(mut self, lab_rooms: Vec<String>) -> Self {
        self.lab_rooms = lab_rooms;
        self
    }

    /// Sets the designated online weekday.
    pub fn with_online_day(mut self, day: Weekday) -> Self {
        self.online_day = day;
        self
    }

    /// Sets the rebalancing threshold.
    pub fn with_rebalance_threshold(mut self, threshold: f64) -> Self {
        self.rebalance_threshold = threshold;
        self
    }
}

/// A section no tier could place, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnplacedSection {
    /// Section that stayed unplaced.
    pub section_id: String,
    /// Its lecturer.
    pub lecturer_id: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of one placement run.
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    /// The committed timetable.
    pub timetable: Timetable,
    /// Sections that could not be placed.
    pub unplaced: Vec<UnplacedSection>,
    /// Calendar indexing every committed booking. Hand this to the
    /// repair engine instead of rebuilding it.
    pub calendar: SlotCalendar,
}

impl PlacementOutcome {
    /// Whether every section was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// One candidate `(day, start, room)` slot with its preference score.
#[derive(Debug, Clone)]
struct SlotCandidate {
    day: Weekday,
    start: u16,
    room: String,
    score: i32,
}

/// Greedy placement engine.
pub struct PlacementEngine {
    config: PlacementConfig,
}

impl PlacementEngine {
    /// Creates an engine with the given config.
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Places every section into a conflict-free slot.
    ///
    /// Sections that exhaust the relaxation ladder are reported in the
    /// outcome, not as errors. A `ConflictDetected` error means the
    /// engine itself committed overlapping bookings.
    pub fn place(
        &self,
        sections: &[Section],
        lecturers: &[Lecturer],
    ) -> Result<PlacementOutcome, ScheduleError> {
        let default_prefs = Preferences::default();
        let prefs_by_id: HashMap<&str, &Preferences> = lecturers
            .iter()
            .map(|l| (l.id.as_str(), &l.preferences))
            .collect();

        let mut calendar = SlotCalendar::new();
        let mut timetable = Timetable::new();
        let mut unplaced = Vec::new();

        // Pass 1: online sections onto the designated day.
        let mut online: Vec<&Section> = sections.iter().filter(|s| s.is_online).collect();
        online.sort_by(|a, b| {
            (a.lecturer_id.as_str(), a.id.as_str()).cmp(&(b.lecturer_id.as_str(), b.id.as_str()))
        });
        for section in online {
            let prefs = prefs_for(&prefs_by_id, &default_prefs, &section.lecturer_id);
            let placed = self
                .place_online(&mut calendar, prefs, section)
                .or_else(|| self.place_with_tiers(&mut calendar, prefs, section));
            match placed {
                Some(p) => timetable.add(p),
                None => unplaced.push(UnplacedSection {
                    section_id: section.id.clone(),
                    lecturer_id: section.lecturer_id.clone(),
                    reason: "no free online slot on any day".to_string(),
                }),
            }
        }

        // Pass 2+3: physical sections per lecturer, most restrictive first.
        let mut by_lecturer: BTreeMap<&str, Vec<&Section>> = BTreeMap::new();
        for section in sections.iter().filter(|s| !s.is_online) {
            by_lecturer
                .entry(section.lecturer_id.as_str())
                .or_default()
                .push(section);
        }
        let mut ordered: Vec<(&str, Vec<&Section>)> = by_lecturer.into_iter().collect();
        ordered.sort_by(|a, b| {
            let ra = restrictiveness(prefs_for(&prefs_by_id, &default_prefs, a.0), a.1.len());
            let rb = restrictiveness(prefs_for(&prefs_by_id, &default_prefs, b.0), b.1.len());
            rb.cmp(&ra).then(a.0.cmp(b.0))
        });

        for (lecturer_id, mut secs) in ordered {
            let prefs = prefs_for(&prefs_by_id, &default_prefs, lecturer_id);
            // Longer sessions are harder to fit, place them first.
            secs.sort_by(|a, b| b.duration().cmp(&a.duration()).then(a.id.cmp(&b.id)));

            if let Some(placements) = self.pack_best_window(&mut calendar, prefs, &secs) {
                for p in placements {
                    timetable.add(p);
                }
                continue;
            }
            debug!(
                "No 2/3-day window holds all {} sections of {lecturer_id}, falling back per section",
                secs.len()
            );
            for section in secs {
                match self.place_with_tiers(&mut calendar, prefs, section) {
                    Some(p) => timetable.add(p),
                    None => unplaced.push(UnplacedSection {
                        section_id: section.id.clone(),
                        lecturer_id: section.lecturer_id.clone(),
                        reason: "no free compatible slot at any relaxation tier".to_string(),
                    }),
                }
            }
        }

        // Pass 4: drain overloaded days into the lightest one.
        self.rebalance(
            &mut calendar,
            &mut timetable,
            sections,
            &prefs_by_id,
            &default_prefs,
        );

        let report = conflict::detect(&timetable);
        if !report.is_clean() {
            return Err(ScheduleError::ConflictDetected {
                count: report.total(),
            });
        }

        info!(
            "Placed {}/{} sections ({} online day {})",
            timetable.len(),
            sections.len(),
            timetable
                .placements
                .iter()
                .filter(|p| p.room == ROOM_ONLINE)
                .count(),
            self.config.online_day
        );
        Ok(PlacementOutcome {
            timetable,
            unplaced,
            calendar,
        })
    }

    /// Packs an online section at the first free legal start of the
    /// designated online day.
    fn place_online(
        &self,
        calendar: &mut SlotCalendar,
        prefs: &Preferences,
        section: &Section,
    ) -> Option<Placement> {
        let day = self.config.online_day;
        let duration = section.duration();
        for start in grid::start_times(day, duration) {
            let session = TimeRange::new(start, start + duration);
            if calendar.conflicts(day, session, ROOM_ONLINE, &section.lecturer_id) {
                continue;
            }
            let fit = preference::score(prefs, day, session, true, PreferenceMode::Relaxed);
            if !fit.allowed {
                continue;
            }
            calendar.commit(day, session, ROOM_ONLINE, &section.lecturer_id);
            return Some(Placement::new(
                &section.id,
                &section.lecturer_id,
                day,
                ROOM_ONLINE,
                start,
                session.end,
                fit.score,
            ));
        }
        None
    }

    /// Tries every contiguous 2- then 3-day window and keeps the one
    /// that places all sections on the fewest distinct days with the
    /// highest total score. Returns `None` when no window holds them all.
    fn pack_best_window(
        &self,
        calendar: &mut SlotCalendar,
        prefs: &Preferences,
        sections: &[&Section],
    ) -> Option<Vec<Placement>> {
        let mut best: Option<(usize, i32, Vec<Placement>)> = None;
        for width in [2usize, 3] {
            for first in 0..=(Weekday::ALL.len() - width) {
                let days = &Weekday::ALL[first..first + width];
                let Some((placements, total)) = self.try_pack(calendar, prefs, sections, days)
                else {
                    continue;
                };
                // Tentative bookings are released here; the winner is
                // re-committed once all windows have been scored.
                for p in &placements {
                    calendar.release(p.day, p.session(), &p.room, &p.lecturer_id);
                }
                let mut distinct: Vec<Weekday> = placements.iter().map(|p| p.day).collect();
                distinct.sort();
                distinct.dedup();
                let better = match &best {
                    None => true,
                    Some((bd, bs, _)) => {
                        distinct.len() < *bd || (distinct.len() == *bd && total > *bs)
                    }
                };
                if better {
                    best = Some((distinct.len(), total, placements));
                }
            }
        }
        let (_, _, placements) = best?;
        for p in &placements {
            calendar.commit(p.day, p.session(), &p.room, &p.lecturer_id);
        }
        Some(placements)
    }

    /// Places all sections inside `days` under strict mode, committing
    /// as it goes. Rolls everything back on the first failure.
    fn try_pack(
        &self,
        calendar: &mut SlotCalendar,
        prefs: &Preferences,
        sections: &[&Section],
        days: &[Weekday],
    ) -> Option<(Vec<Placement>, i32)> {
        let mut placed: Vec<Placement> = Vec::with_capacity(sections.len());
        let mut total = 0;
        for section in sections {
            match self.best_slot(calendar, prefs, section, days, PreferenceMode::Strict, false) {
                Some(c) => {
                    let session = TimeRange::new(c.start, c.start + section.duration());
                    calendar.commit(c.day, session, &c.room, &section.lecturer_id);
                    total += c.score;
                    placed.push(Placement::new(
                        &section.id,
                        &section.lecturer_id,
                        c.day,
                        c.room,
                        c.start,
                        session.end,
                        c.score,
                    ));
                }
                None => {
                    for p in &placed {
                        calendar.release(p.day, p.session(), &p.room, &p.lecturer_id);
                    }
                    return None;
                }
            }
        }
        Some((placed, total))
    }

    /// Per-section fallback through the placement relaxation ladder.
    fn place_with_tiers(
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
                // Day-only relaxation and swapping belong to the repair ladder.
                RelaxationTier::AvailableDay | RelaxationTier::Swap => return None,
            };
            self.best_slot(calendar, prefs, section, days, mode, require_preferred)
        });
        found.map(|(tier, c)| {
            debug!("Placed {} at tier {}", section.id, tier.label());
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

    /// Best free slot for `section` over `days`: highest score wins,
    /// ties go to the earliest day and start.
    fn best_slot(
        &self,
        calendar: &SlotCalendar,
        prefs: &Preferences,
        section: &Section,
        days: &[Weekday],
        mode: PreferenceMode,
        require_preferred: bool,
    ) -> Option<SlotCandidate> {
        let duration = section.duration();
        let mut best: Option<SlotCandidate> = None;
        for &day in days {
            for start in grid::start_times(day, duration) {
                let session = TimeRange::new(start, start + duration);
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
                best = Some(SlotCandidate {
                    day,
                    start,
                    room,
                    score: fit.score,
                });
            }
        }
        best
    }

    /// First room of the right kind that is free at the slot. Also
    /// requires the lecturer to be free, so a `Some` is committable.
    fn free_room(
        &self,
        calendar: &SlotCalendar,
        section: &Section,
        day: Weekday,
        session: TimeRange,
    ) -> Option<String> {
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

    /// Moves sections off the heaviest weekday while the lightest one
    /// sits more than the threshold below the weekly average.
    ///
    /// Candidates are online-or-non-lab; lecturers already teaching on
    /// the lightest day move first, then smallest credit. A move is
    /// rejected when it would spread its lecturer past three distinct
    /// days, and only completes when the new slot passes the same
    /// conflict and preference checks as initial placement.
    fn rebalance(
        &self,
        calendar: &mut SlotCalendar,
        timetable: &mut Timetable,
        sections: &[Section],
        prefs_by_id: &HashMap<&str, &Preferences>,
        default_prefs: &Preferences,
    ) {
        // Below one section per weekday there is nothing to balance,
        // and moving would only degrade preference fit.
        if timetable.len() < Weekday::ALL.len() {
            return;
        }
        let by_id: HashMap<&str, &Section> =
            sections.iter().map(|s| (s.id.as_str(), s)).collect();
        let mut moves = 0;
        while moves < REBALANCE_MOVE_CAP {
            let counts = timetable.per_day_counts();
            let avg = timetable.len() as f64 / Weekday::ALL.len() as f64;
            // Scanned in reverse so ties resolve to the latest day
            // (Friday has the shortest legal window).
            let Some(lightest) = Weekday::ALL.iter().rev().copied().min_by_key(|d| counts[d])
            else {
                break;
            };
            let Some(heaviest) = Weekday::ALL.iter().copied().max_by_key(|d| counts[d]) else {
                break;
            };
            if (counts[&lightest] as f64) >= avg * (1.0 - self.config.rebalance_threshold) {
                break;
            }
            if counts[&heaviest] <= counts[&lightest] + 1 {
                // A move would just shift the imbalance.
                break;
            }

            let on_lightest: HashSet<&str> = timetable
                .placements
                .iter()
                .filter(|p| p.day == lightest)
                .map(|p| p.lecturer_id.as_str())
                .collect();
            let mut candidates: Vec<(&Section, Placement)> = timetable
                .placements
                .iter()
                .filter(|p| p.day == heaviest)
                .filter_map(|p| by_id.get(p.section_id.as_str()).map(|s| (*s, p.clone())))
                .filter(|(s, _)| s.is_online || !s.is_lab)
                .filter(|(s, _)| {
                    // The move may not spread the lecturer past three
                    // distinct teaching days.
                    let days = timetable.days_for_lecturer(&s.lecturer_id);
                    let leaves_heaviest = timetable
                        .for_lecturer(&s.lecturer_id)
                        .iter()
                        .filter(|q| q.day == heaviest)
                        .count()
                        == 1;
                    let mut after = days.len();
                    if leaves_heaviest {
                        after -= 1;
                    }
                    if !days.contains(&lightest) {
                        after += 1;
                    }
                    after <= days.len().max(3)
                })
                .collect();
            // Lecturers already teaching on the lightest day move first,
            // keeping each lecturer's week clustered.
            candidates.sort_by(|a, b| {
                let key = |s: &Section| {
                    (
                        !on_lightest.contains(s.lecturer_id.as_str()),
                        !s.is_online,
                        s.credit_hours,
                    )
                };
                key(a.0).cmp(&key(b.0)).then(a.0.id.cmp(&b.0.id))
            });

            let mut moved = false;
            for (section, old) in candidates {
                calendar.release(old.day, old.session(), &old.room, &old.lecturer_id);
                let prefs = prefs_for(prefs_by_id, default_prefs, &section.lecturer_id);
                if let Some(c) = self.best_slot(
                    calendar,
                    prefs,
                    section,
                    &[lightest],
                    PreferenceMode::Relaxed,
                    false,
                ) {
                    let session = TimeRange::new(c.start, c.start + section.duration());
                    calendar.commit(c.day, session, &c.room, &section.lecturer_id);
                    timetable.replace(Placement::new(
                        &section.id,
                        &section.lecturer_id,
                        c.day,
                        c.room,
                        c.start,
                        session.end,
                        c.score,
                    ));
                    debug!("Rebalanced {} from {heaviest} to {lightest}", section.id);
                    moves += 1;
                    moved = true;
                    break;
                }
                calendar.commit(old.day, old.session(), &old.room, &old.lecturer_id);
            }
            if !moved {
                break;
            }
        }
        if moves > 0 {
            info!("Rebalancing moved {moves} section(s)");
        }
    }
}

/// Preferences of a lecturer, falling back to defaults when a section
/// references an ID the input never declared.
pub(crate) fn prefs_for<'a>(
    prefs_by_id: &HashMap<&str, &'a Preferences>,
    default_prefs: &'a Preferences,
    lecturer_id: &str,
) -> &'a Preferences {
    match prefs_by_id.get(lecturer_id) {
        Some(p) => *p,
        None => {
            warn!("Section references unknown lecturer {lecturer_id}, using default preferences");
            default_prefs
        }
    }
}

/// How hard a lecturer is to place. Lecturers who stated no days count
/// as available on all five.
fn restrictiveness(prefs: &Preferences, section_count: usize) -> i64 {
    let days = if prefs.available_days.is_empty() {
        Weekday::ALL.len()
    } else {
        prefs.available_days.len()
    } as i64;
    100 * (5 - days).max(0) + 50 * prefs.unavailable.len() as i64 + 10 * section_count as i64
}
