//! Timetable quality metrics (KPIs).
//!
//! Computes standard indicators from a committed timetable and the
//! generated sections it was built from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement Rate | Fraction of sections holding a slot |
//! | Mean Preference Score | Average score of committed placements |
//! | Quality Histogram | Placements per match-quality band |
//! | Day Balance | Placed-section count per weekday |
//! | Lecturer Load | Credit units and teaching days per lecturer |
//! | Band Misses | Lecturers outside the configured load band |

use std::collections::HashMap;

use crate::models::{MatchQuality, Section, Timetable, Weekday};

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Fraction of sections holding a slot (0.0..1.0).
    pub placement_rate: f64,
    /// Mean preference score of committed placements (0..100).
    pub mean_preference_score: f64,
    /// Placement count per quality band.
    pub quality_histogram: HashMap<MatchQuality, usize>,
    /// Placed-section count per weekday.
    pub per_day_counts: HashMap<Weekday, usize>,
    /// Credit units taught per lecturer.
    pub load_by_lecturer: HashMap<String, u32>,
    /// Distinct teaching days per lecturer.
    pub days_by_lecturer: HashMap<String, usize>,
    /// Lecturers whose load falls outside the configured band.
    pub band_misses: Vec<String>,
}

impl TimetableKpi {
    /// Computes KPIs from a timetable and its input sections.
    ///
    /// # Arguments
    /// * `timetable` - The committed timetable.
    /// * `sections` - All generated sections, placed or not.
    /// * `min_load`, `max_load` - The target load band in credit units.
    pub fn calculate(
        timetable: &Timetable,
        sections: &[Section],
        min_load: u32,
        max_load: u32,
    ) -> Self {
        let placement_rate = if sections.is_empty() {
            1.0
        } else {
            timetable.len() as f64 / sections.len() as f64
        };

        let mut quality_histogram: HashMap<MatchQuality, usize> = HashMap::new();
        let mut score_sum: i64 = 0;
        for p in &timetable.placements {
            *quality_histogram.entry(p.match_quality).or_insert(0) += 1;
            score_sum += i64::from(p.preference_score);
        }
        let mean_preference_score = if timetable.is_empty() {
            0.0
        } else {
            score_sum as f64 / timetable.len() as f64
        };

        let mut load_by_lecturer: HashMap<String, u32> = HashMap::new();
        for section in sections {
            *load_by_lecturer
                .entry(section.lecturer_id.clone())
                .or_insert(0) += u32::from(section.credit_hours);
        }

        let mut days_by_lecturer: HashMap<String, usize> = HashMap::new();
        for lecturer_id in load_by_lecturer.keys() {
            days_by_lecturer.insert(
                lecturer_id.clone(),
                timetable.days_for_lecturer(lecturer_id).len(),
            );
        }

        let mut band_misses: Vec<String> = load_by_lecturer
            .iter()
            .filter(|(_, &load)| load < min_load || load > max_load)
            .map(|(id, _)| id.clone())
            .collect();
        band_misses.sort();

        Self {
            placement_rate,
            mean_preference_score,
            quality_histogram,
            per_day_counts: timetable.per_day_counts(),
            load_by_lecturer,
            days_by_lecturer,
            band_misses,
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_placement_rate: f64, min_mean_score: f64) -> bool {
        self.placement_rate >= min_placement_rate
            && self.mean_preference_score >= min_mean_score
            && self.band_misses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::at;
    use crate::models::Placement;

    fn sample() -> (Timetable, Vec<Section>) {
        let sections = vec![
            Section::new("S1", "CS101", 3, "L1", "A1"),
            Section::new("S2", "CS101", 3, "L1", "A2"),
            Section::new("S3", "CS102", 2, "L2", "A1"),
            Section::new("S4", "CS102", 2, "L2", "A2"),
        ];
        let timetable = Timetable::from_placements(vec![
            Placement::new("S1", "L1", Weekday::Mon, "R1", at(8, 0), at(10, 30), 100),
            Placement::new("S2", "L1", Weekday::Tue, "R1", at(8, 0), at(10, 30), 75),
            Placement::new("S3", "L2", Weekday::Mon, "R2", at(8, 0), at(9, 40), 50),
            // S4 unplaced
        ]);
        (timetable, sections)
    }

    #[test]
    fn test_placement_rate_counts_unplaced() {
        let (timetable, sections) = sample();
        let kpi = TimetableKpi::calculate(&timetable, &sections, 4, 12);
        assert!((kpi.placement_rate - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_mean_score_and_histogram() {
        let (timetable, sections) = sample();
        let kpi = TimetableKpi::calculate(&timetable, &sections, 4, 12);
        assert!((kpi.mean_preference_score - 75.0).abs() < 1e-9);
        assert_eq!(kpi.quality_histogram[&MatchQuality::Excellent], 1);
        assert_eq!(kpi.quality_histogram[&MatchQuality::Good], 1);
        assert_eq!(kpi.quality_histogram[&MatchQuality::Acceptable], 1);
        assert!(!kpi.quality_histogram.contains_key(&MatchQuality::Poor));
    }

    #[test]
    fn test_lecturer_load_and_days() {
        let (timetable, sections) = sample();
        let kpi = TimetableKpi::calculate(&timetable, &sections, 4, 12);
        assert_eq!(kpi.load_by_lecturer["L1"], 6);
        assert_eq!(kpi.load_by_lecturer["L2"], 4);
        assert_eq!(kpi.days_by_lecturer["L1"], 2);
        assert_eq!(kpi.days_by_lecturer["L2"], 1);
    }

    #[test]
    fn test_band_misses() {
        let (timetable, sections) = sample();
        let kpi = TimetableKpi::calculate(&timetable, &sections, 5, 12);
        assert_eq!(kpi.band_misses, vec!["L2".to_string()]);
        assert!(!kpi.meets_thresholds(0.5, 50.0));

        let kpi = TimetableKpi::calculate(&timetable, &sections, 4, 12);
        assert!(kpi.band_misses.is_empty());
        assert!(kpi.meets_thresholds(0.7, 70.0));
        assert!(!kpi.meets_thresholds(0.9, 70.0));
    }

    #[test]
    fn test_empty_inputs() {
        let kpi = TimetableKpi::calculate(&Timetable::new(), &[], 4, 12);
        assert!((kpi.placement_rate - 1.0).abs() < 1e-9);
        assert_eq!(kpi.mean_preference_score, 0.0);
        assert!(kpi.band_misses.is_empty());
    }
}
