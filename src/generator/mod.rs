//! Section generator.
//!
//! Two sequential stochastic-search phases over one GA runner:
//!
//! 1. **Phase A** ([`assignment`]): which lecturers teach which courses,
//!    1-3 lecturers per course from its opt-in pool, 2-3 courses per
//!    lecturer via penalties.
//! 2. **Phase B** ([`load`]): how many sections each (lecturer, course)
//!    pair produces, landing every lecturer's credit load in the target
//!    band, with a deterministic repair pass as backstop.
//!
//! The generator never blocks: it aborts only when no assignment can
//! exist at all, and otherwise returns a best-effort result, logging
//! lecturers still outside the load band for operator review.

mod assignment;
mod load;

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::models::{Course, Lecturer, Section};
use crate::search::{GaConfig, GaRunner};
use crate::validation::validate_input;

pub use assignment::{AssignmentChromosome, AssignmentProblem};
pub use load::{LoadChromosome, LoadProblem, PairInfo};

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Credit-load floor per teaching lecturer.
    pub min_load: u32,
    /// Credit-load ceiling (per-lecturer `max_load` caps below this).
    pub max_load: u32,
    /// Preferred load inside the band.
    pub target_load: u32,
    /// GA settings for Phase A.
    pub phase_a: GaConfig,
    /// GA settings for Phase B.
    pub phase_b: GaConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_load: 8,
            max_load: 12,
            target_load: 10,
            phase_a: GaConfig::default()
                .with_population_size(40)
                .with_max_generations(120)
                .with_parallel(true),
            phase_b: GaConfig::default()
                .with_population_size(60)
                .with_max_generations(150)
                .with_parallel(true),
        }
    }
}

impl GeneratorConfig {
    /// Seeds both phases for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.phase_a = self.phase_a.with_seed(seed);
        self.phase_b = self.phase_b.with_seed(seed.wrapping_add(1));
        self
    }
}

/// A lecturer left outside the load band after best-effort repair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadViolation {
    /// The affected lecturer.
    pub lecturer_id: String,
    /// Total scheduled credit load.
    pub total_load: u32,
}

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Generated sections, one per (lecturer, course, index).
    pub sections: Vec<Section>,
    /// Load-band misses for operator review.
    pub violations: Vec<LoadViolation>,
}

/// Search-based section/lecturer assignment generator.
#[derive(Debug, Clone, Default)]
pub struct SectionGenerator {
    config: GeneratorConfig,
}

impl SectionGenerator {
    /// Creates a generator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with explicit settings.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Runs both phases and materializes sections.
    pub fn generate(
        &self,
        courses: &[Course],
        lecturers: &[Lecturer],
    ) -> Result<GenerationOutcome, ScheduleError> {
        validate_input(courses, lecturers).map_err(ScheduleError::InvalidInput)?;
        if courses.is_empty() || lecturers.is_empty() {
            return Err(ScheduleError::NoEligibleAssignment);
        }

        let lecturer_index: HashMap<&str, usize> = lecturers
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id.as_str(), i))
            .collect();

        // Eligible pool per course: opted-in lecturers, or everyone.
        let pools: Vec<Vec<usize>> = courses
            .iter()
            .map(|c| {
                if c.selected_by.is_empty() {
                    (0..lecturers.len()).collect()
                } else {
                    c.selected_by
                        .iter()
                        .filter_map(|id| lecturer_index.get(id.as_str()).copied())
                        .collect()
                }
            })
            .collect();
        if pools.iter().all(|p| p.is_empty()) {
            return Err(ScheduleError::NoEligibleAssignment);
        }

        info!(
            "generating sections for {} courses, {} lecturers",
            courses.len(),
            lecturers.len()
        );

        // Phase A: lecturer <-> course assignment.
        let assignment_problem = AssignmentProblem {
            pools: &pools,
            lecturer_count: lecturers.len(),
        };
        let assignment = GaRunner::run(&assignment_problem, &self.config.phase_a);
        debug!(
            "phase A done: penalty {:.1} after {} generations",
            assignment.best_fitness, assignment.generations
        );

        // Phase B: section count per (lecturer, course) pair.
        let mut pairs = Vec::new();
        for (course_idx, subset) in assignment.best.genes.iter().enumerate() {
            for &lecturer_idx in subset {
                pairs.push(PairInfo {
                    lecturer_idx,
                    course_idx,
                    credit_hours: courses[course_idx].credit_hours,
                });
            }
        }

        let max_load: Vec<u32> = lecturers
            .iter()
            .map(|l| self.config.max_load.min(l.preferences.max_load as u32))
            .collect();
        let load_problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: lecturers.len(),
            min_load: self.config.min_load,
            max_load: &max_load,
            target_load: self.config.target_load,
        };
        let counts = GaRunner::run(&load_problem, &self.config.phase_b);
        debug!(
            "phase B done: penalty {:.1} after {} generations",
            counts.best_fitness, counts.generations
        );

        let sections = materialize_sections(courses, lecturers, &pairs, &counts.best.counts);

        // Report lecturers still outside the band after best-effort repair.
        let loads = load_problem.loads(&counts.best.counts);
        let mut violations = Vec::new();
        for (idx, &load) in loads.iter().enumerate() {
            if load == 0 {
                continue;
            }
            if load < self.config.min_load || load > max_load[idx] {
                warn!(
                    "lecturer {} load {} outside band [{}, {}]",
                    lecturers[idx].id, load, self.config.min_load, max_load[idx]
                );
                violations.push(LoadViolation {
                    lecturer_id: lecturers[idx].id.clone(),
                    total_load: load,
                });
            }
        }

        info!(
            "generated {} sections ({} load violations)",
            sections.len(),
            violations.len()
        );
        Ok(GenerationOutcome {
            sections,
            violations,
        })
    }
}

/// Turns pair counts into concrete `Section` records with sequential
/// labels: lecturer slot letter (A, B, C per course) plus section index.
fn materialize_sections(
    courses: &[Course],
    lecturers: &[Lecturer],
    pairs: &[PairInfo],
    counts: &[u8],
) -> Vec<Section> {
    // Pairs grouped by course, keeping Phase A lecturer order.
    let mut by_course: HashMap<usize, Vec<(usize, u8)>> = HashMap::new();
    for (pair, &count) in pairs.iter().zip(counts) {
        by_course
            .entry(pair.course_idx)
            .or_default()
            .push((pair.lecturer_idx, count));
    }

    let mut sections = Vec::new();
    for (course_idx, course) in courses.iter().enumerate() {
        let Some(assigned) = by_course.get(&course_idx) else {
            continue;
        };
        for (slot, &(lecturer_idx, count)) in assigned.iter().enumerate() {
            let letter = (b'A' + slot as u8) as char;
            for index in 1..=count {
                let label = format!("{letter}{index}");
                sections.push(
                    Section::new(
                        format!("{}-{label}", course.id),
                        &course.id,
                        course.credit_hours,
                        &lecturers[lecturer_idx].id,
                        label,
                    )
                    .with_lab(course.is_lab)
                    .with_online(course.is_online),
                );
            }
        }
    }
    sections
}
