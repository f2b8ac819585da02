//! Phase B: section counts per (lecturer, course) pair.
//!
//! Chromosome: one integer per pair, sections to create. The penalty is
//! quartic outside the credit-load band, so infeasible loads dominate
//! every other signal; inside the band a small term pulls toward the
//! target load. A deterministic repair pass nudges the most flexible
//! pair until each lecturer is back in band or an iteration cap hits.

use rand::Rng;

use crate::search::{GaProblem, Individual};

/// Mutation/creation range for pair counts.
const COUNT_MIN: u8 = 1;
const COUNT_MAX: u8 = 4;
/// Repair may push a pair up to this many sections.
const REPAIR_COUNT_MAX: u8 = 5;
/// Repair iteration cap per lecturer.
const REPAIR_ITERATIONS: usize = 32;

/// Weight of the distance-to-target term inside the band.
const TARGET_PULL: f64 = 2.0;

/// One (lecturer, course) assignment produced by Phase A.
#[derive(Debug, Clone)]
pub struct PairInfo {
    /// Index into the lecturer list.
    pub lecturer_idx: usize,
    /// Index into the course list.
    pub course_idx: usize,
    /// Credit hours of the course.
    pub credit_hours: u8,
}

/// Section count per pair.
#[derive(Debug, Clone)]
pub struct LoadChromosome {
    /// `counts[pair]` = sections to create for that pair.
    pub counts: Vec<u8>,
    fitness: f64,
}

impl Individual for LoadChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

/// GA problem for Phase B.
pub struct LoadProblem<'a> {
    /// Pairs from Phase A.
    pub pairs: &'a [PairInfo],
    /// Total number of lecturers.
    pub lecturer_count: usize,
    /// Load-band floor.
    pub min_load: u32,
    /// Per-lecturer load-band ceiling.
    pub max_load: &'a [u32],
    /// Preferred load inside the band.
    pub target_load: u32,
}

impl LoadProblem<'_> {
    /// Total credit load per lecturer for a given count vector.
    pub fn loads(&self, counts: &[u8]) -> Vec<u32> {
        let mut loads = vec![0u32; self.lecturer_count];
        for (pair, &count) in self.pairs.iter().zip(counts) {
            loads[pair.lecturer_idx] += pair.credit_hours as u32 * count as u32;
        }
        loads
    }

    fn lecturer_has_pairs(&self, lecturer: usize) -> bool {
        self.pairs.iter().any(|p| p.lecturer_idx == lecturer)
    }
}

impl GaProblem for LoadProblem<'_> {
    type Individual = LoadChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> LoadChromosome {
        LoadChromosome {
            counts: (0..self.pairs.len())
                .map(|_| rng.random_range(COUNT_MIN..=COUNT_MAX))
                .collect(),
            fitness: f64::INFINITY,
        }
    }

    fn evaluate(&self, individual: &LoadChromosome) -> f64 {
        let loads = self.loads(&individual.counts);
        let mut penalty = 0.0;
        for (lecturer, &load) in loads.iter().enumerate() {
            if !self.lecturer_has_pairs(lecturer) {
                continue;
            }
            let max = self.max_load[lecturer];
            if load < self.min_load {
                penalty += f64::from(self.min_load - load).powi(4);
            } else if load > max {
                penalty += f64::from(load - max).powi(4);
            } else {
                penalty += f64::from(load.abs_diff(self.target_load)) * TARGET_PULL;
            }
        }
        penalty
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &LoadChromosome,
        parent2: &LoadChromosome,
        rng: &mut R,
    ) -> (LoadChromosome, LoadChromosome) {
        let len = self.pairs.len();
        let mut child1 = parent1.clone();
        let mut child2 = parent2.clone();
        if len >= 2 {
            let mut i = rng.random_range(0..len);
            let mut j = rng.random_range(0..len);
            if i > j {
                std::mem::swap(&mut i, &mut j);
            }
            for k in i..=j {
                std::mem::swap(&mut child1.counts[k], &mut child2.counts[k]);
            }
        }
        child1.fitness = f64::INFINITY;
        child2.fitness = f64::INFINITY;
        (child1, child2)
    }

    fn mutate<R: Rng>(&self, individual: &mut LoadChromosome, rng: &mut R) {
        let idx = rng.random_range(0..individual.counts.len());
        let count = &mut individual.counts[idx];
        if rng.random_bool(0.5) {
            *count = (*count + 1).min(COUNT_MAX);
        } else {
            *count = count.saturating_sub(1).max(COUNT_MIN);
        }
    }

    /// Nudges each out-of-band lecturer back toward the band.
    ///
    /// Under-loaded: bump the smallest-credit pair (finest increment).
    /// Over-loaded: drop the largest-credit pair still above one section.
    fn repair(&self, individual: &mut LoadChromosome) {
        for lecturer in 0..self.lecturer_count {
            if !self.lecturer_has_pairs(lecturer) {
                continue;
            }
            let max = self.max_load[lecturer];
            for _ in 0..REPAIR_ITERATIONS {
                let load = self.loads(&individual.counts)[lecturer];
                if load < self.min_load {
                    let candidate = self
                        .pairs
                        .iter()
                        .enumerate()
                        .filter(|(i, p)| {
                            p.lecturer_idx == lecturer
                                && individual.counts[*i] < REPAIR_COUNT_MAX
                        })
                        .min_by_key(|(i, p)| (p.credit_hours, *i))
                        .map(|(i, _)| i);
                    match candidate {
                        Some(i) => individual.counts[i] += 1,
                        None => break,
                    }
                } else if load > max {
                    let candidate = self
                        .pairs
                        .iter()
                        .enumerate()
                        .filter(|(i, p)| {
                            p.lecturer_idx == lecturer && individual.counts[*i] > COUNT_MIN
                        })
                        .max_by_key(|(i, p)| (p.credit_hours, usize::MAX - *i))
                        .map(|(i, _)| i);
                    match candidate {
                        Some(i) => individual.counts[i] -= 1,
                        None => break,
                    }
                } else {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{GaConfig, GaRunner};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn pair(lecturer_idx: usize, course_idx: usize, credit_hours: u8) -> PairInfo {
        PairInfo {
            lecturer_idx,
            course_idx,
            credit_hours,
        }
    }

    #[test]
    fn test_loads_accumulate_per_lecturer() {
        let pairs = vec![pair(0, 0, 3), pair(0, 1, 2), pair(1, 0, 3)];
        let max = vec![12, 12];
        let problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: 2,
            min_load: 8,
            max_load: &max,
            target_load: 10,
        };
        let loads = problem.loads(&[2, 1, 3]);
        assert_eq!(loads, vec![8, 9]);
    }

    #[test]
    fn test_out_of_band_penalty_dominates() {
        let pairs = vec![pair(0, 0, 3)];
        let max = vec![12];
        let problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: 1,
            min_load: 8,
            max_load: &max,
            target_load: 10,
        };
        let under = LoadChromosome {
            counts: vec![1], // load 3, shortfall 5 → 5^4
            fitness: f64::INFINITY,
        };
        let in_band = LoadChromosome {
            counts: vec![3], // load 9
            fitness: f64::INFINITY,
        };
        assert_eq!(problem.evaluate(&under), 625.0);
        assert_eq!(problem.evaluate(&in_band), 2.0); // |9-10| * 2
        assert!(problem.evaluate(&in_band) < problem.evaluate(&under));
    }

    #[test]
    fn test_repair_fixes_underload() {
        let pairs = vec![pair(0, 0, 2), pair(0, 1, 3)];
        let max = vec![12];
        let problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: 1,
            min_load: 8,
            max_load: &max,
            target_load: 10,
        };
        let mut ind = LoadChromosome {
            counts: vec![1, 1], // load 5
            fitness: f64::INFINITY,
        };
        problem.repair(&mut ind);
        let load = problem.loads(&ind.counts)[0];
        assert!((8..=12).contains(&load), "load {load} not in band");
        // Smallest-credit pair bumps first.
        assert!(ind.counts[0] > 1);
    }

    #[test]
    fn test_repair_fixes_overload() {
        let pairs = vec![pair(0, 0, 3), pair(0, 1, 3)];
        let max = vec![12];
        let problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: 1,
            min_load: 8,
            max_load: &max,
            target_load: 10,
        };
        let mut ind = LoadChromosome {
            counts: vec![4, 4], // load 24
            fitness: f64::INFINITY,
        };
        problem.repair(&mut ind);
        let load = problem.loads(&ind.counts)[0];
        assert!((8..=12).contains(&load), "load {load} not in band");
    }

    #[test]
    fn test_repair_caps_at_five_sections() {
        // One 1-credit pair can never reach min load 8 within the cap of 5.
        let pairs = vec![pair(0, 0, 1)];
        let max = vec![12];
        let problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: 1,
            min_load: 8,
            max_load: &max,
            target_load: 10,
        };
        let mut ind = LoadChromosome {
            counts: vec![1],
            fitness: f64::INFINITY,
        };
        problem.repair(&mut ind);
        assert_eq!(ind.counts[0], 5); // best effort, bounded
    }

    #[test]
    fn test_mutation_stays_bounded() {
        let pairs = vec![pair(0, 0, 3), pair(1, 1, 2)];
        let max = vec![12, 12];
        let problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: 2,
            min_load: 8,
            max_load: &max,
            target_load: 10,
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ind = problem.create_individual(&mut rng);
        for _ in 0..200 {
            problem.mutate(&mut ind, &mut rng);
            for &c in &ind.counts {
                assert!((COUNT_MIN..=COUNT_MAX).contains(&c));
            }
        }
    }

    #[test]
    fn test_search_lands_in_band() {
        // Two lecturers, mixed credits.
        let pairs = vec![pair(0, 0, 3), pair(0, 1, 2), pair(1, 1, 2), pair(1, 2, 3)];
        let max = vec![12, 12];
        let problem = LoadProblem {
            pairs: &pairs,
            lecturer_count: 2,
            min_load: 8,
            max_load: &max,
            target_load: 10,
        };
        let config = GaConfig::default()
            .with_population_size(30)
            .with_max_generations(60)
            .with_seed(42);

        let result = GaRunner::run(&problem, &config);
        let loads = problem.loads(&result.best.counts);
        for load in loads {
            assert!((8..=12).contains(&load), "load {load} not in band");
        }
    }
}
