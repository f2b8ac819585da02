//! Phase A: lecturer-to-course assignment search.
//!
//! Chromosome: per course, a subset (1-3) of that course's eligible
//! pool: the lecturers who opted in, or everyone when nobody did. The
//! penalty pushes toward every lecturer carrying 2-3 courses.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::search::{GaProblem, Individual};

/// Penalty for a lecturer left without any course.
const PENALTY_NO_COURSE: f64 = 1_000.0;
/// Penalty for a lecturer with a single course.
const PENALTY_ONE_COURSE: f64 = 100.0;
/// Penalty per course beyond the third.
const PENALTY_EXCESS_COURSE: f64 = 200.0;

/// Per-course lecturer subsets, indices into the lecturer list.
#[derive(Debug, Clone)]
pub struct AssignmentChromosome {
    /// `genes[course] = lecturer indices teaching that course` (1-3, sorted).
    pub genes: Vec<Vec<usize>>,
    fitness: f64,
}

impl Individual for AssignmentChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

/// GA problem for Phase A.
pub struct AssignmentProblem<'a> {
    /// Eligible lecturer indices per course.
    pub pools: &'a [Vec<usize>],
    /// Total number of lecturers.
    pub lecturer_count: usize,
}

impl AssignmentProblem<'_> {
    fn random_subset<R: Rng>(&self, pool: &[usize], rng: &mut R) -> Vec<usize> {
        let size = rng.random_range(1..=pool.len().min(3));
        let mut subset: Vec<usize> = pool.choose_multiple(rng, size).copied().collect();
        subset.sort_unstable();
        subset
    }
}

impl GaProblem for AssignmentProblem<'_> {
    type Individual = AssignmentChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> AssignmentChromosome {
        AssignmentChromosome {
            genes: self
                .pools
                .iter()
                .map(|pool| self.random_subset(pool, rng))
                .collect(),
            fitness: f64::INFINITY,
        }
    }

    fn evaluate(&self, individual: &AssignmentChromosome) -> f64 {
        let mut courses_per_lecturer = vec![0usize; self.lecturer_count];
        for subset in &individual.genes {
            for &lecturer in subset {
                courses_per_lecturer[lecturer] += 1;
            }
        }

        let mut penalty = 0.0;
        for &count in &courses_per_lecturer {
            match count {
                0 => penalty += PENALTY_NO_COURSE,
                1 => penalty += PENALTY_ONE_COURSE,
                2 | 3 => {}
                n => penalty += PENALTY_EXCESS_COURSE * (n - 3) as f64,
            }
        }
        penalty
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &AssignmentChromosome,
        parent2: &AssignmentChromosome,
        rng: &mut R,
    ) -> (AssignmentChromosome, AssignmentChromosome) {
        let len = self.pools.len();
        let mut child1 = parent1.clone();
        let mut child2 = parent2.clone();
        if len >= 2 {
            // Two-point crossover on the course axis.
            let mut i = rng.random_range(0..len);
            let mut j = rng.random_range(0..len);
            if i > j {
                std::mem::swap(&mut i, &mut j);
            }
            for k in i..=j {
                std::mem::swap(&mut child1.genes[k], &mut child2.genes[k]);
            }
        }
        child1.fitness = f64::INFINITY;
        child2.fitness = f64::INFINITY;
        (child1, child2)
    }

    fn mutate<R: Rng>(&self, individual: &mut AssignmentChromosome, rng: &mut R) {
        let course = rng.random_range(0..self.pools.len());
        individual.genes[course] = self.random_subset(&self.pools[course], rng);
    }
}
