//! Generic GA runner.
//!
//! Locally constructed per call: no global registries, no shared state
//! across runs. Fitness evaluation is the only parallel step (rayon);
//! selection and variation stay on the caller's seeded RNG so runs with
//! the same seed order candidates identically.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// A candidate solution with a cached fitness.
///
/// Lower fitness = better (minimization convention).
pub trait Individual: Clone + Send {
    /// Cached fitness value.
    fn fitness(&self) -> f64;
    /// Stores an evaluated fitness.
    fn set_fitness(&mut self, fitness: f64);
}

/// A problem definition for the GA runner.
pub trait GaProblem: Sync {
    /// Chromosome type.
    type Individual: Individual;

    /// Creates a random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Computes the fitness of an individual (lower = better).
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Recombines two parents into two children.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> (Self::Individual, Self::Individual);

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);

    /// Deterministic repair toward hard constraints.
    ///
    /// The runner applies this to every freshly created individual and to
    /// the final best, guaranteeing a best-effort hard-constraint outcome
    /// even when penalty minimization alone would not converge in budget.
    fn repair(&self, _individual: &mut Self::Individual) {}
}

/// GA runner configuration.
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation budget.
    pub max_generations: usize,
    /// Probability of recombining selected parents.
    pub crossover_rate: f64,
    /// Probability of mutating each child.
    pub mutation_rate: f64,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Evaluate fitness in parallel.
    pub parallel: bool,
    /// Optional wall-clock budget. The runner stops between generations.
    pub time_budget: Option<Duration>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            max_generations: 150,
            crossover_rate: 0.9,
            mutation_rate: 0.25,
            tournament_size: 3,
            elite_count: 2,
            seed: None,
            parallel: false,
            time_budget: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets a wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Outcome of one GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual found.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations actually executed.
    pub generations: usize,
}

/// Runs a [`GaProblem`] under a [`GaConfig`].
pub struct GaRunner;

impl GaRunner {
    /// Evolves a population and returns the best individual found.
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> GaResult<P::Individual> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let deadline = config.time_budget.map(|budget| Instant::now() + budget);

        let mut population: Vec<P::Individual> = (0..config.population_size)
            .map(|_| {
                let mut ind = problem.create_individual(&mut rng);
                problem.repair(&mut ind);
                ind
            })
            .collect();
        evaluate_all(problem, &mut population, config.parallel);
        sort_by_fitness(&mut population);

        let mut best = population[0].clone();
        let mut generations = 0;

        for _ in 0..config.max_generations {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            generations += 1;

            let mut next: Vec<P::Individual> = population
                .iter()
                .take(config.elite_count.min(population.len()))
                .cloned()
                .collect();

            while next.len() < config.population_size {
                let p1 = tournament(&population, config.tournament_size, &mut rng);
                let p2 = tournament(&population, config.tournament_size, &mut rng);
                let (mut c1, mut c2) = if rng.random_bool(config.crossover_rate) {
                    problem.crossover(p1, p2, &mut rng)
                } else {
                    (p1.clone(), p2.clone())
                };
                if rng.random_bool(config.mutation_rate) {
                    problem.mutate(&mut c1, &mut rng);
                }
                if rng.random_bool(config.mutation_rate) {
                    problem.mutate(&mut c2, &mut rng);
                }
                next.push(c1);
                if next.len() < config.population_size {
                    next.push(c2);
                }
            }

            evaluate_all(problem, &mut next, config.parallel);
            sort_by_fitness(&mut next);
            if next[0].fitness() < best.fitness() {
                best = next[0].clone();
            }
            population = next;
        }

        // Final repair pass on the best individual, then re-score.
        problem.repair(&mut best);
        let fitness = problem.evaluate(&best);
        best.set_fitness(fitness);

        GaResult {
            best_fitness: best.fitness(),
            best,
            generations,
        }
    }
}

fn evaluate_all<P: GaProblem>(problem: &P, population: &mut [P::Individual], parallel: bool) {
    if parallel {
        population.par_iter_mut().for_each(|ind| {
            let fitness = problem.evaluate(ind);
            ind.set_fitness(fitness);
        });
    } else {
        for ind in population.iter_mut() {
            let fitness = problem.evaluate(ind);
            ind.set_fitness(fitness);
        }
    }
}

fn sort_by_fitness<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| {
        a.fitness()
            .partial_cmp(&b.fitness())
            .unwrap_or(Ordering::Equal)
    });
}

fn tournament<'a, I: Individual, R: Rng>(
    population: &'a [I],
    size: usize,
    rng: &mut R,
) -> &'a I {
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..size.max(1) {
        let challenger = &population[rng.random_range(0..population.len())];
        if challenger.fitness() < best.fitness() {
            best = challenger;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Toy problem: minimize the sum of integer genes in [0, 9].
    #[derive(Debug, Clone)]
    struct SumChromosome {
        genes: Vec<u8>,
        fitness: f64,
    }

    impl Individual for SumChromosome {
        fn fitness(&self) -> f64 {
            self.fitness
        }
        fn set_fitness(&mut self, fitness: f64) {
            self.fitness = fitness;
        }
    }

    struct SumProblem {
        len: usize,
    }

    impl GaProblem for SumProblem {
        type Individual = SumChromosome;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> SumChromosome {
            SumChromosome {
                genes: (0..self.len).map(|_| rng.random_range(0..10)).collect(),
                fitness: f64::INFINITY,
            }
        }

        fn evaluate(&self, ind: &SumChromosome) -> f64 {
            ind.genes.iter().map(|&g| g as f64).sum()
        }

        fn crossover<R: Rng>(
            &self,
            p1: &SumChromosome,
            p2: &SumChromosome,
            rng: &mut R,
        ) -> (SumChromosome, SumChromosome) {
            let cut = rng.random_range(0..self.len);
            let mut c1 = p1.clone();
            let mut c2 = p2.clone();
            for i in cut..self.len {
                c1.genes[i] = p2.genes[i];
                c2.genes[i] = p1.genes[i];
            }
            c1.fitness = f64::INFINITY;
            c2.fitness = f64::INFINITY;
            (c1, c2)
        }

        fn mutate<R: Rng>(&self, ind: &mut SumChromosome, rng: &mut R) {
            let idx = rng.random_range(0..self.len);
            ind.genes[idx] = rng.random_range(0..10);
        }
    }

    #[test]
    fn test_runner_improves_fitness() {
        let problem = SumProblem { len: 12 };
        let config = GaConfig::default()
            .with_population_size(30)
            .with_max_generations(60)
            .with_seed(42);

        let result = GaRunner::run(&problem, &config);
        assert!(result.best_fitness.is_finite());
        // Random genes average ~4.5 each (sum ~54); the GA should get well below.
        assert!(result.best_fitness < 20.0, "fitness {}", result.best_fitness);
        assert_eq!(result.generations, 60);
    }

    #[test]
    fn test_same_seed_same_result() {
        let problem = SumProblem { len: 8 };
        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(25)
            .with_seed(7);

        let a = GaRunner::run(&problem, &config);
        let b = GaRunner::run(&problem, &config);
        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.best.genes, b.best.genes);
    }

    #[test]
    fn test_parallel_evaluation_matches_serial() {
        let problem = SumProblem { len: 10 };
        let serial = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(20)
            .with_seed(11)
            .with_parallel(false);
        let parallel = serial.clone().with_parallel(true);

        let a = GaRunner::run(&problem, &serial);
        let b = GaRunner::run(&problem, &parallel);
        // Evaluation is pure; threading must not change the trajectory.
        assert_eq!(a.best_fitness, b.best_fitness);
    }

    #[test]
    fn test_time_budget_stops_early() {
        let problem = SumProblem { len: 10 };
        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(1_000_000)
            .with_seed(3)
            .with_time_budget(Duration::from_millis(50));

        let result = GaRunner::run(&problem, &config);
        // Budget-bounded: returns best-so-far well before the generation cap.
        assert!(result.generations < 1_000_000);
        assert!(result.best_fitness.is_finite());
    }

    #[test]
    fn test_zero_generations_still_returns_best() {
        let problem = SumProblem { len: 6 };
        let config = GaConfig::default()
            .with_population_size(10)
            .with_max_generations(0)
            .with_seed(9);

        let result = GaRunner::run(&problem, &config);
        assert_eq!(result.generations, 0);
        assert!(result.best_fitness.is_finite());
    }
}
