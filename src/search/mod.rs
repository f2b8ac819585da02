//! Population-based stochastic search.
//!
//! A small, generic genetic-algorithm runner used by both generator
//! phases: tournament selection, elitism, pluggable crossover/mutation
//! via [`GaProblem`], optional parallel fitness evaluation, and a
//! generation plus wall-clock budget. The runner always returns the best
//! individual found so far; budget exhaustion is not an error.
//!
//! Minimization convention: lower fitness = better candidate.

mod ga;

pub use ga::{GaConfig, GaProblem, GaResult, GaRunner, Individual};
