//! Bounded global minimisation by differential evolution (`best1bin`).
//!
//! The search runs in the unit hypercube and scales candidates onto the bounds only when
//! calling the cost function. Each generation builds one trial vector per population member,
//! evaluates them all (in parallel with the `parallel` feature), then keeps every trial which
//! is no worse than its parent.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{TuneError, TuneResult};

/// Settings for [`differential_evolution`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferentialEvolutionOptions {
    /// Maximum number of generations.
    pub max_iterations: usize,
    /// Population size as a multiple of the number of parameters.
    pub popsize: usize,
    /// Relative convergence tolerance on the spread of population energies.
    pub tol: f64,
    /// Absolute convergence tolerance on the spread of population energies.
    pub atol: f64,
    /// Range the differential weight is drawn from each generation. Equal ends disable dither.
    pub mutation: (f64, f64),
    /// Probability of taking each coordinate from the mutant.
    pub recombination: f64,
    /// Seed for reproducible searches, random if absent.
    pub seed: Option<u64>,
}

impl Default for DifferentialEvolutionOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            popsize: 15,
            tol: 0.01,
            atol: 0.0,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            seed: None,
        }
    }
}

impl DifferentialEvolutionOptions {
    /// Check the settings describe a runnable search.
    pub fn validate(&self) -> TuneResult<()> {
        if self.max_iterations == 0 {
            return Err(TuneError::Optimizer("max_iterations must be > 0".into()));
        }
        if self.popsize == 0 {
            return Err(TuneError::Optimizer("popsize must be > 0".into()));
        }
        if !(self.tol >= 0.0 && self.atol >= 0.0) {
            return Err(TuneError::Optimizer("tolerances must be >= 0".into()));
        }
        let (lo, hi) = self.mutation;
        if !(0.0 <= lo && lo <= hi && hi < 2.0) {
            return Err(TuneError::Optimizer(format!(
                "mutation range ({}, {}) must satisfy 0 <= lo <= hi < 2",
                lo, hi
            )));
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(TuneError::Optimizer(
                "recombination must be in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    /// Best parameters found.
    pub x: Vec<f64>,
    /// Cost at `x`.
    pub fun: f64,
    /// Generations run.
    pub nit: usize,
    /// Cost function evaluations.
    pub nfev: usize,
    /// Whether the population converged before the generation cap.
    pub success: bool,
    /// Why the search stopped.
    pub message: String,
    /// Best cost after initialisation and after each generation.
    pub history: Vec<f64>,
}

/// Minimise `cost` over the box `bounds`. The first error returned by `cost` aborts the search.
pub fn differential_evolution<F>(
    cost: F,
    bounds: &[(f64, f64)],
    options: &DifferentialEvolutionOptions,
) -> TuneResult<OptimizeResult>
where
    F: Fn(&[f64]) -> TuneResult<f64> + Sync,
{
    validate_bounds(bounds)?;
    options.validate()?;

    let dim = bounds.len();
    let pop_size = (options.popsize * dim).max(5);
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut population = latin_hypercube(pop_size, dim, &mut rng);
    let mut energies = evaluate(&cost, &population, bounds)?;
    let mut nfev = pop_size;
    let mut best = argmin(&energies);
    let mut history = vec![energies[best]];
    debug!(pop_size, dim, best = energies[best], "population initialised");

    // Convergence is only tested after a generation has run.
    let mut converged = false;
    let mut nit = 0;
    while !converged && nit < options.max_iterations {
        nit += 1;
        let (lo, hi) = options.mutation;
        let weight = if hi > lo { rng.gen_range(lo..hi) } else { lo };

        let trials = (0..pop_size)
            .map(|i| {
                mutate_and_cross(
                    i,
                    &population,
                    best,
                    weight,
                    options.recombination,
                    &mut rng,
                )
            })
            .collect::<Vec<_>>();
        let trial_energies = evaluate(&cost, &trials, bounds)?;
        nfev += pop_size;

        for (i, (trial, energy)) in trials.into_iter().zip(trial_energies).enumerate() {
            if energy <= energies[i] {
                population[i] = trial;
                energies[i] = energy;
            }
        }
        best = argmin(&energies);
        history.push(energies[best]);
        debug!(generation = nit, weight, best = energies[best], "generation complete");

        converged = has_converged(&energies, options);
    }

    let message = if converged {
        "population energies converged".to_string()
    } else {
        warn!(
            max_iterations = options.max_iterations,
            "search stopped at the generation cap"
        );
        "maximum number of iterations reached".to_string()
    };
    let result = OptimizeResult {
        x: scale(&population[best], bounds),
        fun: energies[best],
        nit,
        nfev,
        success: converged,
        message,
        history,
    };
    info!(fun = result.fun, nit, nfev, success = converged, "search finished");
    Ok(result)
}

fn validate_bounds(bounds: &[(f64, f64)]) -> TuneResult<()> {
    if bounds.is_empty() {
        return Err(TuneError::InvalidBounds("no parameters to search".into()));
    }
    for (i, &(lo, hi)) in bounds.iter().enumerate() {
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(TuneError::InvalidBounds(format!(
                "bound {} is not finite: ({}, {})",
                i, lo, hi
            )));
        }
        if lo >= hi {
            return Err(TuneError::InvalidBounds(format!(
                "bound {} has lower >= upper: ({}, {})",
                i, lo, hi
            )));
        }
    }
    Ok(())
}

/// One stratified sample per population member in every dimension, with the strata shuffled
/// independently per dimension.
fn latin_hypercube(pop_size: usize, dim: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let segment = 1.0 / pop_size as f64;
    let mut population = vec![vec![0.0; dim]; pop_size];
    for j in 0..dim {
        let mut column = (0..pop_size)
            .map(|i| segment * (i as f64 + rng.gen::<f64>()))
            .collect::<Vec<_>>();
        column.shuffle(rng);
        population
            .iter_mut()
            .zip(column)
            .for_each(|(member, v)| member[j] = v);
    }
    population
}

/// `best + weight * (a - b)` for two random members other than `i`, crossed with member `i`.
fn mutate_and_cross(
    i: usize,
    population: &[Vec<f64>],
    best: usize,
    weight: f64,
    recombination: f64,
    rng: &mut StdRng,
) -> Vec<f64> {
    let mut donors = rand::seq::index::sample(rng, population.len(), 3)
        .into_iter()
        .filter(|&k| k != i);
    // At least two of three distinct indices differ from `i`.
    let (a, b) = match (donors.next(), donors.next()) {
        (Some(a), Some(b)) => (a, b),
        _ => unreachable!("population has at least 5 members"),
    };

    let dim = population[i].len();
    let fill_point = rng.gen_range(0..dim);
    let mut trial = population[i].clone();
    for j in 0..dim {
        if j == fill_point || rng.gen::<f64>() < recombination {
            trial[j] = population[best][j] + weight * (population[a][j] - population[b][j]);
        }
        if !(0.0..=1.0).contains(&trial[j]) {
            trial[j] = rng.gen::<f64>();
        }
    }
    trial
}

fn scale(unit: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    unit.iter()
        .zip(bounds)
        .map(|(u, (lo, hi))| lo + u * (hi - lo))
        .collect()
}

fn evaluate<F>(cost: &F, population: &[Vec<f64>], bounds: &[(f64, f64)]) -> TuneResult<Vec<f64>>
where
    F: Fn(&[f64]) -> TuneResult<f64> + Sync,
{
    let energy = |unit: &Vec<f64>| -> TuneResult<f64> {
        let e = cost(&scale(unit, bounds))?;
        Ok(if e.is_nan() { f64::INFINITY } else { e })
    };
    #[cfg(feature = "parallel")]
    let energies = population.par_iter().map(energy).collect();
    #[cfg(not(feature = "parallel"))]
    let energies = population.iter().map(energy).collect();
    energies
}

fn argmin(energies: &[f64]) -> usize {
    energies
        .iter()
        .enumerate()
        .fold(0, |best, (i, e)| if *e < energies[best] { i } else { best })
}

fn has_converged(energies: &[f64], options: &DifferentialEvolutionOptions) -> bool {
    if energies.iter().any(|e| !e.is_finite()) {
        return false;
    }
    let n = energies.len() as f64;
    let mean = energies.iter().sum::<f64>() / n;
    let std = (energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n).sqrt();
    std <= options.atol + options.tol * mean.abs()
}
