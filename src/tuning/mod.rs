//! Searching the task angles for the best approximation of a Toffoli gate.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::circuits::{task_circuit, toffoli, TaskAngles};
use crate::config::Config;
use crate::cost::CostFunction;
use crate::equivalence::operator_equiv;
use crate::errors::TuneResult;

pub use self::differential_evolution::*;

mod differential_evolution;

/// One search of the task angles under a single cost function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningRun {
    /// Cost function minimised.
    pub cost_function: CostFunction,
    /// Best angles found.
    pub angles: TaskAngles,
    /// Cost at `angles`.
    pub cost: f64,
    /// Wall-clock time of the search.
    pub elapsed: Duration,
    /// Raw optimizer output.
    pub result: OptimizeResult,
}

impl TuningRun {
    /// Whether the optimised task circuit matches the Toffoli unitary up to global phase.
    pub fn is_toffoli_equivalent(&self) -> TuneResult<bool> {
        operator_equiv(&task_circuit(&self.angles), &toffoli())
    }
}

/// Run one search per configured cost function and time each of them.
pub fn optimize_angles_and_time(config: &Config) -> TuneResult<Vec<TuningRun>> {
    config.validate()?;
    let mode = config.simulation.mode();
    let bounds = TaskAngles::search_bounds();

    config
        .cost_functions
        .iter()
        .map(|&cost_function| {
            let start = Instant::now();
            let result = differential_evolution(
                |x: &[f64]| cost_function.evaluate(x, mode),
                &bounds,
                &config.optimizer,
            )?;
            let elapsed = start.elapsed();

            let run = TuningRun {
                cost_function,
                angles: TaskAngles::from_slice(&result.x)?,
                cost: result.fun,
                elapsed,
                result,
            };
            info!(
                cost_function = %cost_function,
                cost = run.cost,
                elapsed_secs = elapsed.as_secs_f64(),
                "tuning run finished"
            );
            Ok(run)
        })
        .collect()
}
