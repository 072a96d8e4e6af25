//! Scalar distances between a candidate circuit and the ideal Toffoli gate.
//!
//! Every cost is zero for the ideal gate and grows as the candidate drifts away from it. Costs
//! accept anything implementing [`CircuitSource`], so they can be handed straight to the
//! optimizer as functions of the task angles.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::circuits::{toffoli, CircuitSource};
use crate::errors::{TuneError, TuneResult};
use crate::linalg::{dagger, frobenius, identity, trace};
use crate::simulate::{basis_label, unitary, MeasuredCircuit, Probabilities, SimulationMode};

/// The available cost functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    /// `1 - |Tr(T^dagger U)| / d`.
    TraceOverlap,
    /// `||T - U||_F`.
    #[serde(rename = "frobenius_norm")]
    Frobenius,
    /// `||T U^dagger - I||_F / 2`.
    TraceNorm,
    /// Mean total variation of output distributions over all classical inputs.
    CountComparison,
}

impl CostFunction {
    /// Every cost function.
    pub const ALL: [CostFunction; 4] = [
        CostFunction::TraceOverlap,
        CostFunction::Frobenius,
        CostFunction::TraceNorm,
        CostFunction::CountComparison,
    ];

    /// Evaluate the cost of `source`. `mode` only affects [`CostFunction::CountComparison`].
    pub fn evaluate<S>(&self, source: &S, mode: SimulationMode) -> TuneResult<f64>
    where
        S: CircuitSource + ?Sized,
    {
        match self {
            CostFunction::TraceOverlap => trace_overlap_cost(source),
            CostFunction::Frobenius => frobenius_norm(source),
            CostFunction::TraceNorm => trace_norm(source),
            CostFunction::CountComparison => count_comparison_with(source, mode),
        }
    }

    /// Name used in configuration and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            CostFunction::TraceOverlap => "trace_overlap",
            CostFunction::Frobenius => "frobenius_norm",
            CostFunction::TraceNorm => "trace_norm",
            CostFunction::CountComparison => "count_comparison",
        }
    }
}

impl fmt::Display for CostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CostFunction {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CostFunction::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| {
                let names = CostFunction::ALL.map(|c| c.name()).join(", ");
                TuneError::InvalidParameters(format!(
                    "unknown cost function {:?}, expected one of {}",
                    s, names
                ))
            })
    }
}

/// One minus the normalised trace overlap with the Toffoli gate.
pub fn trace_overlap_cost<S: CircuitSource + ?Sized>(source: &S) -> TuneResult<f64> {
    let (ideal, u) = unitaries(source)?;
    let d = ideal.nrows() as f64;
    let overlap = trace(&dagger(&ideal).dot(&u));
    Ok(1.0 - overlap.norm() / d)
}

/// Frobenius distance between the Toffoli unitary and the candidate unitary.
pub fn frobenius_norm<S: CircuitSource + ?Sized>(source: &S) -> TuneResult<f64> {
    let (ideal, u) = unitaries(source)?;
    Ok(frobenius(&(&ideal - &u)))
}

/// Half the Frobenius distance of `T U^dagger` from the identity.
pub fn trace_norm<S: CircuitSource + ?Sized>(source: &S) -> TuneResult<f64> {
    let (ideal, u) = unitaries(source)?;
    let residual = ideal.dot(&dagger(&u)) - identity(ideal.nrows());
    Ok(0.5 * frobenius(&residual))
}

/// [`count_comparison_with`] using exact outcome distributions.
pub fn count_comparison<S: CircuitSource + ?Sized>(source: &S) -> TuneResult<f64> {
    count_comparison_with(source, SimulationMode::Exact)
}

/// Run every classical input through both the Toffoli gate and the candidate, and average the
/// summed absolute differences of their output distributions.
pub fn count_comparison_with<S: CircuitSource + ?Sized>(
    source: &S,
    mode: SimulationMode,
) -> TuneResult<f64> {
    let circuit = source.to_circuit()?;
    let ideal_counts = run_all_inputs(&toffoli(), mode)?;
    let counts = run_all_inputs(&circuit, mode)?;

    let mut total_cost = 0.0;
    for (input, ideal_probs) in &ideal_counts {
        let probs = counts.get(input).ok_or_else(|| TuneError::DimensionMismatch {
            expected: ideal_counts.len(),
            found: counts.len(),
        })?;
        let outcomes = ideal_probs.keys().chain(probs.keys()).collect::<BTreeSet<_>>();
        total_cost += outcomes
            .into_iter()
            .map(|o| {
                let p_ideal = ideal_probs.get(o).copied().unwrap_or(0.0);
                let p = probs.get(o).copied().unwrap_or(0.0);
                (p_ideal - p).abs()
            })
            .sum::<f64>();
    }
    Ok(total_cost / ideal_counts.len() as f64)
}

/// Output distribution for every classical input of a 3 qubit circuit, keyed by input label.
pub fn run_all_inputs(
    circuit: &Circuit,
    mode: SimulationMode,
) -> TuneResult<BTreeMap<String, Probabilities>> {
    let n = toffoli().num_qubits();
    check_size(circuit, n)?;
    let mut sim = MeasuredCircuit::new(circuit, mode)?;
    (0..1usize << n)
        .map(|input| -> TuneResult<(String, Probabilities)> {
            Ok((basis_label(input, n), sim.run(input)?))
        })
        .collect()
}

fn check_size(circuit: &Circuit, expected: usize) -> TuneResult<()> {
    if circuit.num_qubits() == expected {
        Ok(())
    } else {
        Err(TuneError::DimensionMismatch {
            expected,
            found: circuit.num_qubits(),
        })
    }
}

fn unitaries<S: CircuitSource + ?Sized>(
    source: &S,
) -> TuneResult<(Array2<Complex64>, Array2<Complex64>)> {
    let ideal = toffoli();
    let circuit = source.to_circuit()?;
    check_size(&circuit, ideal.num_qubits())?;
    Ok((unitary(&ideal)?, unitary(&circuit)?))
}
