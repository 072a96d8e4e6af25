//! Lowering of [`Circuit`]s onto `qip`'s [`LocalBuilder`] and extraction of unitaries, states and
//! measurement statistics.
//!
//! Conventions: in state vectors and unitaries qubit 0 is the most significant bit of a basis
//! index, matching `qip`'s kron ordering. Classical inputs and measured outcomes are labelled
//! with qubit 0 as the leftmost character, so the input label `"110"` sets qubits 0 and 1.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use ndarray::Array2;
use num_complex::Complex64;
use num_traits::{One, Zero};
use qip::builder::{LocalBuilder, Measurements, Qudit};
use qip::builder_traits::{
    make_circuit_matrix, CircuitBuilder, CliffordTBuilder, RotationsBuilder,
    StochasticMeasurementBuilder, UnitaryBuilder,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::circuit::{Circuit, Gate};
use crate::errors::{TuneError, TuneResult};

/// How measurement statistics are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SimulationMode {
    /// Use the exact outcome distribution.
    #[default]
    Exact,
    /// Sample `shots` outcomes and report their frequencies.
    Shots {
        /// Number of samples per input.
        shots: u32,
        /// Seed for the sampler, random if absent.
        seed: Option<u64>,
    },
}

/// Outcome distribution keyed by bit string.
pub type Probabilities = BTreeMap<String, f64>;

/// Label for a basis value where bit `i` of `value` is qubit `i`, qubit 0 first.
pub fn basis_label(value: usize, n: usize) -> String {
    (0..n)
        .map(|i| if (value >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// The unitary of `circuit`. Column `j` is the image of basis state `j`.
pub fn unitary(circuit: &Circuit) -> TuneResult<Array2<Complex64>> {
    let n = circuit.num_qubits();
    let (mut b, r) = lower(circuit)?;
    // qip takes the classical input little endian in register order, so column `x` of its
    // matrix is basis state `reverse(x)`.
    let columns = make_circuit_matrix(
        &mut b,
        &r,
        |(state, _): (Vec<Complex64>, Measurements<f64>)| state,
    );
    let d = columns.len();
    Ok(Array2::from_shape_fn((d, d), |(row, col)| {
        columns[reverse_bits(n, col)][row]
    }))
}

/// The state produced by `circuit` from `|0...0>`.
pub fn statevector(circuit: &Circuit) -> TuneResult<Vec<Complex64>> {
    let (mut b, _) = lower(circuit)?;
    let (state, _) = b.calculate_state();
    Ok(state)
}

/// Outcome distribution of measuring every qubit after running `circuit` on the classical
/// input `input`, where bit `i` of `input` is the value of qubit `i`.
pub fn output_probabilities(
    circuit: &Circuit,
    input: usize,
    mode: SimulationMode,
) -> TuneResult<Probabilities> {
    let mut sim = MeasuredCircuit::new(circuit, mode)?;
    sim.run(input)
}

/// A circuit lowered once and followed by a non-collapsing measurement of every qubit, so that
/// it can be run repeatedly on different classical inputs.
pub(crate) struct MeasuredCircuit {
    builder: LocalBuilder<f64>,
    register: Qudit,
    handle: qip::builder::StochasticMeasurementHandle,
    n: usize,
    sampler: Option<(u32, StdRng)>,
}

impl MeasuredCircuit {
    pub(crate) fn new(circuit: &Circuit, mode: SimulationMode) -> TuneResult<Self> {
        let sampler = match mode {
            SimulationMode::Exact => None,
            SimulationMode::Shots { shots: 0, .. } => {
                return Err(TuneError::InvalidParameters(
                    "shot count must be positive".into(),
                ))
            }
            SimulationMode::Shots { shots, seed } => {
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                Some((shots, rng))
            }
        };
        let (mut builder, register) = lower(circuit)?;
        let (register, handle) = builder.measure_stochastic(register);
        Ok(Self {
            builder,
            register,
            handle,
            n: circuit.num_qubits(),
            sampler,
        })
    }

    pub(crate) fn run(&mut self, input: usize) -> TuneResult<Probabilities> {
        if input >> self.n != 0 {
            return Err(TuneError::InvalidParameters(format!(
                "input {:#b} does not fit in {} qubits",
                input, self.n
            )));
        }
        let (_, measured) = self
            .builder
            .calculate_state_with_init([(&self.register, input)]);
        let probs = measured.get_stochastic_measurement(self.handle);
        let probs = match &mut self.sampler {
            None => probs.to_vec(),
            Some((shots, rng)) => sample_frequencies(probs, *shots, rng)?,
        };
        trace!(input = %basis_label(input, self.n), ?probs, "measured");
        Ok(probs
            .into_iter()
            .enumerate()
            .filter(|(_, p)| *p > 0.0)
            .map(|(m, p)| (basis_label(m, self.n), p))
            .collect())
    }
}

fn sample_frequencies(probs: &[f64], shots: u32, rng: &mut StdRng) -> TuneResult<Vec<f64>> {
    let dist = WeightedIndex::new(probs)
        .map_err(|e| TuneError::InvalidParameters(format!("cannot sample outcomes: {}", e)))?;
    let mut counts = vec![0u32; probs.len()];
    for _ in 0..shots {
        counts[dist.sample(rng)] += 1;
    }
    let total = f64::from(shots);
    Ok(counts.into_iter().map(|c| f64::from(c) / total).collect())
}

fn reverse_bits(n: usize, x: usize) -> usize {
    (0..n).fold(0, |acc, i| acc | (((x >> i) & 1) << (n - 1 - i)))
}

/// Build `circuit` on a fresh builder, returning the builder and a register holding every qubit
/// in index order.
fn lower(circuit: &Circuit) -> TuneResult<(LocalBuilder<f64>, Qudit)> {
    let n = NonZeroUsize::new(circuit.num_qubits()).ok_or_else(|| {
        TuneError::InvalidInstruction("cannot simulate a circuit without qubits".into())
    })?;
    let mut b = LocalBuilder::<f64>::default();
    let r = b.register(n);
    let mut qubits = b
        .split_all_register(r)
        .into_iter()
        .map(Some)
        .collect::<Vec<_>>();

    for inst in circuit.instructions() {
        let rs = inst
            .qubits()
            .iter()
            .map(|&q| {
                qubits.get_mut(q).and_then(Option::take).ok_or(TuneError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: n.get(),
                })
            })
            .collect::<TuneResult<Vec<_>>>()?;
        let rs = apply_gate(&mut b, inst.gate(), rs)?;
        inst.qubits()
            .iter()
            .zip(rs)
            .for_each(|(&q, r)| qubits[q] = Some(r));
    }

    let r = b
        .merge_registers(qubits.into_iter().flatten())
        .ok_or_else(|| TuneError::InvalidInstruction("circuit lost its qubits".into()))?;
    Ok((b, r))
}

fn apply_gate(b: &mut LocalBuilder<f64>, gate: Gate, rs: Vec<Qudit>) -> TuneResult<Vec<Qudit>> {
    let arity_error = |rs: Vec<Qudit>| {
        TuneError::InvalidInstruction(format!(
            "{} expects {} qubit(s), got {}",
            gate.name(),
            gate.arity(),
            rs.len()
        ))
    };
    match gate {
        Gate::Cx => {
            let [c, t]: [Qudit; 2] = rs.try_into().map_err(arity_error)?;
            let (c, t) = b.cnot(c, t)?;
            Ok(vec![c, t])
        }
        Gate::Ccx => {
            let [c0, c1, t]: [Qudit; 3] = rs.try_into().map_err(arity_error)?;
            let r = b.merge_two_registers(c0, c1);
            let r = b.merge_two_registers(r, t);
            let r = b.apply_vec_matrix(r, toffoli_matrix())?;
            Ok(b.split_all_register(r))
        }
        gate => {
            let [q]: [Qudit; 1] = rs.try_into().map_err(arity_error)?;
            let q = match gate {
                Gate::Id => q,
                Gate::X => b.x(q),
                Gate::Y => b.y(q),
                Gate::Z => b.z(q),
                Gate::H => b.h(q),
                Gate::S => b.s(q),
                Gate::Sdg => b.s_dagger(q),
                Gate::T => b.t(q),
                Gate::Tdg => b.t_dagger(q),
                Gate::Rz(theta) => b.rz(q, theta),
                Gate::U(theta, phi, lambda) => b.apply_matrix(q, u_matrix(theta, phi, lambda))?,
                Gate::Cx | Gate::Ccx => unreachable!("multi-qubit gates handled above"),
            };
            Ok(vec![q])
        }
    }
}

/// Row-major `U(theta, phi, lambda)`.
fn u_matrix(theta: f64, phi: f64, lambda: f64) -> [Complex64; 4] {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        Complex64::new(cos, 0.0),
        -Complex64::from_polar(sin, lambda),
        Complex64::from_polar(sin, phi),
        Complex64::from_polar(cos, phi + lambda),
    ]
}

/// Row-major Toffoli permutation for a register ordered `(c0, c1, t)`. Using exact 0/1 entries
/// keeps the ideal gate's unitary free of rounding.
fn toffoli_matrix() -> Vec<Complex64> {
    let permuted = |row: usize| match row {
        6 => 7,
        7 => 6,
        row => row,
    };
    (0..64)
        .map(|i| {
            let (row, col) = (i / 8, i % 8);
            if permuted(row) == col {
                Complex64::one()
            } else {
                Complex64::zero()
            }
        })
        .collect()
}
