//! The circuits under study: the ideal Toffoli gate and the tunable task circuit.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, Gate};
use crate::errors::{TuneError, TuneResult};

/// Number of tunable angles in [`task_circuit`].
pub const NUM_TASK_ANGLES: usize = 6;

/// The six angles of the two `U` gates in [`task_circuit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskAngles {
    /// Polar angle of the first `U` gate.
    pub theta1: f64,
    /// First phase of the first `U` gate.
    pub phi1: f64,
    /// Second phase of the first `U` gate.
    pub lambda1: f64,
    /// Polar angle of the second `U` gate.
    pub theta2: f64,
    /// First phase of the second `U` gate.
    pub phi2: f64,
    /// Second phase of the second `U` gate.
    pub lambda2: f64,
}

impl TaskAngles {
    /// Build from up to six values in `(theta1, phi1, lambda1, theta2, phi2, lambda2)` order.
    /// Missing trailing values are zero.
    pub fn from_slice(params: &[f64]) -> TuneResult<Self> {
        if params.len() > NUM_TASK_ANGLES {
            return Err(TuneError::InvalidParameters(format!(
                "task circuit takes at most {} angles, got {}",
                NUM_TASK_ANGLES,
                params.len()
            )));
        }
        let mut padded = [0.0; NUM_TASK_ANGLES];
        padded[..params.len()].copy_from_slice(params);
        Ok(Self::from(padded))
    }

    /// The angles as an array, in constructor order.
    pub fn to_array(&self) -> [f64; NUM_TASK_ANGLES] {
        [
            self.theta1,
            self.phi1,
            self.lambda1,
            self.theta2,
            self.phi2,
            self.lambda2,
        ]
    }

    /// Default search box: polar angles over `[0, pi]`, phases over `[0, 2pi]`.
    pub fn search_bounds() -> Vec<(f64, f64)> {
        vec![
            (0.0, PI),
            (0.0, 2.0 * PI),
            (0.0, 2.0 * PI),
            (0.0, PI),
            (0.0, 2.0 * PI),
            (0.0, 2.0 * PI),
        ]
    }
}

impl From<[f64; NUM_TASK_ANGLES]> for TaskAngles {
    fn from(p: [f64; NUM_TASK_ANGLES]) -> Self {
        Self {
            theta1: p[0],
            phi1: p[1],
            lambda1: p[2],
            theta2: p[3],
            phi2: p[4],
            lambda2: p[5],
        }
    }
}

/// The ideal gate: a single Toffoli with controls on qubits 0 and 1, target on qubit 2.
pub fn toffoli() -> Circuit {
    Circuit::from_gates(3, [(Gate::Ccx, vec![0, 1, 2])])
}

/// The three qubit task circuit: a Toffoli-like Clifford+T network where two of the gates on
/// the target have been replaced by tunable `U` gates.
pub fn task_circuit(a: &TaskAngles) -> Circuit {
    Circuit::from_gates(
        3,
        [
            (Gate::T, vec![0]),
            (Gate::U(a.theta1, a.phi1, a.lambda1), vec![2]),
            (Gate::Cx, vec![0, 1]),
            (Gate::Tdg, vec![1]),
            (Gate::Cx, vec![0, 1]),
            (Gate::T, vec![1]),
            (Gate::Cx, vec![1, 2]),
            (Gate::Tdg, vec![2]),
            (Gate::Cx, vec![0, 2]),
            (Gate::T, vec![2]),
            (Gate::Cx, vec![1, 2]),
            (Gate::U(a.theta2, a.phi2, a.lambda2), vec![2]),
            (Gate::Cx, vec![0, 2]),
            (Gate::T, vec![2]),
            (Gate::H, vec![2]),
        ],
    )
}

/// Anything which can produce a circuit to be scored: a circuit itself, or angles for
/// [`task_circuit`].
pub trait CircuitSource {
    /// Produce the circuit.
    fn to_circuit(&self) -> TuneResult<Circuit>;
}

impl CircuitSource for Circuit {
    fn to_circuit(&self) -> TuneResult<Circuit> {
        Ok(self.clone())
    }
}

impl CircuitSource for TaskAngles {
    fn to_circuit(&self) -> TuneResult<Circuit> {
        Ok(task_circuit(self))
    }
}

impl CircuitSource for [f64] {
    fn to_circuit(&self) -> TuneResult<Circuit> {
        TaskAngles::from_slice(self)?.to_circuit()
    }
}

impl CircuitSource for [f64; NUM_TASK_ANGLES] {
    fn to_circuit(&self) -> TuneResult<Circuit> {
        TaskAngles::from(*self).to_circuit()
    }
}

impl CircuitSource for Vec<f64> {
    fn to_circuit(&self) -> TuneResult<Circuit> {
        self.as_slice().to_circuit()
    }
}

impl<T: CircuitSource + ?Sized> CircuitSource for &T {
    fn to_circuit(&self) -> TuneResult<Circuit> {
        (**self).to_circuit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_circuit_layout() {
        let angles = TaskAngles {
            theta1: 0.1,
            phi1: 0.2,
            lambda1: 0.3,
            theta2: 0.4,
            phi2: 0.5,
            lambda2: 0.6,
        };
        let c = task_circuit(&angles);
        assert_eq!(c.num_qubits(), 3);
        assert_eq!(c.len(), 15);
        assert_eq!(c.instructions()[1].gate(), Gate::U(0.1, 0.2, 0.3));
        assert_eq!(c.instructions()[1].qubits(), &[2]);
        assert_eq!(c.instructions()[11].gate(), Gate::U(0.4, 0.5, 0.6));
        assert_eq!(c.instructions()[14].gate(), Gate::H);
    }

    #[test]
    fn test_from_slice_pads_with_zero() {
        let a = TaskAngles::from_slice(&[1.0, 2.0]).unwrap();
        assert_eq!(a.to_array(), [1.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(TaskAngles::from_slice(&[]).unwrap(), TaskAngles::default());
        assert!(TaskAngles::from_slice(&[0.0; 7]).is_err());
    }

    #[test]
    fn test_sources_agree() {
        let params = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0];
        let from_array = params.to_circuit().unwrap();
        let from_vec = params.to_vec().to_circuit().unwrap();
        let from_angles = TaskAngles::from(params).to_circuit().unwrap();
        assert_eq!(from_array, from_vec);
        assert_eq!(from_array, from_angles);
    }

    #[test]
    fn test_search_bounds() {
        let bounds = TaskAngles::search_bounds();
        assert_eq!(bounds.len(), NUM_TASK_ANGLES);
        assert!(bounds.iter().all(|(lo, hi)| *lo == 0.0 && *hi > *lo));
    }

    #[test]
    fn test_fixed_circuits_pass_validation() {
        let angles = TaskAngles::from([0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        for c in [toffoli(), task_circuit(&angles)] {
            let mut rebuilt = Circuit::new(c.num_qubits());
            for inst in c.instructions() {
                rebuilt.append(inst.gate(), inst.qubits()).unwrap();
            }
            assert_eq!(rebuilt, c);
        }
        assert_eq!(toffoli().instructions()[0].gate(), Gate::Ccx);
        assert_eq!(toffoli().instructions()[0].qubits(), &[0, 1, 2]);
    }
}
