//! A minimal gate-list circuit representation, independent of any simulator.

use std::fmt;

use crate::errors::{TuneError, TuneResult};

/// A gate which can appear in a [`Circuit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gate {
    /// Identity, kept so circuits can name idle qubits.
    Id,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
    /// Hadamard.
    H,
    /// Phase gate, `diag(1, i)`.
    S,
    /// Inverse phase gate, `diag(1, -i)`.
    Sdg,
    /// `diag(1, e^{i pi/4})`.
    T,
    /// `diag(1, e^{-i pi/4})`.
    Tdg,
    /// Rotation about z, `diag(e^{-i theta/2}, e^{i theta/2})`.
    Rz(f64),
    /// Generic single qubit rotation with angles `(theta, phi, lambda)`.
    U(f64, f64, f64),
    /// Controlled NOT, first qubit is the control.
    Cx,
    /// Toffoli, first two qubits are controls.
    Ccx,
}

impl Gate {
    /// Number of qubits the gate acts on.
    pub fn arity(&self) -> usize {
        match self {
            Gate::Cx => 2,
            Gate::Ccx => 3,
            _ => 1,
        }
    }

    /// Lower-case mnemonic, as used when printing circuits.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Id => "id",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::T => "t",
            Gate::Tdg => "tdg",
            Gate::Rz(_) => "rz",
            Gate::U(..) => "u",
            Gate::Cx => "cx",
            Gate::Ccx => "ccx",
        }
    }
}

/// A gate applied to an ordered list of qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    gate: Gate,
    qubits: Vec<usize>,
}

impl Instruction {
    /// The gate being applied.
    pub fn gate(&self) -> Gate {
        self.gate
    }

    /// Qubits the gate is applied to, controls first.
    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gate {
            Gate::Rz(theta) => write!(f, "rz({})", theta)?,
            Gate::U(theta, phi, lambda) => write!(f, "u({}, {}, {})", theta, phi, lambda)?,
            gate => write!(f, "{}", gate.name())?,
        }
        let qubits = self
            .qubits
            .iter()
            .map(|q| format!("q{}", q))
            .collect::<Vec<_>>();
        write!(f, " {}", qubits.join(","))
    }
}

/// An ordered sequence of gates over a fixed number of qubits.
///
/// Circuits are plain data: simulation happens in [`crate::simulate`], which lowers the
/// instructions onto a fresh `qip` builder on every call.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// An empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            instructions: vec![],
        }
    }

    /// Build from gates whose qubits are known to fit `num_qubits`, skipping the checks made by
    /// [`Circuit::append`].
    pub(crate) fn from_gates<I>(num_qubits: usize, gates: I) -> Self
    where
        I: IntoIterator<Item = (Gate, Vec<usize>)>,
    {
        let instructions = gates
            .into_iter()
            .map(|(gate, qubits)| {
                debug_assert_eq!(qubits.len(), gate.arity());
                debug_assert!(qubits.iter().all(|&q| q < num_qubits));
                Instruction { gate, qubits }
            })
            .collect();
        Self {
            num_qubits,
            instructions,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append `gate` on `qubits`, checking arity and qubit indices.
    pub fn append(&mut self, gate: Gate, qubits: &[usize]) -> TuneResult<&mut Self> {
        if qubits.len() != gate.arity() {
            return Err(TuneError::InvalidInstruction(format!(
                "{} expects {} qubit(s), got {}",
                gate.name(),
                gate.arity(),
                qubits.len()
            )));
        }
        if let Some(&qubit) = qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(TuneError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        for (i, q) in qubits.iter().enumerate() {
            if qubits[i + 1..].contains(q) {
                return Err(TuneError::InvalidInstruction(format!(
                    "{} applied to q{} more than once",
                    gate.name(),
                    q
                )));
            }
        }
        self.instructions.push(Instruction {
            gate,
            qubits: qubits.to_vec(),
        });
        Ok(self)
    }

    /// Identity on `q`.
    pub fn id(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Id, &[q])
    }

    /// Pauli X on `q`.
    pub fn x(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::X, &[q])
    }

    /// Pauli Y on `q`.
    pub fn y(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Y, &[q])
    }

    /// Pauli Z on `q`.
    pub fn z(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Z, &[q])
    }

    /// Hadamard on `q`.
    pub fn h(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::H, &[q])
    }

    /// S on `q`.
    pub fn s(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::S, &[q])
    }

    /// S dagger on `q`.
    pub fn sdg(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Sdg, &[q])
    }

    /// T on `q`.
    pub fn t(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::T, &[q])
    }

    /// T dagger on `q`.
    pub fn tdg(&mut self, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Tdg, &[q])
    }

    /// Z rotation by `theta` on `q`.
    pub fn rz(&mut self, theta: f64, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Rz(theta), &[q])
    }

    /// Generic rotation `U(theta, phi, lambda)` on `q`.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, q: usize) -> TuneResult<&mut Self> {
        self.append(Gate::U(theta, phi, lambda), &[q])
    }

    /// CNOT with control `c` and target `t`.
    pub fn cx(&mut self, c: usize, t: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Cx, &[c, t])
    }

    /// Toffoli with controls `c0`, `c1` and target `t`.
    pub fn ccx(&mut self, c0: usize, c1: usize, t: usize) -> TuneResult<&mut Self> {
        self.append(Gate::Ccx, &[c0, c1, t])
    }

    /// Append all of `other`, with its qubit `i` mapped onto `qubits[i]`.
    pub fn compose(&mut self, other: &Circuit, qubits: &[usize]) -> TuneResult<&mut Self> {
        if qubits.len() != other.num_qubits {
            return Err(TuneError::DimensionMismatch {
                expected: other.num_qubits,
                found: qubits.len(),
            });
        }
        for inst in &other.instructions {
            let mapped = inst.qubits.iter().map(|&q| qubits[q]).collect::<Vec<_>>();
            self.append(inst.gate, &mapped)?;
        }
        Ok(self)
    }

    /// Expand composite gates by one level. A Toffoli becomes its standard Clifford+T
    /// network, everything else is kept as is.
    pub fn decompose(&self) -> Circuit {
        let mut instructions = Vec::with_capacity(self.instructions.len());
        for inst in &self.instructions {
            match (inst.gate, inst.qubits.as_slice()) {
                (Gate::Ccx, &[a, b, c]) => {
                    let network = [
                        (Gate::H, vec![c]),
                        (Gate::Cx, vec![b, c]),
                        (Gate::Tdg, vec![c]),
                        (Gate::Cx, vec![a, c]),
                        (Gate::T, vec![c]),
                        (Gate::Cx, vec![b, c]),
                        (Gate::Tdg, vec![c]),
                        (Gate::Cx, vec![a, c]),
                        (Gate::T, vec![b]),
                        (Gate::T, vec![c]),
                        (Gate::H, vec![c]),
                        (Gate::Cx, vec![a, b]),
                        (Gate::T, vec![a]),
                        (Gate::Tdg, vec![b]),
                        (Gate::Cx, vec![a, b]),
                    ];
                    instructions.extend(
                        network
                            .into_iter()
                            .map(|(gate, qubits)| Instruction { gate, qubits }),
                    );
                }
                _ => instructions.push(inst.clone()),
            }
        }
        Circuit {
            num_qubits: self.num_qubits,
            instructions,
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circuit[{}]", self.num_qubits)?;
        for inst in &self.instructions {
            write!(f, "; {}", inst)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_checks_arity() {
        let mut c = Circuit::new(3);
        assert!(matches!(
            c.append(Gate::Cx, &[0]),
            Err(TuneError::InvalidInstruction(_))
        ));
        assert!(c.is_empty());
    }

    #[test]
    fn test_append_checks_range() {
        let mut c = Circuit::new(2);
        let err = c.ccx(0, 1, 2).unwrap_err();
        assert!(matches!(
            err,
            TuneError::QubitOutOfRange {
                qubit: 2,
                num_qubits: 2
            }
        ));
    }

    #[test]
    fn test_append_rejects_repeated_qubits() {
        let mut c = Circuit::new(3);
        assert!(c.cx(1, 1).is_err());
        assert!(c.ccx(0, 2, 0).is_err());
    }

    #[test]
    fn test_decompose_toffoli() {
        let mut c = Circuit::new(3);
        c.h(0).unwrap().ccx(0, 1, 2).unwrap();
        let d = c.decompose();
        assert_eq!(d.len(), 16);
        assert_eq!(d.instructions()[0].gate(), Gate::H);
        assert!(d.instructions().iter().all(|i| i.gate() != Gate::Ccx));
        let cx_count = d
            .instructions()
            .iter()
            .filter(|i| i.gate() == Gate::Cx)
            .count();
        assert_eq!(cx_count, 6);
    }

    #[test]
    fn test_compose_maps_qubits() {
        let mut inner = Circuit::new(2);
        inner.cx(0, 1).unwrap();
        let mut outer = Circuit::new(3);
        outer.compose(&inner, &[2, 0]).unwrap();
        assert_eq!(outer.instructions()[0].qubits(), &[2, 0]);
        assert!(outer.compose(&inner, &[0]).is_err());
    }

    #[test]
    fn test_display() {
        let mut c = Circuit::new(2);
        c.x(0).unwrap().cx(0, 1).unwrap();
        assert_eq!(c.to_string(), "circuit[2]; x q0; cx q0,q1");
    }
}
