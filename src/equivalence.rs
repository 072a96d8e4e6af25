//! Ways of deciding whether two circuits implement the same operation.
//!
//! `state_vector_equiv` and `operator_equiv` ignore global phase, `unitaries_allclose` does
//! not. Circuits over different numbers of qubits are never equivalent.

use ndarray::Array1;

use crate::circuit::Circuit;
use crate::errors::TuneResult;
use crate::linalg::{matrix_equal, Tolerance};
use crate::simulate::{statevector, unitary};

/// Compare the states both circuits prepare from `|0...0>`, up to global phase.
///
/// Only the action on the all-zero input is compared, so circuits which differ on other
/// inputs can still be reported equivalent.
pub fn state_vector_equiv(circuit1: &Circuit, circuit2: &Circuit) -> TuneResult<bool> {
    state_vector_equiv_with(circuit1, circuit2, Tolerance::default())
}

/// [`state_vector_equiv`] with an explicit tolerance.
pub fn state_vector_equiv_with(
    circuit1: &Circuit,
    circuit2: &Circuit,
    tol: Tolerance,
) -> TuneResult<bool> {
    if circuit1.num_qubits() != circuit2.num_qubits() {
        return Ok(false);
    }
    let s1 = Array1::from(statevector(circuit1)?);
    let s2 = Array1::from(statevector(circuit2)?);
    Ok(matrix_equal(&s1, &s2, true, tol))
}

/// Element-wise comparison of the two unitaries. Sensitive to global phase.
pub fn unitaries_allclose(circuit1: &Circuit, circuit2: &Circuit) -> TuneResult<bool> {
    unitaries_allclose_with(circuit1, circuit2, Tolerance::default())
}

/// [`unitaries_allclose`] with an explicit tolerance.
pub fn unitaries_allclose_with(
    circuit1: &Circuit,
    circuit2: &Circuit,
    tol: Tolerance,
) -> TuneResult<bool> {
    if circuit1.num_qubits() != circuit2.num_qubits() {
        return Ok(false);
    }
    Ok(matrix_equal(
        &unitary(circuit1)?,
        &unitary(circuit2)?,
        false,
        tol,
    ))
}

/// Compare the two unitaries up to global phase.
pub fn operator_equiv(circuit1: &Circuit, circuit2: &Circuit) -> TuneResult<bool> {
    operator_equiv_with(circuit1, circuit2, Tolerance::default())
}

/// [`operator_equiv`] with an explicit tolerance.
pub fn operator_equiv_with(
    circuit1: &Circuit,
    circuit2: &Circuit,
    tol: Tolerance,
) -> TuneResult<bool> {
    if circuit1.num_qubits() != circuit2.num_qubits() {
        return Ok(false);
    }
    Ok(matrix_equal(
        &unitary(circuit1)?,
        &unitary(circuit2)?,
        true,
        tol,
    ))
}
