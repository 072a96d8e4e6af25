#![forbid(unsafe_code)]
#![deny(
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    missing_docs
)]

//! Tools for approximating a Toffoli gate with a small parameterised circuit.
//!
//! Circuits are described with [`circuit::Circuit`] and simulated by lowering them onto a
//! `qip` builder. The ideal gate is [`circuits::toffoli`], the candidate family is
//! [`circuits::task_circuit`], and the two are compared either with a scalar
//! [`cost::CostFunction`] or with one of the checks in [`equivalence`]. [`tuning`] searches the
//! candidate's angles with differential evolution.
//!
//! # Example
//! ```
//! use toffoli_tune::prelude::*;
//!
//! # fn main() -> TuneResult<()> {
//! // The ideal gate has zero cost under every metric.
//! let ideal = toffoli();
//! for cost in CostFunction::ALL {
//!     assert_eq!(cost.evaluate(&ideal, SimulationMode::Exact)?, 0.0);
//! }
//!
//! // The textbook network of H, T and CNOT gates implements the same operator.
//! assert!(operator_equiv(&ideal.decompose(), &ideal)?);
//!
//! // Angles can be scored directly.
//! let angles = TaskAngles::from_slice(&[0.1, 0.2, 0.3])?;
//! let c = CostFunction::TraceNorm.evaluate(&angles, SimulationMode::Exact)?;
//! assert!(c > 0.0);
//! # Ok(())
//! # }
//! ```

pub use num_complex::Complex64;

pub mod circuit;
pub mod circuits;
pub mod config;
pub mod cost;
pub mod equivalence;
pub mod errors;
pub mod linalg;
pub mod simulate;
pub mod tuning;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::circuit::{Circuit, Gate, Instruction};
    pub use crate::circuits::{task_circuit, toffoli, CircuitSource, TaskAngles};
    pub use crate::config::Config;
    pub use crate::cost::CostFunction;
    pub use crate::equivalence::{operator_equiv, state_vector_equiv, unitaries_allclose};
    pub use crate::errors::{TuneError, TuneResult};
    pub use crate::linalg::Tolerance;
    pub use crate::simulate::SimulationMode;
    pub use crate::tuning::{
        differential_evolution, optimize_angles_and_time, DifferentialEvolutionOptions,
        OptimizeResult, TuningRun,
    };
}
