//! Error types.

use qip::errors::CircuitError;
use thiserror::Error;

/// An error from building, simulating, scoring or tuning a circuit.
#[derive(Debug, Error)]
pub enum TuneError {
    /// The circuit could not be lowered onto the simulator.
    #[error("simulator rejected circuit: {0}")]
    Circuit(#[from] CircuitError),
    /// A gate referenced a qubit the circuit does not have.
    #[error("qubit {qubit} out of range for a {num_qubits}-qubit circuit")]
    QubitOutOfRange {
        /// Offending qubit index.
        qubit: usize,
        /// Number of qubits in the circuit.
        num_qubits: usize,
    },
    /// A gate was given the wrong number of qubits, or repeated qubits.
    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),
    /// Two operands had incompatible sizes.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected size.
        expected: usize,
        /// Actual size.
        found: usize,
    },
    /// Circuit parameters could not be interpreted.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// Search bounds were empty, reversed or not finite.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),
    /// The optimizer was misconfigured or could not proceed.
    #[error("optimizer error: {0}")]
    Optimizer(String),
    /// Configuration could not be used.
    #[error("configuration error: {0}")]
    Config(String),
    /// Reading configuration failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding or decoding YAML/JSON failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for TuneError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for TuneError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// A result which may contain a tuning error.
pub type TuneResult<T> = Result<T, TuneError>;
