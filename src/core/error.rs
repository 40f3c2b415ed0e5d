//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Identifier of a qubit inside a circuit.
/// Qubit `n` maps to bit position `n` of a basis-state index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Identifier of a classical bit written by a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClbitId(pub usize);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Failures raised while building or simulating a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The state vector lost its unit norm.
    #[error("Incoherence Violation: {message}")]
    Incoherence {
        /// Incoherence failure message
        message: String,
    },

    /// An operation referenced a qubit or classical bit outside the circuit.
    #[error("Reference Violation: {message}")]
    ReferenceViolation {
        /// ReferenceViolation failure message
        message: String,
    },

    /// An operation is inconsistent with the current state or circuit layout.
    #[error("Invalid Operation: {message}")]
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// General error encountered during the simulation process itself.
    #[error("Simulation Process Error: {message}")]
    SimulationFailure {
        /// SimulationFailure failure message
        message: String,
    },
}

/// Faults reported by a [`Backend`](crate::simulation::Backend) invocation.
/// All of them are treated as transient by the teleportation channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendFault {
    /// The backend could not be reached or refused the job.
    #[error("backend unreachable: {message}")]
    Unreachable {
        /// Unreachable failure message
        message: String,
    },

    /// The backend answered with an outcome key that is not a 3-bit string.
    #[error("malformed outcome key {key:?}")]
    MalformedOutcome {
        /// The offending key, verbatim.
        key: String,
    },

    /// The backend failed while executing the circuit.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Errors surfaced by the encode / teleport / decode pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeleportError {
    /// The character's ordinal is outside the supported 0..=360 degree range.
    #[error("cannot encode {character:?}: ordinal {ordinal} is outside 0..=360")]
    EncodingDomain {
        /// The rejected character.
        character: char,
        /// Its ordinal value.
        ordinal: u32,
    },

    /// Every channel attempt failed at the backend.
    #[error("channel failed after {attempts} attempt(s): {last_fault}")]
    ChannelTransientFault {
        /// Number of backend invocations performed.
        attempts: u32,
        /// The fault reported by the final attempt.
        last_fault: BackendFault,
    },

    /// The tally has no samples, so the amplitude ratio is undefined.
    #[error("degenerate tally (bit0={bit0}, bit1={bit1}): no samples to decode")]
    DecodeDegenerate {
        /// Count of outcomes with a leading 0.
        bit0: u64,
        /// Count of outcomes with a leading 1.
        bit1: u64,
    },

    /// The decoded degree value does not name a character.
    #[error("decoded angle {degrees} does not map to a character")]
    DecodeRange {
        /// The unfolded angle in degrees.
        degrees: u32,
    },

    /// A configuration value is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// InvalidConfig failure message
        message: String,
    },

    /// Circuit construction failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}
