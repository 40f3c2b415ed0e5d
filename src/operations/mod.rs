// src/operations/mod.rs

//! Defines the gates and operations a teleportation circuit is made of.
//!
//! The set is deliberately small: real-amplitude initialization, the four
//! single-qubit gates the protocol needs, controlled and classically
//! conditioned variants, and measurement into a classical bit.

use crate::core::{ClbitId, QubitId};
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::FRAC_1_SQRT_2;

/// A fixed single-qubit unitary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Bit flip (Pauli X).
    PauliX,
    /// Phase flip (Pauli Z).
    PauliZ,
    /// Hadamard: maps `|0>` to `|+>` and `|1>` to `|->`.
    Hadamard,
}

impl Gate {
    /// The 2x2 matrix in the `{|0>, |1>}` basis.
    pub fn matrix(&self) -> [[Complex<f64>; 2]; 2] {
        let one = Complex::new(1.0, 0.0);
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        match self {
            Gate::PauliX => [[Complex::zero(), one], [one, Complex::zero()]],
            Gate::PauliZ => [[one, Complex::zero()], [Complex::zero(), -one]],
            Gate::Hadamard => [[h, h], [h, -h]],
        }
    }

    /// Symbol used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::PauliX => "X",
            Gate::PauliZ => "Z",
            Gate::Hadamard => "H",
        }
    }
}

/// One step of a circuit.
#[derive(Debug, Clone, PartialEq)] // f64 amplitudes rule out Eq
pub enum Operation {
    /// Prepares a fresh qubit (still in `|0>`) in `a|0> + b|1>`.
    /// The pair must have unit norm.
    Initialize {
        /// The qubit to prepare.
        target: QubitId,
        /// Real amplitudes `[a, b]`.
        amplitudes: [f64; 2],
    },

    /// Applies a gate to one qubit.
    Apply {
        /// The qubit acted upon.
        target: QubitId,
        /// The gate to apply.
        gate: Gate,
    },

    /// Applies `gate` to `target` on the part of the state where `control` is `|1>`.
    Controlled {
        /// Control qubit.
        control: QubitId,
        /// Target qubit.
        target: QubitId,
        /// The gate applied to the target.
        gate: Gate,
    },

    /// Applies `gate` to `target` only if classical bit `clbit` currently holds `value`.
    Conditional {
        /// Classical bit steering the correction.
        clbit: ClbitId,
        /// Value the bit must hold for the gate to fire.
        value: bool,
        /// Target qubit.
        target: QubitId,
        /// The correction gate.
        gate: Gate,
    },

    /// Measures `target` in the computational basis, collapsing it, and stores
    /// the outcome in `clbit`.
    Measure {
        /// Measured qubit.
        target: QubitId,
        /// Destination classical bit.
        clbit: ClbitId,
    },

    /// Visual separator between protocol stages. No effect on the state.
    Barrier,
}

impl Operation {
    /// Qubits mentioned by this operation.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Initialize { target, .. } => vec![*target],
            Operation::Apply { target, .. } => vec![*target],
            Operation::Controlled { control, target, .. } => vec![*control, *target],
            Operation::Conditional { target, .. } => vec![*target],
            Operation::Measure { target, .. } => vec![*target],
            Operation::Barrier => Vec::new(),
        }
    }

    /// Classical bit read or written by this operation, if any.
    pub fn involved_clbit(&self) -> Option<ClbitId> {
        match self {
            Operation::Conditional { clbit, .. } | Operation::Measure { clbit, .. } => Some(*clbit),
            _ => None,
        }
    }

    /// `true` for mid-circuit measurements, which make each shot diverge.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Operation::Measure { .. })
    }
}
