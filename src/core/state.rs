// src/core/state.rs

use num_complex::Complex;
use num_traits::Zero;

/// Amplitudes of an `n`-qubit register over the `2^n` computational basis.
///
/// Basis index `k` has qubit `q` in state `|1>` exactly when bit `q` of `k`
/// is set, so qubit 0 is the least significant bit.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl StateVector {
    /// The all-zero basis state `|0...0>` over `num_qubits` qubits.
    pub(crate) fn zero_state(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex::zero(); 1 << num_qubits];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Self { amplitudes, num_qubits }
    }

    /// Wraps an explicit amplitude vector. The length must be a power of two.
    #[cfg(test)]
    pub(crate) fn from_amplitudes(amplitudes: Vec<Complex<f64>>) -> Option<Self> {
        let dim = amplitudes.len();
        if dim == 0 || !dim.is_power_of_two() {
            return None;
        }
        Some(Self { num_qubits: dim.trailing_zeros() as usize, amplitudes })
    }

    /// Read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn vector_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    /// Number of basis states (`2^n`).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Number of qubits represented.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Sum of squared magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Probability that measuring `qubit` yields `1`.
    pub fn probability_of_one(&self, qubit: usize) -> f64 {
        let mask = 1usize << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(k, _)| k & mask != 0)
            .map(|(_, c)| c.norm_sqr())
            .sum()
    }
}
