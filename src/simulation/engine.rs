// src/simulation/engine.rs
use crate::core::constants::tolerances::AMPLITUDE_TOLERANCE;
use crate::core::{ClbitId, QubitId, SimulationError, StateVector};
use crate::operations::Operation;
use crate::validation::{check_amplitude_pair, check_normalization};
use num_complex::Complex;
use num_traits::Zero;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;

/// Largest register the engine will allocate (`2^MAX_QUBITS` amplitudes).
const MAX_QUBITS: usize = 16;

/// Evolves one shot of a circuit: the quantum state plus the classical
/// bits written by measurements so far.
/// (Internal visibility)
#[derive(Debug, Clone)]
pub(crate) struct SimulationEngine {
    state: StateVector,
    clbits: Vec<bool>,
}

impl SimulationEngine {
    /// Initializes the engine in `|0...0>` with every classical bit cleared.
    pub(crate) fn init(num_qubits: usize, num_clbits: usize) -> Result<Self, SimulationError> {
        if num_qubits == 0 {
            return Err(SimulationError::InvalidOperation {
                message: "Cannot initialize simulation engine with zero qubits".to_string(),
            });
        }
        if num_qubits > MAX_QUBITS {
            return Err(SimulationError::SimulationFailure {
                message: format!("{} qubits exceeds the engine limit of {}", num_qubits, MAX_QUBITS),
            });
        }
        Ok(Self {
            state: StateVector::zero_state(num_qubits),
            clbits: vec![false; num_clbits],
        })
    }

    #[cfg(test)] // Only compile this function when running tests
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<(), SimulationError> {
        if state.dim() != self.state.dim() {
            Err(SimulationError::SimulationFailure {
                message: format!(
                    "Cannot set state: provided dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.state.dim()
                ),
            })
        } else {
            self.state = state;
            Ok(())
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn clbits(&self) -> &[bool] {
        &self.clbits
    }

    /// The classical register rendered highest bit first, e.g. `"1 0 1"`.
    pub(crate) fn outcome_key(&self) -> String {
        self.clbits
            .iter()
            .rev()
            .map(|bit| if *bit { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Applies a single operation. Measurements draw from `rng`.
    pub(crate) fn apply_operation(&mut self, op: &Operation, rng: &mut StdRng) -> Result<(), SimulationError> {
        match op {
            Operation::Initialize { target, amplitudes } => {
                let target = self.qubit_index(target)?;
                self.initialize(target, *amplitudes)?;
            }
            Operation::Apply { target, gate } => {
                let target = self.qubit_index(target)?;
                self.apply_single_qubit_gate(target, &gate.matrix());
            }
            Operation::Controlled { control, target, gate } => {
                let control = self.qubit_index(control)?;
                let target = self.qubit_index(target)?;
                if control == target {
                    return Err(SimulationError::InvalidOperation {
                        message: "Control and target qubits cannot be the same for controlled operation".to_string(),
                    });
                }
                self.apply_controlled_gate(control, target, &gate.matrix());
            }
            Operation::Conditional { clbit, value, target, gate } => {
                let bit = self.clbit_index(clbit)?;
                let target = self.qubit_index(target)?;
                if self.clbits[bit] == *value {
                    self.apply_single_qubit_gate(target, &gate.matrix());
                }
            }
            Operation::Measure { target, clbit } => {
                let target = self.qubit_index(target)?;
                let bit = self.clbit_index(clbit)?;
                let outcome = self.measure(target, rng)?;
                self.clbits[bit] = outcome;
            }
            Operation::Barrier => {}
        }
        Ok(())
    }

    /// Rotates a qubit that is still in `|0>` onto `a|0> + b|1>`.
    fn initialize(&mut self, target: usize, amplitudes: [f64; 2]) -> Result<(), SimulationError> {
        check_amplitude_pair(amplitudes, None)?;
        if self.state.probability_of_one(target) > AMPLITUDE_TOLERANCE {
            return Err(SimulationError::InvalidOperation {
                message: format!("Initialize requires {} to be in |0>", QubitId(target)),
            });
        }
        let [a, b] = amplitudes;
        // Real rotation whose first column is [a, b].
        let rotation = [
            [Complex::new(a, 0.0), Complex::new(-b, 0.0)],
            [Complex::new(b, 0.0), Complex::new(a, 0.0)],
        ];
        self.apply_single_qubit_gate(target, &rotation);
        Ok(())
    }

    /// Applies a 2x2 matrix to the amplitude pairs differing only at `target`.
    fn apply_single_qubit_gate(&mut self, target: usize, matrix: &[[Complex<f64>; 2]; 2]) {
        let mask = 1usize << target;
        let amplitudes = self.state.vector_mut();
        for i0 in 0..amplitudes.len() {
            if i0 & mask != 0 {
                continue;
            }
            let i1 = i0 | mask;
            let psi_0 = amplitudes[i0];
            let psi_1 = amplitudes[i1];
            amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }

    /// Same as [`Self::apply_single_qubit_gate`], restricted to the subspace where `control` is `|1>`.
    fn apply_controlled_gate(&mut self, control: usize, target: usize, matrix: &[[Complex<f64>; 2]; 2]) {
        let control_mask = 1usize << control;
        let target_mask = 1usize << target;
        let amplitudes = self.state.vector_mut();
        for i0 in 0..amplitudes.len() {
            if i0 & control_mask == 0 || i0 & target_mask != 0 {
                continue;
            }
            let i1 = i0 | target_mask;
            let psi_0 = amplitudes[i0];
            let psi_1 = amplitudes[i1];
            amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }

    /// Samples a computational-basis outcome for `target` and collapses the state onto it.
    fn measure(&mut self, target: usize, rng: &mut StdRng) -> Result<bool, SimulationError> {
        let p_one = self.state.probability_of_one(target).clamp(0.0, 1.0);
        let sample: f64 = StandardUniform.sample(rng);
        // Rounding noise must not select an outcome of zero weight.
        let outcome = if p_one <= AMPLITUDE_TOLERANCE {
            false
        } else if p_one >= 1.0 - AMPLITUDE_TOLERANCE {
            true
        } else {
            sample < p_one
        };
        let p_outcome = if outcome { p_one } else { 1.0 - p_one };
        if p_outcome < AMPLITUDE_TOLERANCE {
            return Err(SimulationError::SimulationFailure {
                message: format!("Sampled an outcome of negligible probability on {}", QubitId(target)),
            });
        }

        let mask = 1usize << target;
        let scale = 1.0 / p_outcome.sqrt();
        for (k, amplitude) in self.state.vector_mut().iter_mut().enumerate() {
            if (k & mask != 0) == outcome {
                *amplitude *= scale;
            } else {
                *amplitude = Complex::zero();
            }
        }
        check_normalization(&self.state, Some(1e-6))?;
        Ok(outcome)
    }

    fn qubit_index(&self, qubit: &QubitId) -> Result<usize, SimulationError> {
        if qubit.0 < self.state.num_qubits() {
            Ok(qubit.0)
        } else {
            Err(SimulationError::ReferenceViolation {
                message: format!("Qubit {} not found in simulation context", qubit),
            })
        }
    }

    fn clbit_index(&self, clbit: &ClbitId) -> Result<usize, SimulationError> {
        if clbit.0 < self.clbits.len() {
            Ok(clbit.0)
        } else {
            Err(SimulationError::ReferenceViolation {
                message: format!("Classical bit {} not found in simulation context", clbit),
            })
        }
    }
}
