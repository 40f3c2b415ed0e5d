// src/protocol/channel.rs

//! Teleports an [`EncodedState`] through a [`Backend`] and reduces the
//! outcome frequencies to an [`OutcomeTally`].
//!
//! Qubit layout: `q0` carries the payload, `q1` is the sender's half of the
//! Bell pair, `q2` the receiver's half. `c0` (`crz`) and `c1` (`crx`) hold
//! the sender's measurements and steer the receiver's Z and X corrections;
//! `c2` holds the receiver's final measurement.

use super::encoder::EncodedState;
use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{BackendFault, ClbitId, QubitId, TeleportError};
use crate::operations::Gate;
use crate::simulation::{Backend, Counts};
use std::fmt;
use std::ops::AddAssign;
use tracing::{debug, warn};

const PAYLOAD: QubitId = QubitId(0);
const RELAY: QubitId = QubitId(1);
const RECEIVER: QubitId = QubitId(2);
const CRZ: ClbitId = ClbitId(0);
const CRX: ClbitId = ClbitId(1);
const RESULT: ClbitId = ClbitId(2);

/// Every readout the teleportation circuit can produce, `"c2 c1 c0"`.
pub const OUTCOME_KEYS: [&str; 8] = [
    "0 0 0", "0 0 1", "0 1 0", "0 1 1", "1 0 0", "1 0 1", "1 1 0", "1 1 1",
];

/// Counts bucketed by the leading bit of the outcome key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Samples whose leading bit is 0.
    pub bit0: u64,
    /// Samples whose leading bit is 1.
    pub bit1: u64,
}

impl OutcomeTally {
    /// Creates a tally from raw bucket counts.
    pub fn new(bit0: u64, bit1: u64) -> Self {
        Self { bit0, bit1 }
    }

    /// Reduces backend counts, marginalizing over the two correction bits.
    ///
    /// # Errors
    /// `BackendFault::MalformedOutcome` if any key is not one of [`OUTCOME_KEYS`].
    pub fn from_counts(counts: &Counts) -> Result<Self, BackendFault> {
        if let Some(key) = counts.keys().find(|key| !OUTCOME_KEYS.contains(key)) {
            return Err(BackendFault::MalformedOutcome { key: key.to_string() });
        }
        let (zeros, ones) = OUTCOME_KEYS.split_at(4);
        Ok(Self {
            bit0: zeros.iter().map(|key| counts.get(key)).sum(),
            bit1: ones.iter().map(|key| counts.get(key)).sum(),
        })
    }

    /// Total number of samples.
    pub fn total(&self) -> u64 {
        self.bit0 + self.bit1
    }

    /// `true` when there are no samples to decode from.
    pub fn is_degenerate(&self) -> bool {
        self.total() == 0
    }

    /// `bit0 / (bit0 + bit1)`, or `None` for a degenerate tally.
    pub fn ratio(&self) -> Option<f64> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.bit0 as f64 / self.total() as f64)
        }
    }
}

impl AddAssign for OutcomeTally {
    fn add_assign(&mut self, other: Self) {
        self.bit0 += other.bit0;
        self.bit1 += other.bit1;
    }
}

impl fmt::Display for OutcomeTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tally(bit0={}, bit1={})", self.bit0, self.bit1)
    }
}

/// Entangles `a` and `b` into the Bell state `(|00> + |11>)/√2`.
fn create_bell_pair(builder: CircuitBuilder, a: QubitId, b: QubitId) -> CircuitBuilder {
    builder.h(a).cx(a, b)
}

/// Rotates the payload and relay into the Bell basis.
fn sender_gates(builder: CircuitBuilder, psi: QubitId, a: QubitId) -> CircuitBuilder {
    builder.cx(psi, a).h(psi)
}

/// Measures the sender's qubits into the two correction bits.
fn measure_and_send(builder: CircuitBuilder, psi: QubitId, a: QubitId) -> CircuitBuilder {
    builder.barrier().measure(psi, CRZ).measure(a, CRX)
}

/// Receiver's classically controlled corrections.
fn receiver_gates(builder: CircuitBuilder, qubit: QubitId) -> CircuitBuilder {
    builder.c_if(Gate::PauliX, qubit, CRX).c_if(Gate::PauliZ, qubit, CRZ)
}

/// Builds the full teleportation circuit for `state`, ending with a
/// measurement of the receiver qubit into `c2`.
pub fn teleportation_circuit(state: &EncodedState) -> Circuit {
    let builder = CircuitBuilder::new().initialize(PAYLOAD, state.amplitudes()).barrier();
    let builder = create_bell_pair(builder, RELAY, RECEIVER).barrier();
    let builder = sender_gates(builder, PAYLOAD, RELAY);
    let builder = measure_and_send(builder, PAYLOAD, RELAY);
    receiver_gates(builder, RECEIVER).measure(RECEIVER, RESULT).build()
}

/// A teleportation link bound to one backend.
pub struct TeleportationChannel<B> {
    backend: B,
    shots: u32,
}

impl<B: Backend> TeleportationChannel<B> {
    /// Creates a channel submitting `shots` executions per backend call.
    pub fn new(backend: B, shots: u32) -> Self {
        Self { backend, shots }
    }

    /// Shots per backend call.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// The backend this channel submits to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Releases the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Teleports `state` once, retrying up to `trial_budget` backend calls
    /// until a non-degenerate tally comes back.
    ///
    /// # Returns
    /// * The first tally with at least one sample.
    /// * The last (degenerate) tally if every attempt that reached the backend
    ///   produced zero samples.
    ///
    /// # Errors
    /// * `TeleportError::ChannelTransientFault` if no attempt produced a tally.
    /// * `TeleportError::InvalidConfig` for a zero budget.
    pub fn run(&mut self, state: &EncodedState, trial_budget: u32) -> Result<OutcomeTally, TeleportError> {
        if trial_budget == 0 {
            return Err(TeleportError::InvalidConfig {
                message: "trial budget must be at least 1".to_string(),
            });
        }

        let shots = self.shots;
        let backend = &mut self.backend;
        let outcome = retry_bounded(trial_budget, |attempt| {
            let circuit = teleportation_circuit(state);
            let counts = backend.submit(&circuit, shots)?;
            let tally = OutcomeTally::from_counts(&counts)?;
            debug!(attempt, backend = backend.name(), %tally, "channel batch complete");
            Ok(tally)
        });

        match outcome {
            Retry::Done(tally) => Ok(tally),
            Retry::Exhausted { last_tally: Some(tally), .. } => {
                warn!(trial_budget, "trial budget exhausted with a degenerate tally");
                Ok(tally)
            }
            Retry::Exhausted { last_tally: None, last_fault: Some(fault) } => {
                Err(TeleportError::ChannelTransientFault { attempts: trial_budget, last_fault: fault })
            }
            Retry::Exhausted { last_tally: None, last_fault: None } => Err(TeleportError::InvalidConfig {
                message: "channel made no attempts".to_string(),
            }),
        }
    }
}

/// Result of [`retry_bounded`].
enum Retry {
    Done(OutcomeTally),
    Exhausted {
        last_tally: Option<OutcomeTally>,
        last_fault: Option<BackendFault>,
    },
}

/// Calls `attempt` up to `budget` times, stopping at the first non-degenerate tally.
fn retry_bounded<F>(budget: u32, mut attempt: F) -> Retry
where
    F: FnMut(u32) -> Result<OutcomeTally, BackendFault>,
{
    let mut last_tally = None;
    let mut last_fault = None;
    for n in 1..=budget {
        match attempt(n) {
            Ok(tally) if !tally.is_degenerate() => return Retry::Done(tally),
            Ok(tally) => {
                warn!(attempt = n, budget, "backend returned no samples, retrying");
                last_tally = Some(tally);
            }
            Err(fault) => {
                warn!(attempt = n, budget, %fault, "backend fault, retrying");
                last_fault = Some(fault);
            }
        }
    }
    Retry::Exhausted { last_tally, last_fault }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::protocol::encoder::encode;
    use crate::simulation::Simulator;

    /// Backend that replays a fixed answer and counts how often it was asked.
    struct ScriptedBackend {
        answer: Result<Counts, BackendFault>,
        calls: u32,
    }

    impl ScriptedBackend {
        fn new(answer: Result<Counts, BackendFault>) -> Self {
            Self { answer, calls: 0 }
        }
    }

    impl Backend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn submit(&mut self, _circuit: &Circuit, _shots: u32) -> Result<Counts, BackendFault> {
            self.calls += 1;
            self.answer.clone()
        }
    }

    /// Backend that fails a fixed number of times before answering.
    struct FlakyBackend {
        failures_left: u32,
        calls: u32,
    }

    impl Backend for FlakyBackend {
        fn name(&self) -> &str {
            "flaky"
        }

        fn submit(&mut self, _circuit: &Circuit, _shots: u32) -> Result<Counts, BackendFault> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(BackendFault::Unreachable { message: "connection reset".to_string() });
            }
            Ok([("0 1 0", 3), ("1 0 1", 1)].into_iter().collect())
        }
    }

    #[test]
    fn test_tally_marginalizes_correction_bits() -> Result<(), BackendFault> {
        let counts: Counts = [("0 0 0", 10), ("0 1 1", 5), ("1 0 0", 7), ("1 1 1", 1)].into_iter().collect();
        assert_eq!(OutcomeTally::from_counts(&counts)?, OutcomeTally::new(15, 8));
        Ok(())
    }

    #[test]
    fn test_missing_keys_default_to_zero() -> Result<(), BackendFault> {
        let counts: Counts = [("1 1 0", 4)].into_iter().collect();
        let tally = OutcomeTally::from_counts(&counts)?;
        assert_eq!(tally, OutcomeTally::new(0, 4));
        assert_eq!(tally.ratio(), Some(0.0));
        Ok(())
    }

    #[test]
    fn test_malformed_key_is_a_fault() {
        let counts: Counts = [("0 0 0", 4), ("000", 1)].into_iter().collect();
        assert_eq!(
            OutcomeTally::from_counts(&counts),
            Err(BackendFault::MalformedOutcome { key: "000".to_string() })
        );
    }

    #[test]
    fn test_circuit_layout() -> Result<(), TeleportError> {
        let (state, _) = encode('A')?;
        let circuit = teleportation_circuit(&state);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(
            circuit.operations().first(),
            Some(&Operation::Initialize { target: PAYLOAD, amplitudes: state.amplitudes() })
        );
        assert_eq!(
            circuit.operations().last(),
            Some(&Operation::Measure { target: RECEIVER, clbit: RESULT })
        );
        let measurements = circuit.operations().iter().filter(|op| op.is_measurement()).count();
        assert_eq!(measurements, 3);
        Ok(())
    }

    #[test]
    fn test_zero_counts_exhaust_budget() -> Result<(), TeleportError> {
        let (state, _) = encode('A')?;
        let mut backend = ScriptedBackend::new(Ok(Counts::new()));
        let tally = TeleportationChannel::new(&mut backend, 16).run(&state, 7)?;
        assert!(tally.is_degenerate());
        assert_eq!(backend.calls, 7);
        Ok(())
    }

    #[test]
    fn test_persistent_fault_surfaces_after_budget() -> Result<(), TeleportError> {
        let (state, _) = encode('A')?;
        let fault = BackendFault::Unreachable { message: "offline".to_string() };
        let mut backend = ScriptedBackend::new(Err(fault.clone()));
        let result = TeleportationChannel::new(&mut backend, 16).run(&state, 5);
        assert_eq!(result, Err(TeleportError::ChannelTransientFault { attempts: 5, last_fault: fault }));
        assert_eq!(backend.calls, 5);
        Ok(())
    }

    #[test]
    fn test_malformed_response_is_retried() -> Result<(), TeleportError> {
        let (state, _) = encode('A')?;
        let counts: Counts = [("0 0 2", 8)].into_iter().collect();
        let mut backend = ScriptedBackend::new(Ok(counts));
        let result = TeleportationChannel::new(&mut backend, 16).run(&state, 3);
        assert!(matches!(
            result,
            Err(TeleportError::ChannelTransientFault {
                attempts: 3,
                last_fault: BackendFault::MalformedOutcome { .. }
            })
        ));
        assert_eq!(backend.calls, 3);
        Ok(())
    }

    #[test]
    fn test_retry_short_circuits_on_first_usable_tally() -> Result<(), TeleportError> {
        let (state, _) = encode('A')?;
        let mut backend = FlakyBackend { failures_left: 2, calls: 0 };
        let tally = TeleportationChannel::new(&mut backend, 16).run(&state, 10)?;
        assert_eq!(tally, OutcomeTally::new(3, 1));
        assert_eq!(backend.calls, 3);
        Ok(())
    }

    #[test]
    fn test_zero_budget_is_rejected() -> Result<(), TeleportError> {
        let (state, _) = encode('A')?;
        let mut channel = TeleportationChannel::new(Simulator::with_seed(1), 16);
        assert!(matches!(channel.run(&state, 0), Err(TeleportError::InvalidConfig { .. })));
        Ok(())
    }

    #[test]
    fn test_basis_states_teleport_exactly() -> Result<(), TeleportError> {
        let mut channel = TeleportationChannel::new(Simulator::with_seed(5), 256);

        // 0° is |0>: the receiver always reads 0.
        let (zero, _) = encode('\u{0}')?;
        assert_eq!(channel.run(&zero, 1)?, OutcomeTally::new(256, 0));

        // 90° is |1>: the receiver always reads 1.
        let (one, _) = encode('Z')?;
        assert_eq!(channel.run(&one, 1)?, OutcomeTally::new(0, 256));
        assert_eq!(channel.run(&one, 1)?.total(), u64::from(channel.shots()));
        Ok(())
    }

    #[test]
    fn test_simulated_ratio_tracks_cos_squared() -> Result<(), TeleportError> {
        let (state, _) = encode('A')?;
        let mut channel = TeleportationChannel::new(Simulator::with_seed(8), 20_000);
        let tally = channel.run(&state, 1)?;
        let ratio = tally.ratio().unwrap_or(f64::NAN);
        assert_eq!(tally.total(), 20_000);
        assert!((ratio - state.probability_of_zero()).abs() < 0.02, "ratio {}", ratio);
        Ok(())
    }
}
