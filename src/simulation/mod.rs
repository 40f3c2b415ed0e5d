// src/simulation/mod.rs

//! Executes [`Circuit`]s shot by shot on a state-vector engine.
//!
//! [`Backend`] is the seam the teleportation channel talks to: submit a
//! circuit and a shot count, get back outcome frequencies. [`Simulator`]
//! is the in-process implementation; anything that can answer with
//! [`Counts`] (a remote service, a test stub) can stand in for it.

mod results;
pub(crate) mod engine;

pub use results::Counts;

use crate::circuits::Circuit;
use crate::core::{BackendFault, SimulationError};
use engine::SimulationEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Executes circuit descriptions and reports outcome frequencies.
pub trait Backend {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    /// Runs `circuit` `shots` times and returns how often each classical
    /// readout occurred.
    fn submit(&mut self, circuit: &Circuit, shots: u32) -> Result<Counts, BackendFault>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn submit(&mut self, circuit: &Circuit, shots: u32) -> Result<Counts, BackendFault> {
        (**self).submit(circuit, shots)
    }
}

/// Seeded state-vector simulator.
///
/// Every shot replays the circuit from `|0...0>`. Operations before the
/// first measurement are deterministic, so that prefix is evolved once and
/// cloned into each shot.
#[derive(Debug)]
pub struct Simulator {
    rng: StdRng,
    seed: u64,
}

impl Simulator {
    /// Creates a simulator seeded from the thread-local generator.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates a simulator whose measurement outcomes are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this simulator started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs `circuit` for `shots` shots.
    ///
    /// # Returns
    /// * `Ok(Counts)` keyed by the classical register, highest bit first.
    ///   An empty circuit or zero shots yields empty counts.
    /// * `Err(SimulationError)` if the circuit has no classical bits to
    ///   report or an operation is invalid.
    pub fn run(&mut self, circuit: &Circuit, shots: u32) -> Result<Counts, SimulationError> {
        let mut counts = Counts::new();
        if circuit.is_empty() || shots == 0 {
            return Ok(counts);
        }
        if circuit.num_clbits() == 0 {
            return Err(SimulationError::InvalidOperation {
                message: "Circuit has no measurements, nothing to count".to_string(),
            });
        }

        let ops = circuit.operations();
        let split = ops.iter().position(|op| op.is_measurement()).unwrap_or(ops.len());

        let mut prefix = SimulationEngine::init(circuit.num_qubits(), circuit.num_clbits())?;
        for op in &ops[..split] {
            prefix.apply_operation(op, &mut self.rng)?;
        }

        for _ in 0..shots {
            let mut engine = prefix.clone();
            for op in &ops[split..] {
                engine.apply_operation(op, &mut self.rng)?;
            }
            counts.record(engine.outcome_key());
        }
        Ok(counts)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for Simulator {
    fn name(&self) -> &str {
        "statevector-simulator"
    }

    fn submit(&mut self, circuit: &Circuit, shots: u32) -> Result<Counts, BackendFault> {
        Ok(self.run(circuit, shots)?)
    }
}
