// src/lib.rs

//! `teleport_text` - Sending text through a simulated quantum teleportation channel
//!
//! Each character is mapped to a rotation angle, prepared as a single-qubit
//! state, teleported over a Bell pair and recovered from measurement
//! statistics on the receiving qubit.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod protocol;

// Re-export the most common types for easier top-level use
pub use core::{BackendFault, ClbitId, QubitId, SimulationError, TeleportError};
pub use operations::{Gate, Operation};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{Backend, Counts, Simulator};
pub use validation::{check_amplitude_pair, check_normalization};
pub use protocol::{
    decode,
    encode,
    transmit_parallel,
    EncodedState,
    FailurePolicy,
    MessagePipeline,
    OutcomeTally,
    Quadrant,
    TeleportationChannel,
    TransmitConfig,
};

// Example 1: Teleporting a basis state
// The payload |1> must arrive on the receiver qubit whatever the
// sender's measurements were.
/// ```
/// use teleport_text::{CircuitBuilder, ClbitId, Gate, QubitId, Simulator, SimulationError};
///
/// let (psi, a, b) = (QubitId(0), QubitId(1), QubitId(2));
/// let circuit = CircuitBuilder::new()
///     .x(psi)
///     .h(a)
///     .cx(a, b)
///     .cx(psi, a)
///     .h(psi)
///     .barrier()
///     .measure(psi, ClbitId(0))
///     .measure(a, ClbitId(1))
///     .c_if(Gate::PauliX, b, ClbitId(1))
///     .c_if(Gate::PauliZ, b, ClbitId(0))
///     .measure(b, ClbitId(2))
///     .build();
///
/// let mut simulator = Simulator::with_seed(7);
/// let counts = simulator.run(&circuit, 200)?;
/// println!("Circuit:\n{}", circuit);
/// println!("Counts: {}", counts);
///
/// // Every key starts with the receiver bit.
/// assert_eq!(counts.total(), 200);
/// assert!(counts.keys().all(|key| key.starts_with('1')));
/// # Ok::<(), SimulationError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Sending a word
// A seeded simulator makes the run reproducible.
/// ```
/// use teleport_text::{MessagePipeline, Simulator, TeleportError, TransmitConfig};
///
/// let config = TransmitConfig::default();
/// let mut pipeline = MessagePipeline::new(Simulator::with_seed(42), &config)?;
/// let received = pipeline.transmit_message("Qubit")?;
/// assert_eq!(received, "Qubit");
/// # Ok::<(), TeleportError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
