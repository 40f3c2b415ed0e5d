// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

pub use error::{BackendFault, ClbitId, QubitId, SimulationError, TeleportError};
pub use state::StateVector;

pub mod constants;
pub use constants::defaults::{DEFAULT_BATCHES, DEFAULT_SHOTS, DEFAULT_TRIAL_BUDGET};
