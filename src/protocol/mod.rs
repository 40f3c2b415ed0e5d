// src/protocol/mod.rs

//! Character teleportation: angle encoding, the three-qubit channel and
//! the statistical decoder, plus the pipeline tying them together.

pub mod channel;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod pipeline;

pub use channel::{OUTCOME_KEYS, OutcomeTally, TeleportationChannel, teleportation_circuit};
pub use config::{DEFAULT_PLACEHOLDER, FailurePolicy, TransmitConfig};
pub use decoder::{decode, principal_angle};
pub use encoder::{CharacterCode, EncodedState, MAX_CODE, Quadrant, encode};
pub use pipeline::{MessagePipeline, transmit_parallel};
