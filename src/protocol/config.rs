// src/protocol/config.rs

//! Settings for a transmission run.

use crate::core::{DEFAULT_BATCHES, DEFAULT_SHOTS, DEFAULT_TRIAL_BUDGET, TeleportError};

/// Replacement emitted for characters that fail under [`FailurePolicy::Placeholder`].
/// Its own ordinal is above 360, so it can never be a decoded character.
pub const DEFAULT_PLACEHOLDER: char = '\u{FFFD}';

/// What to do when one character cannot be encoded, teleported or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Emit the given character in place of the failed one and keep going.
    Placeholder(char),
    /// Stop at the first failure and report it.
    Abort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Placeholder(DEFAULT_PLACEHOLDER)
    }
}

/// Knobs for [`MessagePipeline`](super::pipeline::MessagePipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitConfig {
    /// Circuit executions per backend call.
    pub shots: u32,
    /// Backend calls allowed per batch before the batch is given up.
    pub trial_budget: u32,
    /// Batches accumulated per character before decoding.
    pub batches: u32,
    /// Worker threads used by `transmit_parallel`.
    pub workers: usize,
    /// Handling of per-character failures.
    pub failure_policy: FailurePolicy,
    /// Base seed for simulator backends. `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            shots: DEFAULT_SHOTS,
            trial_budget: DEFAULT_TRIAL_BUDGET,
            batches: DEFAULT_BATCHES,
            workers: 1,
            failure_policy: FailurePolicy::default(),
            seed: None,
        }
    }
}

impl TransmitConfig {
    /// Rejects settings that would make every transmission degenerate.
    pub fn validate(&self) -> Result<(), TeleportError> {
        let zero_field = [
            ("shots", self.shots == 0),
            ("trial_budget", self.trial_budget == 0),
            ("batches", self.batches == 0),
            ("workers", self.workers == 0),
        ]
        .into_iter()
        .find(|(_, is_zero)| *is_zero);

        if let Some((name, _)) = zero_field {
            return Err(TeleportError::InvalidConfig {
                message: format!("{} must be at least 1", name),
            });
        }
        Ok(())
    }
}
