//! Constants shared by the simulator and the transmission protocol.

/// Reference values for a transmission run.
pub mod defaults {
    /// Channel invocations allowed per batch before giving up on a character.
    pub const DEFAULT_TRIAL_BUDGET: u32 = 100;
    /// Executions of the teleportation circuit per backend submission.
    pub const DEFAULT_SHOTS: u32 = 1024;
    /// Successful batches accumulated per character before decoding.
    pub const DEFAULT_BATCHES: u32 = 100;
}

/// Tolerances used when checking amplitudes.
pub mod tolerances {
    /// Allowed deviation of a squared norm from 1.0.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Squared amplitudes below this are treated as zero.
    pub const AMPLITUDE_TOLERANCE: f64 = 1e-12;
}
