// src/protocol/decoder.rs

//! Recovers characters from outcome tallies.

use super::channel::OutcomeTally;
use super::encoder::Quadrant;
use crate::core::TeleportError;

/// `round(degrees(acos(sqrt(ratio))))` for a ratio in `[0, 1]`.
///
/// The ratio estimates `cos² θ`, so the result is the angle folded into
/// `[0, 90]`. Ratios are clamped first so sampling noise past the ends
/// cannot produce NaN.
pub fn principal_angle(ratio: f64) -> u32 {
    ratio.clamp(0.0, 1.0).sqrt().acos().to_degrees().round() as u32
}

/// Decodes a tally back into a character, using `quadrant` to undo the fold.
///
/// # Errors
/// * `TeleportError::DecodeDegenerate` if the tally has no samples.
/// * `TeleportError::DecodeRange` if the unfolded angle is not a scalar value.
pub fn decode(tally: &OutcomeTally, quadrant: Quadrant) -> Result<char, TeleportError> {
    let ratio = tally.ratio().ok_or(TeleportError::DecodeDegenerate {
        bit0: tally.bit0,
        bit1: tally.bit1,
    })?;
    let degrees = quadrant.unfold(principal_angle(ratio));
    char::from_u32(degrees).ok_or(TeleportError::DecodeRange { degrees })
}
