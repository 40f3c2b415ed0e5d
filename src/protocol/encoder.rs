// src/protocol/encoder.rs

//! Maps characters onto real single-qubit states.
//!
//! A character's ordinal is read directly as an angle in degrees, so only
//! ordinals `0..=360` are encodable. The state is `cos θ |0> + sin θ |1>`.
//! Measuring it only reveals `cos² θ`, which cannot tell the four
//! quadrants apart, so the quadrant travels alongside the state.

use crate::core::TeleportError;
use crate::validation::check_amplitude_pair;
use std::fmt;

/// Largest encodable ordinal, in degrees.
pub const MAX_CODE: u32 = 360;

/// A character ordinal validated to lie in `0..=360`, read as degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterCode(u16);

impl CharacterCode {
    /// Validates the ordinal of `character`.
    pub fn from_char(character: char) -> Result<Self, TeleportError> {
        let ordinal = u32::from(character);
        if ordinal > MAX_CODE {
            return Err(TeleportError::EncodingDomain { character, ordinal });
        }
        Ok(Self(ordinal as u16))
    }

    /// The code in degrees.
    pub fn degrees(&self) -> u32 {
        u32::from(self.0)
    }

    /// The code in radians.
    pub fn radians(&self) -> f64 {
        f64::from(self.0).to_radians()
    }
}

/// 90° bucket of the encoding range, inclusive at the upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// `[0, 90]`
    First,
    /// `(90, 180]`
    Second,
    /// `(180, 270]`
    Third,
    /// `(270, 360]`
    Fourth,
}

impl Quadrant {
    /// Quadrant containing `code`.
    pub fn of(code: CharacterCode) -> Self {
        match code.degrees() {
            0..=90 => Quadrant::First,
            91..=180 => Quadrant::Second,
            181..=270 => Quadrant::Third,
            _ => Quadrant::Fourth,
        }
    }

    /// Quadrant number, 1 through 4.
    pub fn number(&self) -> u8 {
        match self {
            Quadrant::First => 1,
            Quadrant::Second => 2,
            Quadrant::Third => 3,
            Quadrant::Fourth => 4,
        }
    }

    /// Maps a principal angle in `[0, 90]` back into this quadrant.
    pub fn unfold(&self, principal: u32) -> u32 {
        match self {
            Quadrant::First => principal,
            Quadrant::Second => 180 - principal,
            Quadrant::Third => 180 + principal,
            Quadrant::Fourth => 360 - principal,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// Real amplitude pair `(cos θ, sin θ)` prepared on the payload qubit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedState {
    alpha: f64,
    beta: f64,
}

impl EncodedState {
    /// The state for angle `code`.
    pub fn from_code(code: CharacterCode) -> Result<Self, TeleportError> {
        let theta = code.radians();
        let state = Self { alpha: theta.cos(), beta: theta.sin() };
        check_amplitude_pair(state.amplitudes(), None)?;
        Ok(state)
    }

    /// Amplitude of `|0>`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Amplitude of `|1>`.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// `[alpha, beta]`, the form `Operation::Initialize` takes.
    pub fn amplitudes(&self) -> [f64; 2] {
        [self.alpha, self.beta]
    }

    /// Probability of reading `|0>` from this state, `cos² θ`.
    pub fn probability_of_zero(&self) -> f64 {
        self.alpha * self.alpha
    }
}

impl fmt::Display for EncodedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.alpha, self.beta)
    }
}

/// Encodes one character into its state and the quadrant needed to decode it.
///
/// # Errors
/// `TeleportError::EncodingDomain` if the ordinal exceeds 360.
pub fn encode(character: char) -> Result<(EncodedState, Quadrant), TeleportError> {
    let code = CharacterCode::from_char(character)?;
    Ok((EncodedState::from_code(code)?, Quadrant::of(code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-4;

    fn char_at(ordinal: u32) -> char {
        char::from_u32(ordinal).expect("ordinals up to 360 are valid chars")
    }

    #[test]
    fn test_quadrant_boundaries_are_inclusive_upper() -> Result<(), TeleportError> {
        let cases = [
            (0, Quadrant::First),
            (90, Quadrant::First),
            (91, Quadrant::Second),
            (180, Quadrant::Second),
            (181, Quadrant::Third),
            (270, Quadrant::Third),
            (271, Quadrant::Fourth),
            (360, Quadrant::Fourth),
        ];
        for (ordinal, expected) in cases {
            let (_, quadrant) = encode(char_at(ordinal))?;
            assert_eq!(quadrant, expected, "ordinal {}", ordinal);
        }
        Ok(())
    }

    #[test]
    fn test_encode_uppercase_a() -> Result<(), TeleportError> {
        let (state, quadrant) = encode('A')?;
        assert_eq!(quadrant, Quadrant::First);
        assert!((state.alpha() - 0.4226).abs() < TOL, "alpha = {}", state.alpha());
        assert!((state.beta() - 0.9063).abs() < TOL, "beta = {}", state.beta());
        assert!((state.probability_of_zero() - 0.1786).abs() < TOL);
        Ok(())
    }

    #[test]
    fn test_encode_tilde_is_second_quadrant() -> Result<(), TeleportError> {
        let (state, quadrant) = encode('~')?;
        assert_eq!(quadrant, Quadrant::Second);
        assert!(state.alpha() < 0.0 && state.beta() > 0.0);
        Ok(())
    }

    #[test]
    fn test_states_have_unit_norm() -> Result<(), TeleportError> {
        for ordinal in 0..=MAX_CODE {
            let (state, _) = encode(char_at(ordinal))?;
            let norm = state.alpha().powi(2) + state.beta().powi(2);
            assert!((norm - 1.0).abs() < 1e-12, "ordinal {} norm {}", ordinal, norm);
        }
        Ok(())
    }

    #[test]
    fn test_ordinal_above_range_is_rejected() {
        let result = encode(char_at(361));
        assert_eq!(
            result,
            Err(TeleportError::EncodingDomain { character: char_at(361), ordinal: 361 })
        );
        assert!(matches!(encode('é'), Ok(_)));
        assert!(matches!(encode('€'), Err(TeleportError::EncodingDomain { ordinal: 0x20AC, .. })));
    }

    #[test]
    fn test_unfold_inverts_each_quadrant() {
        assert_eq!(Quadrant::First.unfold(65), 65);
        assert_eq!(Quadrant::Second.unfold(54), 126);
        assert_eq!(Quadrant::Third.unfold(20), 200);
        assert_eq!(Quadrant::Fourth.unfold(0), 360);
    }
}
