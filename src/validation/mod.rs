// src/validation/mod.rs

//! Provides functions to validate amplitudes and state vectors.

use crate::core::constants::tolerances::NORM_TOLERANCE;
use crate::core::{SimulationError, StateVector};

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `1e-9`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(SimulationError::Incoherence)` if normalization fails.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<(), SimulationError> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm_sq = state.norm_sqr();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(SimulationError::Incoherence {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks a real single-qubit amplitude pair `[a, b]` for finiteness and unit norm.
pub fn check_amplitude_pair(amplitudes: [f64; 2], tolerance: Option<f64>) -> Result<(), SimulationError> {
    let effective_tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let [a, b] = amplitudes;
    if !a.is_finite() || !b.is_finite() {
        return Err(SimulationError::Incoherence {
            message: format!("Amplitudes [{}, {}] are not finite", a, b),
        });
    }
    let norm_sq = a * a + b * b;
    if (norm_sq - 1.0).abs() > effective_tolerance {
        return Err(SimulationError::Incoherence {
            message: format!(
                "Amplitudes [{}, {}] are not normalized: a^2 + b^2 = {}",
                a, b, norm_sq
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_amplitude_pair_unit_norm() {
        assert!(check_amplitude_pair([1.0, 0.0], None).is_ok());
        assert!(check_amplitude_pair([FRAC_1_SQRT_2, -FRAC_1_SQRT_2], None).is_ok());
        let theta = 65f64.to_radians();
        assert!(check_amplitude_pair([theta.cos(), theta.sin()], None).is_ok());
    }

    #[test]
    fn test_amplitude_pair_rejects_bad_input() {
        assert!(matches!(
            check_amplitude_pair([0.5, 0.5], None),
            Err(SimulationError::Incoherence { .. })
        ));
        assert!(check_amplitude_pair([f64::NAN, 1.0], None).is_err());
        assert!(check_amplitude_pair([0.5, 0.5], Some(0.6)).is_ok());
    }

    #[test]
    fn test_zero_state_is_normalized() {
        assert!(check_normalization(&StateVector::zero_state(3), None).is_ok());
    }
}
