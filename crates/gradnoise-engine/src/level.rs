//! Validated noise level scalar.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Perturbation intensity in `[0.0, 1.0]`.
///
/// `0.0` is the identity: every transform passes its input through without
/// consuming randomness. `1.0` is the maximal perturbation of each transform.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct NoiseLevel(f64);

impl NoiseLevel {
    /// The identity level.
    pub const ZERO: NoiseLevel = NoiseLevel(0.0);

    /// The maximal level.
    pub const FULL: NoiseLevel = NoiseLevel(1.0);

    /// Creates a noise level from a fraction.
    ///
    /// Fails with `InvalidArgument` when the value is NaN or outside `[0, 1]`.
    pub fn new(value: f64) -> EngineResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(EngineError::invalid_param(
                "noise_level",
                format!("must be within [0, 1], got {}", value),
            ));
        }
        Ok(Self(value))
    }

    /// Creates a noise level from an integer percentage (0-100).
    pub fn from_percent(percent: u8) -> EngineResult<Self> {
        if percent > 100 {
            return Err(EngineError::invalid_param(
                "noise_percent",
                format!("must be within 0..=100, got {}", percent),
            ));
        }
        Ok(Self(percent as f64 / 100.0))
    }

    /// Returns the level as a fraction.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns true for the identity level.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for NoiseLevel {
    type Error = EngineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        NoiseLevel::new(value)
    }
}

impl From<NoiseLevel> for f64 {
    fn from(level: NoiseLevel) -> f64 {
        level.0
    }
}

impl std::fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_unit_interval() {
        assert_eq!(NoiseLevel::new(0.0).unwrap(), NoiseLevel::ZERO);
        assert_eq!(NoiseLevel::new(1.0).unwrap(), NoiseLevel::FULL);
        assert_eq!(NoiseLevel::new(0.25).unwrap().value(), 0.25);
    }

    #[test]
    fn test_rejects_out_of_range() {
        for bad in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            let err = NoiseLevel::new(bad).unwrap_err();
            assert!(matches!(err, EngineError::InvalidArgument { .. }));
        }
    }

    #[test]
    fn test_from_percent() {
        assert_eq!(NoiseLevel::from_percent(50).unwrap().value(), 0.5);
        assert!(NoiseLevel::from_percent(0).unwrap().is_zero());
        assert!(NoiseLevel::from_percent(101).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(NoiseLevel::from_percent(75).unwrap().to_string(), "75%");
    }

    #[test]
    fn test_serde_validates() {
        let level: NoiseLevel = serde_json::from_str("0.5").unwrap();
        assert_eq!(level.value(), 0.5);
        assert!(serde_json::from_str::<NoiseLevel>("1.5").is_err());
    }
}
