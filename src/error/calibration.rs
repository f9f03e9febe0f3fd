// Calibration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// Error code range: 2001-2004
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Category weights do not sum to 1.0
    pub const WEIGHTS_NOT_NORMALIZED: i32 = 2001;

    /// A threshold is NaN or infinite
    pub const NON_FINITE_THRESHOLD: i32 = 2002;

    /// Confidence floor is above the ceiling or outside [0, 1]
    pub const INVALID_CONFIDENCE_BOUNDS: i32 = 2003;

    /// A band threshold has its lower edge above its upper edge
    pub const INVERTED_BAND: i32 = 2004;
}

/// Log a calibration error with structured context
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=Scorer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised when an injected calibration is internally inconsistent
///
/// Error code range: 2001-2004
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Category weights must sum to 1.0
    WeightsNotNormalized { sum: f32 },

    /// Threshold must be a finite number
    NonFiniteThreshold { name: String },

    /// Confidence bounds must satisfy 0 <= floor <= ceiling <= 1
    InvalidConfidenceBounds { floor: f32, ceiling: f32 },

    /// Band lower edge must not exceed upper edge
    InvertedBand { name: String, low: f32, high: f32 },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::WeightsNotNormalized { .. } => {
                CalibrationErrorCodes::WEIGHTS_NOT_NORMALIZED
            }
            CalibrationError::NonFiniteThreshold { .. } => {
                CalibrationErrorCodes::NON_FINITE_THRESHOLD
            }
            CalibrationError::InvalidConfidenceBounds { .. } => {
                CalibrationErrorCodes::INVALID_CONFIDENCE_BOUNDS
            }
            CalibrationError::InvertedBand { .. } => CalibrationErrorCodes::INVERTED_BAND,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::WeightsNotNormalized { sum } => {
                format!("Category weights must sum to 1.0 (got {:.4})", sum)
            }
            CalibrationError::NonFiniteThreshold { name } => {
                format!("Threshold {} is not a finite number", name)
            }
            CalibrationError::InvalidConfidenceBounds { floor, ceiling } => format!(
                "Confidence bounds invalid: floor {} must be <= ceiling {} within [0, 1]",
                floor, ceiling
            ),
            CalibrationError::InvertedBand { name, low, high } => {
                format!("Band {} is inverted: low {} > high {}", name, low, high)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_error_codes() {
        assert_eq!(
            CalibrationError::WeightsNotNormalized { sum: 0.9 }.code(),
            CalibrationErrorCodes::WEIGHTS_NOT_NORMALIZED
        );
        assert_eq!(
            CalibrationError::NonFiniteThreshold {
                name: "jitter".to_string()
            }
            .code(),
            CalibrationErrorCodes::NON_FINITE_THRESHOLD
        );
        assert_eq!(
            CalibrationError::InvalidConfidenceBounds {
                floor: 0.9,
                ceiling: 0.5
            }
            .code(),
            CalibrationErrorCodes::INVALID_CONFIDENCE_BOUNDS
        );
        assert_eq!(
            CalibrationError::InvertedBand {
                name: "silence".to_string(),
                low: 0.3,
                high: 0.05
            }
            .code(),
            CalibrationErrorCodes::INVERTED_BAND
        );
    }

    #[test]
    fn test_calibration_error_messages() {
        let err = CalibrationError::WeightsNotNormalized { sum: 0.9 };
        assert_eq!(err.message(), "Category weights must sum to 1.0 (got 0.9000)");

        let err = CalibrationError::NonFiniteThreshold {
            name: "pitch_std_max".to_string(),
        };
        assert!(err.message().contains("pitch_std_max"));
    }

    #[test]
    fn test_calibration_error_display() {
        let err = CalibrationError::WeightsNotNormalized { sum: 1.2 };
        let display = format!("{}", err);
        assert!(display.contains("CalibrationError"));
        assert!(display.contains(&err.code().to_string()));
    }
}
