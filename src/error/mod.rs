// Error types for the voice detector
//
// This module defines custom error types for audio intake and calibration
// configuration. The analysis core itself is infallible on validated input;
// these errors cover the boundary layers around it.

mod audio;
mod calibration;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error payloads across
/// the CLI and HTTP boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
