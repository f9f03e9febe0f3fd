// Audio intake error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Single source of truth for the numeric codes reported by the CLI and the
/// HTTP service.
///
/// Error code range: 1001-1004
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// Recording is shorter than the minimum analysable duration
    pub const TOO_SHORT: i32 = 1001;

    /// Recording is longer than the maximum analysable duration
    pub const TOO_LONG: i32 = 1002;

    /// Recording peak amplitude is below the silence floor
    pub const SILENT: i32 = 1003;

    /// Container could not be decoded into PCM samples
    pub const DECODE_FAILURE: i32 = 1004;
}

/// Log an audio error with structured context
///
/// Emits the numeric code, the originating component and the message so
/// rejected requests can be correlated in logs.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=AudioIntake, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio intake errors
///
/// Raised by decoding and validation before a waveform reaches the
/// feature extractor.
///
/// Error code range: 1001-1004
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Duration below the configured minimum
    TooShort { duration_secs: f32, min_secs: f32 },

    /// Duration above the configured maximum
    TooLong { duration_secs: f32, max_secs: f32 },

    /// Peak absolute amplitude below the silence floor
    Silent { peak: f32 },

    /// Bytes could not be decoded into samples
    DecodeFailure { reason: String },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::TooShort { .. } => AudioErrorCodes::TOO_SHORT,
            AudioError::TooLong { .. } => AudioErrorCodes::TOO_LONG,
            AudioError::Silent { .. } => AudioErrorCodes::SILENT,
            AudioError::DecodeFailure { .. } => AudioErrorCodes::DECODE_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::TooShort {
                duration_secs,
                min_secs,
            } => format!(
                "Audio too short ({:.2}s). Minimum {} seconds required.",
                duration_secs, min_secs
            ),
            AudioError::TooLong {
                duration_secs,
                max_secs,
            } => format!(
                "Audio too long ({:.1}s). Maximum {} seconds allowed.",
                duration_secs, max_secs
            ),
            AudioError::Silent { peak } => format!(
                "Audio appears to be silent or corrupted (peak amplitude {:.5}).",
                peak
            ),
            AudioError::DecodeFailure { reason } => {
                format!("Failed to decode audio: {}", reason)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::DecodeFailure {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::DecodeFailure {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_codes() {
        assert_eq!(
            AudioError::TooShort {
                duration_secs: 0.1,
                min_secs: 0.5
            }
            .code(),
            AudioErrorCodes::TOO_SHORT
        );
        assert_eq!(
            AudioError::TooLong {
                duration_secs: 301.0,
                max_secs: 300.0
            }
            .code(),
            AudioErrorCodes::TOO_LONG
        );
        assert_eq!(
            AudioError::Silent { peak: 0.0 }.code(),
            AudioErrorCodes::SILENT
        );
        assert_eq!(
            AudioError::DecodeFailure {
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::DECODE_FAILURE
        );
    }

    #[test]
    fn test_audio_error_messages() {
        let err = AudioError::TooShort {
            duration_secs: 0.2,
            min_secs: 0.5,
        };
        assert_eq!(
            err.message(),
            "Audio too short (0.20s). Minimum 0.5 seconds required."
        );

        let err = AudioError::TooLong {
            duration_secs: 400.0,
            max_secs: 300.0,
        };
        assert_eq!(
            err.message(),
            "Audio too long (400.0s). Maximum 300 seconds allowed."
        );

        let err = AudioError::Silent { peak: 0.0 };
        assert!(err.message().contains("silent"));

        let err = AudioError::DecodeFailure {
            reason: "bad header".to_string(),
        };
        assert_eq!(err.message(), "Failed to decode audio: bad header");
    }

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::Silent { peak: 0.0 };
        let display = format!("{}", err);
        assert!(display.contains("AudioError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("test io error");
        let audio_err: AudioError = io_err.into();
        match audio_err {
            AudioError::DecodeFailure { reason } => {
                assert!(reason.contains("test io error"));
            }
            _ => panic!("Expected DecodeFailure"),
        }
    }
}
