// Voice Detector Core - synthetic vs. human speech classification
// Signal-processing features, calibrated category scoring and explanations

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod fixtures;

#[cfg(feature = "http")]
pub mod http;

// Re-exports for convenience
pub use analysis::{Classification, DetectionReport, DetectionResult, VoiceDetector};
pub use audio::Waveform;
pub use config::AppConfig;

use tracing_subscriber::filter::LevelFilter;

/// Install the fmt subscriber used by the binaries
///
/// `log` records from the library are forwarded through the subscriber's
/// log bridge. Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true);
        log::debug!("[Test] logging initialised twice");
    }
}
