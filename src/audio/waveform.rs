// Waveform - validated mono samples at a known sample rate

use crate::config::DetectorConfig;
use crate::error::AudioError;

/// Immutable mono recording
///
/// Samples are nominally in [-1, 1]. A waveform built through
/// [`Waveform::new`] satisfies the duration and loudness bounds of the
/// detector configuration; [`Waveform::unchecked`] skips them.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Validate and wrap samples
    ///
    /// # Arguments
    /// * `samples` - Mono samples
    /// * `sample_rate` - Sample rate in Hz
    /// * `config` - Duration bounds and silence floor
    ///
    /// # Returns
    /// `TooShort`, `TooLong` or `Silent` (checked in that order), or
    /// `DecodeFailure` for a zero sample rate
    pub fn new(
        samples: Vec<f32>,
        sample_rate: u32,
        config: &DetectorConfig,
    ) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::DecodeFailure {
                reason: "sample rate is zero".to_string(),
            });
        }

        let waveform = Self::unchecked(samples, sample_rate);
        let duration_secs = waveform.duration_secs();

        if duration_secs < config.min_duration_secs {
            return Err(AudioError::TooShort {
                duration_secs,
                min_secs: config.min_duration_secs,
            });
        }
        if duration_secs > config.max_duration_secs {
            return Err(AudioError::TooLong {
                duration_secs,
                max_secs: config.max_duration_secs,
            });
        }

        let peak = waveform.peak();
        if peak < config.min_peak {
            return Err(AudioError::Silent { peak });
        }

        Ok(waveform)
    }

    /// Wrap samples without validation
    pub fn unchecked(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn tone(seconds: f32, amplitude: f32) -> Vec<f32> {
        let len = (16_000.0 * seconds) as usize;
        (0..len)
            .map(|i| amplitude * (i as f32 * 0.05).sin())
            .collect()
    }

    #[test]
    fn test_valid_waveform() {
        let waveform = Waveform::new(tone(1.0, 0.5), 16_000, &DetectorConfig::default())
            .expect("one second tone should validate");
        assert_eq!(waveform.samples().len(), 16_000);
        assert_eq!(waveform.duration_secs(), 1.0);
        assert!((waveform.peak() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_duration_bounds() {
        let config = DetectorConfig::default();

        match Waveform::new(tone(0.4, 0.5), 16_000, &config) {
            Err(AudioError::TooShort {
                duration_secs,
                min_secs,
            }) => {
                assert!((duration_secs - 0.4).abs() < 1e-6);
                assert_eq!(min_secs, 0.5);
            }
            other => panic!("Expected TooShort, got {:?}", other),
        }

        // exactly the minimum is accepted
        assert!(Waveform::new(tone(0.5, 0.5), 16_000, &config).is_ok());

        let long = vec![0.1; 16_000 * 301];
        assert!(matches!(
            Waveform::new(long, 16_000, &config),
            Err(AudioError::TooLong { .. })
        ));
    }

    #[test]
    fn test_error_messages_use_configured_bounds() {
        let config = DetectorConfig {
            min_duration_secs: 2.0,
            max_duration_secs: 10.0,
            ..DetectorConfig::default()
        };

        let short = Waveform::new(tone(1.0, 0.5), 16_000, &config).unwrap_err();
        assert!(
            short.message().contains("Minimum 2 seconds"),
            "{}",
            short.message()
        );

        let long = Waveform::new(tone(11.0, 0.5), 16_000, &config).unwrap_err();
        assert!(
            long.message().contains("Maximum 10 seconds"),
            "{}",
            long.message()
        );
    }

    #[test]
    fn test_silent_waveform_rejected() {
        let config = DetectorConfig::default();
        match Waveform::new(vec![0.0005; 16_000], 16_000, &config) {
            Err(AudioError::Silent { peak }) => assert_eq!(peak, 0.0005),
            other => panic!("Expected Silent, got {:?}", other),
        }
        assert!(Waveform::new(vec![0.001; 16_000], 16_000, &config).is_ok());
    }

    #[test]
    fn test_short_check_precedes_silence() {
        let result = Waveform::new(vec![0.0; 100], 16_000, &DetectorConfig::default());
        assert!(matches!(result, Err(AudioError::TooShort { .. })));
    }

    #[test]
    fn test_zero_sample_rate() {
        let result = Waveform::new(vec![0.5; 100], 0, &DetectorConfig::default());
        assert!(matches!(result, Err(AudioError::DecodeFailure { .. })));
        assert_eq!(Waveform::unchecked(vec![0.5; 100], 0).duration_secs(), 0.0);
    }
}
