// Temporal module - Time-domain feature extraction
//
// This module computes features directly from the waveform: framewise
// zero-crossing rate and RMS energy, and the per-sample silence ratio.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::stats::{coefficient_of_variation, mean, safe_ratio, std_dev};
use super::types::{FeatureName, FeatureVector};

/// Temporal feature computation functions
pub struct TemporalFeatures {
    frame_length: usize,
    hop_length: usize,
    silence_threshold: f32,
}

impl TemporalFeatures {
    /// Create a new temporal features processor
    ///
    /// # Arguments
    /// * `frame_length` - Analysis frame length in samples
    /// * `hop_length` - Samples between frame centres
    /// * `silence_threshold` - Fraction of the global peak below which a sample is silent
    pub fn new(frame_length: usize, hop_length: usize, silence_threshold: f32) -> Self {
        Self {
            frame_length: frame_length.max(1),
            hop_length: hop_length.max(1),
            silence_threshold,
        }
    }

    /// Record ZCR, RMS and silence descriptors
    pub fn describe(&self, audio: &[f32], features: &mut FeatureVector) {
        let zcr = self.frame_zcr(audio);
        features.insert(FeatureName::ZcrMean, mean(&zcr));
        features.insert(FeatureName::ZcrStd, std_dev(&zcr));

        let rms = self.frame_rms(audio);
        features.insert(FeatureName::RmsMean, mean(&rms));
        features.insert(FeatureName::RmsStd, std_dev(&rms));
        features.insert(FeatureName::RmsCv, coefficient_of_variation(&rms));

        features.insert(FeatureName::SilenceRatio, self.compute_silence_ratio(audio));
    }

    /// Compute zero-crossing rate of one frame
    ///
    /// A crossing is counted wherever consecutive samples fall on opposite
    /// sides of zero (zero itself counts as positive).
    ///
    /// # Returns
    /// Crossings divided by frame length (0.0 to 1.0)
    pub fn compute_zcr(&self, frame: &[f32]) -> f32 {
        if frame.len() < 2 {
            return 0.0;
        }

        let crossings = frame
            .windows(2)
            .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
            .count();

        crossings as f32 / frame.len() as f32
    }

    /// Zero-crossing rate of every centred frame (edge-padded)
    pub fn frame_zcr(&self, audio: &[f32]) -> Vec<f32> {
        let Some((&first, &last)) = audio.first().zip(audio.last()) else {
            return Vec::new();
        };
        let pad = self.frame_length / 2;
        let mut padded = Vec::with_capacity(audio.len() + 2 * pad);
        padded.extend(std::iter::repeat(first).take(pad));
        padded.extend_from_slice(audio);
        padded.extend(std::iter::repeat(last).take(pad));

        self.frames(&padded, audio.len())
            .map(|frame| self.compute_zcr(frame))
            .collect()
    }

    /// RMS energy of every centred frame (zero-padded)
    pub fn frame_rms(&self, audio: &[f32]) -> Vec<f32> {
        if audio.is_empty() {
            return Vec::new();
        }
        let pad = self.frame_length / 2;
        let mut padded = vec![0.0f32; audio.len() + 2 * pad];
        padded[pad..pad + audio.len()].copy_from_slice(audio);

        self.frames(&padded, audio.len())
            .map(|frame| {
                let energy: f32 = frame.iter().map(|&x| x * x).sum();
                (energy / self.frame_length as f32).sqrt()
            })
            .collect()
    }

    /// Fraction of samples whose magnitude is below `silence_threshold × peak`
    pub fn compute_silence_ratio(&self, audio: &[f32]) -> f32 {
        let peak = audio.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let threshold = self.silence_threshold * peak;
        let silent = audio.iter().filter(|&&x| x.abs() < threshold).count();

        safe_ratio(silent as f32, audio.len() as f32, 0.0)
    }

    fn frames<'a>(&self, padded: &'a [f32], len: usize) -> impl Iterator<Item = &'a [f32]> + 'a {
        let n_frames = 1 + len / self.hop_length;
        let frame_length = self.frame_length;
        let hop = self.hop_length;
        (0..n_frames).filter_map(move |t| padded.get(t * hop..t * hop + frame_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temporal() -> TemporalFeatures {
        TemporalFeatures::new(2048, 512, 0.02)
    }

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / 16_000.0).sin())
            .collect()
    }

    #[test]
    fn test_zcr_tracks_frequency() {
        let t = temporal();
        let low = t.compute_zcr(&sine(100.0, 2048));
        let high = t.compute_zcr(&sine(2000.0, 2048));
        assert!(low < 0.05, "Expected low ZCR for 100 Hz, got {}", low);
        assert!(high > low * 10.0, "Expected high ZCR for 2 kHz, got {}", high);
    }

    #[test]
    fn test_frame_counts_are_centred() {
        let t = temporal();
        let audio = sine(200.0, 16_000);
        assert_eq!(t.frame_zcr(&audio).len(), 1 + 16_000 / 512);
        assert_eq!(t.frame_rms(&audio).len(), 1 + 16_000 / 512);
    }

    #[test]
    fn test_steady_tone_has_flat_rms() {
        let t = temporal();
        let rms = t.frame_rms(&sine(200.0, 32_000));
        let interior = &rms[4..rms.len() - 4];
        let cv = coefficient_of_variation(interior);
        assert!(cv < 0.01, "Expected near-constant RMS, got cv {}", cv);
        assert!((mean(interior) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn test_silence_ratio_counts_samples() {
        let t = temporal();
        let mut audio = vec![1.0f32; 800];
        audio.extend(vec![0.0f32; 200]);
        assert!((t.compute_silence_ratio(&audio) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_all_zero_input_is_zero_filled() {
        let t = temporal();
        let mut features = FeatureVector::new();
        t.describe(&vec![0.0; 4096], &mut features);
        assert_eq!(features.get(FeatureName::RmsCv), 0.0);
        assert_eq!(features.get(FeatureName::ZcrMean), 0.0);
        assert_eq!(features.get(FeatureName::SilenceRatio), 0.0);
    }
}
