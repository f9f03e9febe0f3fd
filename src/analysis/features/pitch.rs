// Pitch module - Fundamental frequency tracking from the magnitude spectrogram
//
// Each frame's candidates are local spectral maxima inside the voice band
// that exceed a fraction of the frame's loudest bin. Peak frequency and
// height are refined by parabolic interpolation and the strongest candidate
// becomes the frame's pitch. Frames without a candidate are unvoiced.

use super::stats::{coefficient_of_variation, mean, range, safe_ratio, std_dev};
use super::types::{FeatureName, FeatureVector};

/// Spectral-peak pitch tracker
pub struct PitchTracker {
    sample_rate: u32,
    n_fft: usize,
    fmin: f32,
    fmax: f32,
    threshold: f32,
    min_voiced_frames: usize,
    jump_hz: f32,
}

impl PitchTracker {
    pub fn new(
        sample_rate: u32,
        n_fft: usize,
        fmin: f32,
        fmax: f32,
        threshold: f32,
        min_voiced_frames: usize,
        jump_hz: f32,
    ) -> Self {
        Self {
            sample_rate,
            n_fft,
            fmin,
            fmax,
            threshold,
            min_voiced_frames,
            jump_hz,
        }
    }

    #[inline]
    fn bin_frequency(&self, k: f32) -> f32 {
        k * self.sample_rate as f32 / self.n_fft as f32
    }

    /// Pitch of one magnitude frame in Hz, or `None` when unvoiced
    pub fn frame_pitch(&self, spectrum: &[f32]) -> Option<f32> {
        if spectrum.len() < 3 {
            return None;
        }
        let frame_max = spectrum.iter().copied().fold(0.0f32, f32::max);
        let reference = self.threshold * frame_max;
        let gated = |i: usize| {
            let s = spectrum[i];
            if s > reference {
                s
            } else {
                0.0
            }
        };

        let mut best: Option<(f32, f32)> = None;
        for i in 1..spectrum.len() - 1 {
            let freq = self.bin_frequency(i as f32);
            if freq < self.fmin || freq >= self.fmax {
                continue;
            }
            let centre = gated(i);
            if !(centre > gated(i - 1) && centre >= gated(i + 1)) {
                continue;
            }

            let (left, mid, right) = (spectrum[i - 1], spectrum[i], spectrum[i + 1]);
            let avg = 0.5 * (right - left);
            let curvature = 2.0 * mid - right - left;
            let shift = if curvature.abs() < f32::MIN_POSITIVE {
                0.0
            } else {
                avg / curvature
            };
            let magnitude = mid + 0.5 * avg * shift;
            let pitch = self.bin_frequency(i as f32 + shift);

            if pitch > 0.0 && best.map_or(true, |(_, m)| magnitude > m) {
                best = Some((pitch, magnitude));
            }
        }

        best.map(|(pitch, _)| pitch)
    }

    /// Pitch of every voiced frame, in frame order
    pub fn track(&self, magnitudes: &[Vec<f32>]) -> Vec<f32> {
        magnitudes
            .iter()
            .filter_map(|frame| self.frame_pitch(frame))
            .collect()
    }

    /// Record pitch statistics; all zero below `min_voiced_frames` voiced frames
    pub fn describe(&self, magnitudes: &[Vec<f32>], features: &mut FeatureVector) {
        let pitches = self.track(magnitudes);

        if pitches.len() < self.min_voiced_frames.max(2) {
            for name in [
                FeatureName::PitchMean,
                FeatureName::PitchStd,
                FeatureName::PitchRange,
                FeatureName::PitchCv,
                FeatureName::PitchJumps,
            ] {
                features.insert(name, 0.0);
            }
            return;
        }

        let jumps = pitches
            .windows(2)
            .filter(|pair| (pair[1] - pair[0]).abs() > self.jump_hz)
            .count();

        features.insert(FeatureName::PitchMean, mean(&pitches));
        features.insert(FeatureName::PitchStd, std_dev(&pitches));
        features.insert(FeatureName::PitchRange, range(&pitches));
        features.insert(FeatureName::PitchCv, coefficient_of_variation(&pitches));
        features.insert(
            FeatureName::PitchJumps,
            safe_ratio(jumps as f32, (pitches.len() - 1) as f32, 0.0),
        );
    }
}
