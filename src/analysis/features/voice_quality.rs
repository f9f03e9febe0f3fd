// Voice quality module - Harmonicity and micro-variation descriptors
//
// Harmonic/percussive separation median-filters the magnitude spectrogram
// along time (sustained partials) and along frequency (broadband events),
// builds Wiener soft masks from the two estimates, and resynthesises each
// masked component. The energy ratio of the two signals measures how clean
// the recording is. Jitter is the mean relative change of short-frame
// energy; shimmer reuses the RMS coefficient of variation.
//
// References:
// - Fitzgerald, D. (2010). Harmonic/percussive separation using median filtering

use rustfft::num_complex::Complex;

use super::fft::{FftProcessor, Spectrogram};
use super::stats::{mean, median, safe_ratio};
use super::types::{FeatureName, FeatureVector};

/// Denominators below this leave the soft mask at zero
const MASK_EPSILON: f32 = 1e-20;

/// Voice quality feature computation functions
pub struct VoiceQualityFeatures {
    kernel: usize,
    ratio_cap: f32,
    jitter_frame: usize,
    jitter_hop: usize,
}

impl VoiceQualityFeatures {
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `kernel` - Median filter length in frames and in bins
    /// * `ratio_cap` - Upper bound of the harmonic-to-percussive ratio
    /// * `jitter_frame_ms` / `jitter_hop_ms` - Short-frame energy framing
    pub fn new(
        sample_rate: u32,
        kernel: usize,
        ratio_cap: f32,
        jitter_frame_ms: f32,
        jitter_hop_ms: f32,
    ) -> Self {
        let to_samples = |ms: f32| ((ms / 1000.0) * sample_rate as f32) as usize;
        Self {
            kernel: kernel.max(1),
            ratio_cap,
            jitter_frame: to_samples(jitter_frame_ms).max(1),
            jitter_hop: to_samples(jitter_hop_ms).max(1),
        }
    }

    /// Record harmonic ratio, jitter and shimmer
    ///
    /// `rms_cv` must already be computed by the temporal pass.
    pub fn describe(
        &self,
        audio: &[f32],
        spectrogram: &Spectrogram,
        magnitudes: &[Vec<f32>],
        fft: &FftProcessor,
        rms_cv: f32,
        features: &mut FeatureVector,
    ) {
        features.insert(
            FeatureName::HarmonicRatio,
            self.compute_harmonic_ratio(audio.len(), spectrogram, magnitudes, fft),
        );
        features.insert(FeatureName::Jitter, self.compute_jitter(audio));
        features.insert(FeatureName::Shimmer, rms_cv);
    }

    /// Energy of the harmonic component over the percussive one, capped
    ///
    /// A silent percussive component yields the cap.
    pub fn compute_harmonic_ratio(
        &self,
        length: usize,
        spectrogram: &Spectrogram,
        magnitudes: &[Vec<f32>],
        fft: &FftProcessor,
    ) -> f32 {
        let (harmonic_mask, percussive_mask) = self.soft_masks(magnitudes);

        let apply = |masks: &[Vec<f32>]| -> Vec<Vec<Complex<f32>>> {
            spectrogram
                .frames
                .iter()
                .zip(masks)
                .map(|(frame, mask)| frame.iter().zip(mask).map(|(&c, &m)| c * m).collect())
                .collect()
        };

        let harmonic = fft.istft(&apply(&harmonic_mask), length);
        let percussive = fft.istft(&apply(&percussive_mask), length);

        let energy = |signal: &[f32]| signal.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>();
        let h_energy = energy(&harmonic) as f32;
        let p_energy = energy(&percussive) as f32;

        safe_ratio(h_energy, p_energy, self.ratio_cap).min(self.ratio_cap)
    }

    /// Wiener masks (power 2) for the harmonic and percussive components
    fn soft_masks(&self, magnitudes: &[Vec<f32>]) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let harmonic = median_filter_time(magnitudes, self.kernel);
        let percussive = median_filter_frequency(magnitudes, self.kernel);

        let mut harmonic_mask = Vec::with_capacity(magnitudes.len());
        let mut percussive_mask = Vec::with_capacity(magnitudes.len());
        for (h_frame, p_frame) in harmonic.iter().zip(&percussive) {
            let (h_row, p_row): (Vec<f32>, Vec<f32>) = h_frame
                .iter()
                .zip(p_frame)
                .map(|(&h, &p)| {
                    let (h2, p2) = (h * h, p * p);
                    let total = h2 + p2;
                    if total < MASK_EPSILON {
                        (0.0, 0.0)
                    } else {
                        (h2 / total, p2 / total)
                    }
                })
                .unzip();
            harmonic_mask.push(h_row);
            percussive_mask.push(p_row);
        }
        (harmonic_mask, percussive_mask)
    }

    /// Mean absolute change of short-frame energy relative to its mean, capped at 1
    pub fn compute_jitter(&self, audio: &[f32]) -> f32 {
        if audio.len() <= self.jitter_frame {
            return 0.0;
        }

        let n_frames = 1 + (audio.len() - self.jitter_frame) / self.jitter_hop;
        let energies: Vec<f32> = (0..n_frames)
            .map(|t| {
                let start = t * self.jitter_hop;
                audio[start..start + self.jitter_frame]
                    .iter()
                    .map(|&x| x * x)
                    .sum()
            })
            .collect();
        if energies.len() < 2 {
            return 0.0;
        }

        let changes: Vec<f32> = energies.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        safe_ratio(mean(&changes), mean(&energies), 0.0).min(1.0)
    }
}

/// Reflect-mode index (`d c b a | a b c d | d c b a`)
#[inline]
fn reflect(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - 1 - i;
    }
    i as usize
}

/// Median over a window of `kernel` frames for every bin
fn median_filter_time(magnitudes: &[Vec<f32>], kernel: usize) -> Vec<Vec<f32>> {
    let n_frames = magnitudes.len();
    let half = (kernel / 2) as isize;
    let mut window = vec![0.0f32; kernel];

    magnitudes
        .iter()
        .enumerate()
        .map(|(t, frame)| {
            (0..frame.len())
                .map(|k| {
                    for (slot, offset) in window.iter_mut().zip(-half..) {
                        *slot = magnitudes[reflect(t as isize + offset, n_frames)][k];
                    }
                    median(&mut window)
                })
                .collect()
        })
        .collect()
}

/// Median over a window of `kernel` bins within every frame
fn median_filter_frequency(magnitudes: &[Vec<f32>], kernel: usize) -> Vec<Vec<f32>> {
    let half = (kernel / 2) as isize;
    let mut window = vec![0.0f32; kernel];

    magnitudes
        .iter()
        .map(|frame| {
            let n_bins = frame.len();
            (0..n_bins)
                .map(|k| {
                    for (slot, offset) in window.iter_mut().zip(-half..) {
                        *slot = frame[reflect(k as isize + offset, n_bins)];
                    }
                    median(&mut window)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 16_000;
    const FFT_SIZE: usize = 2048;
    const HOP_SIZE: usize = 512;

    fn quality() -> VoiceQualityFeatures {
        VoiceQualityFeatures::new(SR, 31, 100.0, 25.0, 10.0)
    }

    fn harmonic_ratio_of(signal: &[f32]) -> f32 {
        let fft = FftProcessor::new(FFT_SIZE, HOP_SIZE);
        let spectrogram = fft.stft(signal);
        let magnitudes = spectrogram.magnitudes();
        quality().compute_harmonic_ratio(signal.len(), &spectrogram, &magnitudes, &fft)
    }

    #[test]
    fn test_reflect_indexing() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(6, 5), 3);
        assert_eq!(reflect(2, 5), 2);
    }

    #[test]
    fn test_sustained_tone_is_harmonic() {
        let tone: Vec<f32> = (0..32_000)
            .map(|i| 0.8 * (2.0 * std::f32::consts::PI * 200.0 * i as f32 / SR as f32).sin())
            .collect();
        let ratio = harmonic_ratio_of(&tone);
        assert!(ratio > 50.0, "Expected tone to be strongly harmonic, got {}", ratio);
    }

    #[test]
    fn test_clicks_are_percussive() {
        let mut clicks = vec![0.0f32; 32_000];
        for i in (0..32_000).step_by(8_000) {
            clicks[i] = 1.0;
        }
        let ratio = harmonic_ratio_of(&clicks);
        assert!(ratio < 1.0, "Expected clicks to be percussive, got {}", ratio);
    }

    #[test]
    fn test_jitter_of_steady_tone_is_near_zero() {
        // 400-sample frames hold exactly 5 periods of 200 Hz
        let tone: Vec<f32> = (0..16_000)
            .map(|i| (2.0 * std::f32::consts::PI * 200.0 * i as f32 / SR as f32).sin())
            .collect();
        let jitter = quality().compute_jitter(&tone);
        assert!(jitter < 0.001, "Expected ~0 jitter, got {}", jitter);
    }

    #[test]
    fn test_jitter_of_gated_signal_is_high() {
        let gated: Vec<f32> = (0..16_000)
            .map(|i| if (i / 800) % 2 == 0 { 0.5 } else { 0.05 })
            .collect();
        assert!(quality().compute_jitter(&gated) > 0.02);
    }

    #[test]
    fn test_jitter_short_input_is_zero() {
        assert_eq!(quality().compute_jitter(&[0.3; 400]), 0.0);
        assert_eq!(quality().compute_jitter(&[0.3; 300]), 0.0);
    }
}
