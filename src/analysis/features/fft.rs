// FFT module - Short-time Fourier transform and its inverse
//
// This module frames a recording with a periodic Hann window, computes the
// positive-frequency half spectrum of every frame, and can resynthesise a
// time-domain signal from (possibly masked) frames by weighted overlap-add.
// All spectral, cepstral, pitch and harmonic/percussive features share one
// forward transform.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Half-spectrum frames of one recording
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// `frames[t][k]` is bin `k` of frame `t` (k in 0..=n_fft/2)
    pub frames: Vec<Vec<Complex<f32>>>,
}

impl Spectrogram {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Magnitude spectrogram, frame-major
    pub fn magnitudes(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }
}

/// FFT processor producing and inverting centred STFT frames
pub struct FftProcessor {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    fft_size: usize,
    hop_size: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `fft_size` - FFT window size (2048 for feature extraction)
    /// * `hop_size` - Samples between frame starts
    pub fn new(fft_size: usize, hop_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / fft_size as f32).cos())
            })
            .collect();

        Self {
            forward,
            inverse,
            fft_size,
            hop_size: hop_size.max(1),
            window,
        }
    }

    /// Number of centred frames produced for `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        1 + len / self.hop_size
    }

    /// Compute the centred STFT of `samples`
    ///
    /// The signal is zero-padded by `fft_size / 2` on both sides so frame `t`
    /// is centred on sample `t * hop_size`.
    pub fn stft(&self, samples: &[f32]) -> Spectrogram {
        let pad = self.fft_size / 2;
        let mut padded = vec![0.0f32; samples.len() + self.fft_size];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let n_frames = self.frame_count(samples.len());
        let n_bins = self.fft_size / 2 + 1;
        let mut frames = Vec::with_capacity(n_frames);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.fft_size];

        for t in 0..n_frames {
            let start = t * self.hop_size;
            let segment = &padded[start..start + self.fft_size];
            for ((slot, &sample), &w) in buffer.iter_mut().zip(segment).zip(&self.window) {
                *slot = Complex::new(sample * w, 0.0);
            }
            self.forward.process(&mut buffer);
            frames.push(buffer[..n_bins].to_vec());
        }

        Spectrogram { frames }
    }

    /// Resynthesise `length` samples from half-spectrum frames
    ///
    /// Weighted overlap-add with window-sum-square normalisation; the inverse
    /// of `stft` for unmodified frames.
    pub fn istft(&self, frames: &[Vec<Complex<f32>>], length: usize) -> Vec<f32> {
        let pad = self.fft_size / 2;
        let total = length + self.fft_size;
        let mut output = vec![0.0f32; total];
        let mut window_sum = vec![0.0f32; total];
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.fft_size];
        let scale = 1.0 / self.fft_size as f32;
        let half = self.fft_size / 2;

        for (t, frame) in frames.iter().enumerate() {
            for (k, slot) in buffer.iter_mut().enumerate() {
                *slot = if k <= half {
                    frame.get(k).copied().unwrap_or_default()
                } else {
                    frame
                        .get(self.fft_size - k)
                        .map(|c| c.conj())
                        .unwrap_or_default()
                };
            }
            self.inverse.process(&mut buffer);

            let start = t * self.hop_size;
            for (n, value) in buffer.iter().enumerate() {
                let idx = start + n;
                if idx >= total {
                    break;
                }
                let w = self.window[n];
                output[idx] += value.re * scale * w;
                window_sum[idx] += w * w;
            }
        }

        for (sample, &norm) in output.iter_mut().zip(&window_sum) {
            if norm > 1e-8 {
                *sample /= norm;
            }
        }

        output[pad..pad + length].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FFT_SIZE: usize = 2048;
    const HOP_SIZE: usize = 512;

    fn sine(sample_rate: u32, frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn frame_count_is_centred() {
        let processor = FftProcessor::new(FFT_SIZE, HOP_SIZE);
        let spec = processor.stft(&vec![0.0; 16_000]);
        assert_eq!(spec.frame_count(), 1 + 16_000 / HOP_SIZE);
        assert_eq!(spec.frames[0].len(), FFT_SIZE / 2 + 1);
    }

    #[test]
    fn peak_bin_matches_tone() {
        let processor = FftProcessor::new(FFT_SIZE, HOP_SIZE);
        let spec = processor.stft(&sine(16_000, 1_000.0, 16_000));
        let mags = spec.magnitudes();
        let middle = &mags[mags.len() / 2];
        let peak = middle
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .unwrap();
        let peak_hz = peak as f32 * 16_000.0 / FFT_SIZE as f32;
        assert!((peak_hz - 1_000.0).abs() < 10.0);
    }

    #[test]
    fn istft_reconstructs_signal() {
        let processor = FftProcessor::new(FFT_SIZE, HOP_SIZE);
        let signal = sine(16_000, 440.0, 8_000);
        let spec = processor.stft(&signal);
        let rebuilt = processor.istft(&spec.frames, signal.len());

        assert_eq!(rebuilt.len(), signal.len());
        let max_err = signal
            .iter()
            .zip(&rebuilt)
            .skip(FFT_SIZE)
            .take(signal.len() - 2 * FFT_SIZE)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 1e-3, "reconstruction error {max_err}");
    }

    #[test]
    fn short_input_yields_single_frame() {
        let processor = FftProcessor::new(FFT_SIZE, HOP_SIZE);
        let spec = processor.stft(&[0.5; 100]);
        assert_eq!(spec.frame_count(), 1);
        assert_eq!(processor.istft(&spec.frames, 100).len(), 100);
    }
}
