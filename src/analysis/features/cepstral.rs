// Cepstral module - Mel-frequency cepstral coefficients
//
// Power spectra are projected onto an area-normalised (Slaney) mel
// filterbank, converted to decibels with a global dynamic-range floor, and
// decorrelated with an orthonormal DCT-II. The mel decibel frames are also
// the input of the onset envelope used for tempo estimation.
//
// References:
// - Davis, S. & Mermelstein, P. (1980). Comparison of parametric representations
//   for monosyllabic word recognition in continuously spoken sentences
// - Slaney, M. (1998). Auditory Toolbox, Technical Report #1998-010

use super::stats::{mean, power_to_db, std_dev, variance};
use super::types::{FeatureName, FeatureVector};

const AMIN: f32 = 1e-10;

/// Slaney mel scale: linear below 1 kHz, logarithmic above
fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if hz >= MIN_LOG_HZ {
        min_log_mel + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if mel >= min_log_mel {
        MIN_LOG_HZ * (logstep * (mel - min_log_mel)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular mel filter, stored as its first non-zero bin and weights
struct MelBand {
    start: usize,
    weights: Vec<f32>,
}

/// Mel filterbank and DCT basis for MFCC extraction
pub struct CepstralFeatures {
    bands: Vec<MelBand>,
    /// `dct[k][m]`: orthonormal DCT-II basis, k < n_mfcc, m < n_mels
    dct: Vec<Vec<f32>>,
    top_db: f32,
    delta_width: usize,
}

impl CepstralFeatures {
    /// Build the filterbank for one sample rate and FFT size
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `n_fft` - FFT size the magnitude frames were computed with
    /// * `n_mels` - Number of mel bands spanning 0 Hz to Nyquist
    /// * `n_mfcc` - Number of cepstral coefficients kept
    /// * `top_db` - Dynamic range below the loudest cell kept in decibels
    /// * `delta_width` - Regression window for delta coefficients (odd)
    pub fn new(
        sample_rate: u32,
        n_fft: usize,
        n_mels: usize,
        n_mfcc: usize,
        top_db: f32,
        delta_width: usize,
    ) -> Self {
        let n_mels = n_mels.max(1);
        let n_bins = n_fft / 2 + 1;
        let nyquist = sample_rate as f32 / 2.0;

        let mel_max = hz_to_mel(nyquist);
        let edges: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
            .collect();

        let bands = (0..n_mels)
            .map(|m| {
                let (lower, centre, upper) = (edges[m], edges[m + 1], edges[m + 2]);
                let norm = 2.0 / (upper - lower);
                let weights: Vec<(usize, f32)> = (0..n_bins)
                    .filter_map(|k| {
                        let f = k as f32 * sample_rate as f32 / n_fft as f32;
                        let rising = (f - lower) / (centre - lower);
                        let falling = (upper - f) / (upper - centre);
                        let w = rising.min(falling).max(0.0) * norm;
                        (w > 0.0).then_some((k, w))
                    })
                    .collect();
                let start = weights.first().map(|&(k, _)| k).unwrap_or(0);
                MelBand {
                    start,
                    weights: weights.into_iter().map(|(_, w)| w).collect(),
                }
            })
            .collect();

        let dct = (0..n_mfcc.min(n_mels))
            .map(|k| {
                let scale = if k == 0 {
                    (1.0 / n_mels as f32).sqrt()
                } else {
                    (2.0 / n_mels as f32).sqrt()
                };
                (0..n_mels)
                    .map(|m| {
                        let angle = std::f32::consts::PI * k as f32 * (2 * m + 1) as f32
                            / (2 * n_mels) as f32;
                        scale * angle.cos()
                    })
                    .collect()
            })
            .collect();

        Self {
            bands,
            dct,
            top_db,
            delta_width: delta_width.max(3) | 1,
        }
    }

    /// Mel power spectrogram in decibels, frame-major
    ///
    /// Cells are floored at `max - top_db` over the whole recording.
    pub fn mel_db(&self, magnitudes: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let mut mel: Vec<Vec<f32>> = magnitudes
            .iter()
            .map(|frame| {
                self.bands
                    .iter()
                    .map(|band| {
                        let energy: f32 = band
                            .weights
                            .iter()
                            .zip(frame.iter().skip(band.start))
                            .map(|(w, &mag)| w * mag * mag)
                            .sum();
                        power_to_db(energy, AMIN)
                    })
                    .collect()
            })
            .collect();

        let loudest = mel
            .iter()
            .flatten()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        let floor = loudest - self.top_db;
        for value in mel.iter_mut().flatten() {
            *value = value.max(floor);
        }
        mel
    }

    /// MFCC matrix, coefficient-major (`mfcc[k][t]`)
    pub fn mfcc(&self, mel_db: &[Vec<f32>]) -> Vec<Vec<f32>> {
        self.dct
            .iter()
            .map(|basis| {
                mel_db
                    .iter()
                    .map(|frame| basis.iter().zip(frame).map(|(b, x)| b * x).sum())
                    .collect()
            })
            .collect()
    }

    /// Local least-squares slope of each row over `delta_width` frames
    pub fn delta(&self, rows: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let half = (self.delta_width / 2) as isize;
        let denom: f32 = (-half..=half).map(|k| (k * k) as f32).sum();
        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|t| {
                        let slope: f32 = (-half..=half)
                            .map(|k| k as f32 * clamped(row, t as isize + k))
                            .sum();
                        slope / denom
                    })
                    .collect()
            })
            .collect()
    }

    /// Local least-squares second derivative of each row over `delta_width` frames
    ///
    /// Fits `a + b·k + c·k²` and returns `2c`.
    pub fn delta2(&self, rows: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let half = (self.delta_width / 2) as isize;
        let n = (2 * half + 1) as f32;
        let mean_sq: f32 = (-half..=half).map(|k| (k * k) as f32).sum::<f32>() / n;
        let denom: f32 = (-half..=half)
            .map(|k| {
                let centred = (k * k) as f32 - mean_sq;
                centred * centred
            })
            .sum();
        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|t| {
                        let curvature: f32 = (-half..=half)
                            .map(|k| ((k * k) as f32 - mean_sq) * clamped(row, t as isize + k))
                            .sum();
                        2.0 * curvature / denom
                    })
                    .collect()
            })
            .collect()
    }

    /// Record MFCC statistics from mel decibel frames
    pub fn describe(&self, mel_db: &[Vec<f32>], features: &mut FeatureVector) {
        let mfcc = self.mfcc(mel_db);
        let delta = self.delta(&mfcc);
        let delta2 = self.delta2(&mfcc);

        let flat: Vec<f32> = mfcc.iter().flatten().copied().collect();
        let per_coefficient_std: Vec<f32> = mfcc.iter().map(|row| std_dev(row)).collect();

        features.insert(FeatureName::MfccVariance, variance(&flat));
        features.insert(FeatureName::MfccStdMean, mean(&per_coefficient_std));
        features.insert(FeatureName::MfccDeltaStd, std_dev(&flatten(&delta)));
        features.insert(FeatureName::MfccDelta2Std, std_dev(&flatten(&delta2)));
    }
}

/// Row value at `t`, clamped to the nearest valid frame
#[inline]
fn clamped(row: &[f32], t: isize) -> f32 {
    let last = row.len().saturating_sub(1) as isize;
    row.get(t.clamp(0, last) as usize).copied().unwrap_or(0.0)
}

fn flatten(rows: &[Vec<f32>]) -> Vec<f32> {
    rows.iter().flatten().copied().collect()
}
