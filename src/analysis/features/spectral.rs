// Spectral module - Frequency-domain feature extraction
//
// This module computes per-frame spectral shape descriptors from magnitude
// spectra and summarises them over the recording.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Jiang, D. et al. (2002). Music type classification by spectral contrast feature

use super::stats::{mean, power_to_db, safe_ratio, std_dev};
use super::types::{FeatureName, FeatureVector};

/// Spectral rolloff threshold (85% of cumulative magnitude)
const ROLLOFF_THRESHOLD: f32 = 0.85;

/// Power floor used by flatness and contrast
const AMIN: f32 = 1e-10;

/// Lower edge of the first contrast octave
const CONTRAST_FMIN: f32 = 200.0;

/// Number of octave bands above the base band
const CONTRAST_BANDS: usize = 6;

/// Fraction of each band averaged for peak and valley
const CONTRAST_QUANTILE: f32 = 0.02;

/// Spectral feature computation functions
pub struct SpectralFeatures {
    sample_rate: u32,
    fft_size: usize,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT window size
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
        }
    }

    #[inline]
    fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.sample_rate as f32 / self.fft_size as f32
    }

    /// Summarise every spectral descriptor over the magnitude frames
    pub fn describe(&self, magnitudes: &[Vec<f32>], features: &mut FeatureVector) {
        let mut centroids = Vec::with_capacity(magnitudes.len());
        let mut bandwidths = Vec::with_capacity(magnitudes.len());
        let mut rolloffs = Vec::with_capacity(magnitudes.len());
        let mut flatness = Vec::with_capacity(magnitudes.len());
        let mut contrast = Vec::with_capacity(magnitudes.len() * (CONTRAST_BANDS + 1));

        for spectrum in magnitudes {
            let centroid = self.compute_centroid(spectrum);
            centroids.push(centroid);
            bandwidths.push(self.compute_bandwidth(spectrum, centroid));
            rolloffs.push(self.compute_rolloff(spectrum));
            flatness.push(self.compute_flatness(spectrum));
            contrast.extend(self.compute_contrast(spectrum));
        }

        features.insert(FeatureName::SpectralCentroidMean, mean(&centroids));
        features.insert(FeatureName::SpectralCentroidStd, std_dev(&centroids));
        features.insert(FeatureName::SpectralBandwidthMean, mean(&bandwidths));
        features.insert(FeatureName::SpectralBandwidthStd, std_dev(&bandwidths));
        features.insert(FeatureName::SpectralRolloffMean, mean(&rolloffs));
        features.insert(FeatureName::SpectralFlatnessMean, mean(&flatness));
        features.insert(FeatureName::SpectralFlatnessStd, std_dev(&flatness));
        features.insert(FeatureName::SpectralContrastMean, mean(&contrast));
    }

    /// Compute spectral centroid (weighted mean frequency)
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// # Returns
    /// Spectral centroid in Hz, 0.0 for an all-zero frame
    pub fn compute_centroid(&self, spectrum: &[f32]) -> f32 {
        let weighted_sum: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| self.bin_frequency(i) * mag)
            .sum();
        let magnitude_sum: f32 = spectrum.iter().sum();

        safe_ratio(weighted_sum, magnitude_sum, 0.0)
    }

    /// Compute spectral bandwidth (second-order spread around the centroid)
    ///
    /// Formula: bandwidth = sqrt(Σ p_i × (f_i − centroid)²), p = |X| / Σ|X|
    pub fn compute_bandwidth(&self, spectrum: &[f32], centroid: f32) -> f32 {
        let magnitude_sum: f32 = spectrum.iter().sum();
        if magnitude_sum <= 0.0 {
            return 0.0;
        }

        let spread: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| {
                let deviation = self.bin_frequency(i) - centroid;
                (mag / magnitude_sum) * deviation * deviation
            })
            .sum();
        spread.sqrt()
    }

    /// Compute spectral flatness (tonality measure) on the power spectrum
    ///
    /// Formula: flatness = geometric_mean(max(|X|², amin)) / arithmetic_mean(max(|X|², amin))
    ///
    /// Returns a value between 0 (pure tone) and 1 (white noise or silence).
    pub fn compute_flatness(&self, spectrum: &[f32]) -> f32 {
        if spectrum.is_empty() {
            return 0.0;
        }

        let n = spectrum.len() as f64;
        let (log_sum, sum) = spectrum.iter().fold((0.0f64, 0.0f64), |(ls, s), &mag| {
            let power = (mag * mag).max(AMIN) as f64;
            (ls + power.ln(), s + power)
        });
        let geometric_mean = (log_sum / n).exp();
        let arithmetic_mean = sum / n;

        safe_ratio(geometric_mean as f32, arithmetic_mean as f32, 0.0).min(1.0)
    }

    /// Compute spectral rolloff (85% cumulative magnitude frequency)
    ///
    /// # Returns
    /// Rolloff frequency in Hz, 0.0 for an all-zero frame
    pub fn compute_rolloff(&self, spectrum: &[f32]) -> f32 {
        let total: f32 = spectrum.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }

        let threshold = ROLLOFF_THRESHOLD * total;
        let mut cumulative = 0.0;
        for (i, &mag) in spectrum.iter().enumerate() {
            cumulative += mag;
            if cumulative >= threshold {
                return self.bin_frequency(i);
            }
        }

        self.bin_frequency(spectrum.len().saturating_sub(1))
    }

    /// Compute octave-band spectral contrast in dB
    ///
    /// Bands are [0, 200], [200, 400], ... with the last band extended to
    /// Nyquist. Each band's contrast is the dB difference between the mean of
    /// its top and bottom `CONTRAST_QUANTILE` fraction of magnitudes.
    pub fn compute_contrast(&self, spectrum: &[f32]) -> Vec<f32> {
        let n_bins = spectrum.len();
        let mut edges = vec![0.0f32; CONTRAST_BANDS + 2];
        for (i, edge) in edges.iter_mut().enumerate().skip(1) {
            *edge = CONTRAST_FMIN * 2f32.powi(i as i32 - 1);
        }

        let mut contrast = Vec::with_capacity(CONTRAST_BANDS + 1);
        for k in 0..=CONTRAST_BANDS {
            let (low, high) = (edges[k], edges[k + 1]);
            let in_band: Vec<usize> = (0..n_bins)
                .filter(|&i| {
                    let f = self.bin_frequency(i);
                    f >= low && f <= high
                })
                .collect();
            let (Some(&first), Some(&last)) = (in_band.first(), in_band.last()) else {
                contrast.push(0.0);
                continue;
            };

            let start = if k > 0 { first.saturating_sub(1) } else { first };
            let end = if k == CONTRAST_BANDS { n_bins } else { last + 1 };
            let band_len = end - start;

            let mut band: Vec<f32> = spectrum[start..end].to_vec();
            if k < CONTRAST_BANDS && band.len() > 1 {
                band.pop();
            }
            band.sort_unstable_by(|a, b| a.total_cmp(b));

            let take = ((CONTRAST_QUANTILE * band_len as f32).round() as usize)
                .max(1)
                .min(band.len());
            let valley = mean(&band[..take]);
            let peak = mean(&band[band.len() - take..]);

            contrast.push(power_to_db(peak, AMIN) - power_to_db(valley, AMIN));
        }

        contrast
    }
}
