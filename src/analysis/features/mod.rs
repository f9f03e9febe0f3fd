// FeatureExtractor - DSP feature extraction for synthetic voice detection
//
// This module turns a validated mono waveform into the named acoustic
// descriptors the scorers consume. One short-time Fourier transform is shared
// by the cepstral, pitch, spectral and harmonic/percussive passes; the mel
// decibel frames computed for the cepstrum also drive tempo estimation.
//
// Module organization:
// - types: FeatureName vocabulary and the FeatureVector record
// - stats: safe ratio and moment helpers shared by every pass
// - fft: STFT/ISTFT with a periodic Hann window
// - cepstral: mel filterbank, MFCC, delta and delta-delta
// - pitch: spectral-peak fundamental frequency tracking
// - spectral: centroid, bandwidth, rolloff, flatness, contrast
// - temporal: zero-crossing rate, RMS energy, silence ratio
// - tempo: onset-autocorrelation tempo estimate
// - voice_quality: harmonic ratio, jitter, shimmer
// - mod.rs: Coordinator (FeatureExtractor)
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

mod cepstral;
pub(crate) mod fft;
mod pitch;
mod spectral;
pub mod stats;
mod temporal;
mod tempo;
mod types;
mod voice_quality;

pub use types::{FeatureName, FeatureVector};

use crate::config::FeatureConfig;
use cepstral::CepstralFeatures;
use fft::FftProcessor;
use pitch::PitchTracker;
use spectral::SpectralFeatures;
use temporal::TemporalFeatures;
use tempo::TempoEstimator;
use voice_quality::VoiceQualityFeatures;

/// FeatureExtractor coordinates the DSP feature extraction pipeline
///
/// Built once per sample rate and configuration; `extract` is a pure
/// function of its input, so one extractor can serve many recordings.
pub struct FeatureExtractor {
    sample_rate: u32,
    fft_processor: FftProcessor,
    cepstral_features: CepstralFeatures,
    pitch_tracker: PitchTracker,
    spectral_features: SpectralFeatures,
    temporal_features: TemporalFeatures,
    tempo_estimator: TempoEstimator,
    voice_quality_features: VoiceQualityFeatures,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz (16000 after decoding)
    /// * `config` - DSP parameters
    pub fn new(sample_rate: u32, config: &FeatureConfig) -> Self {
        let n_fft = config.n_fft.max(2);
        let hop = config.hop_length.max(1);

        Self {
            sample_rate,
            fft_processor: FftProcessor::new(n_fft, hop),
            cepstral_features: CepstralFeatures::new(
                sample_rate,
                n_fft,
                config.n_mels,
                config.n_mfcc,
                config.top_db,
                config.delta_width,
            ),
            pitch_tracker: PitchTracker::new(
                sample_rate,
                n_fft,
                config.pitch_fmin,
                config.pitch_fmax,
                config.pitch_threshold,
                config.min_voiced_frames,
                config.pitch_jump_hz,
            ),
            spectral_features: SpectralFeatures::new(sample_rate, n_fft),
            temporal_features: TemporalFeatures::new(
                config.frame_length,
                hop,
                config.silence_threshold,
            ),
            tempo_estimator: TempoEstimator::new(
                sample_rate,
                hop,
                config.tempo_min_bpm,
                config.tempo_max_bpm,
                config.tempo_start_bpm,
                config.tempo_max_lag_secs,
            ),
            voice_quality_features: VoiceQualityFeatures::new(
                sample_rate,
                config.hpss_kernel,
                config.harmonic_ratio_cap,
                config.jitter_frame_ms,
                config.jitter_hop_ms,
            ),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Extract every descriptor from a mono waveform
    ///
    /// The result always holds all `FeatureName::ALL` entries. Degenerate
    /// sub-computations (too few voiced frames, zero denominators, inputs
    /// shorter than a jitter frame) record 0.0 instead of failing.
    pub fn extract(&self, audio: &[f32]) -> FeatureVector {
        let mut features = FeatureVector::new();

        let spectrogram = self.fft_processor.stft(audio);
        let magnitudes = spectrogram.magnitudes();
        log::debug!(
            "[FeatureExtractor] {} samples -> {} STFT frames",
            audio.len(),
            spectrogram.frame_count()
        );

        let mel_db = self.cepstral_features.mel_db(&magnitudes);
        self.cepstral_features.describe(&mel_db, &mut features);
        self.pitch_tracker.describe(&magnitudes, &mut features);
        self.spectral_features.describe(&magnitudes, &mut features);
        self.temporal_features.describe(audio, &mut features);
        features.insert(FeatureName::Tempo, self.tempo_estimator.estimate(&mel_db));

        let rms_cv = features.get(FeatureName::RmsCv);
        self.voice_quality_features.describe(
            audio,
            &spectrogram,
            &magnitudes,
            &self.fft_processor,
            rms_cv,
            &mut features,
        );

        log::debug!(
            "[FeatureExtractor] Extracted {} features \
             (pitch_cv={:.4}, jitter={:.4}, silence_ratio={:.4})",
            features.len(),
            features.get(FeatureName::PitchCv),
            features.get(FeatureName::Jitter),
            features.get(FeatureName::SilenceRatio)
        );

        features
    }
}
