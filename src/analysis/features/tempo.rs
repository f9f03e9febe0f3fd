// Tempo module - Global tempo estimate from an onset-strength envelope
//
// The onset envelope is the positive frame-to-frame increase of the mel
// decibel spectrogram, averaged over bands. Its autocorrelation is weighted
// by a log-normal prior on tempo and the best-scoring lag inside the allowed
// BPM range gives the estimate.

/// Onset-autocorrelation tempo estimator
pub struct TempoEstimator {
    frame_rate: f32,
    min_bpm: f32,
    max_bpm: f32,
    start_bpm: f32,
    max_lag_secs: f32,
}

impl TempoEstimator {
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `hop_length` - Hop between onset-envelope frames in samples
    pub fn new(
        sample_rate: u32,
        hop_length: usize,
        min_bpm: f32,
        max_bpm: f32,
        start_bpm: f32,
        max_lag_secs: f32,
    ) -> Self {
        Self {
            frame_rate: sample_rate as f32 / hop_length.max(1) as f32,
            min_bpm,
            max_bpm,
            start_bpm,
            max_lag_secs,
        }
    }

    /// Positive spectral flux of mel decibel frames, averaged over bands
    pub fn onset_envelope(&self, mel_db: &[Vec<f32>]) -> Vec<f32> {
        let mut envelope = Vec::with_capacity(mel_db.len());
        if mel_db.is_empty() {
            return envelope;
        }
        envelope.push(0.0);
        for pair in mel_db.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            let bands = current.len().max(1) as f32;
            let flux: f32 = current
                .iter()
                .zip(previous)
                .map(|(c, p)| (c - p).max(0.0))
                .sum();
            envelope.push(flux / bands);
        }
        envelope
    }

    /// Tempo in BPM, 0.0 when the envelope is flat or too short
    pub fn estimate(&self, mel_db: &[Vec<f32>]) -> f32 {
        let envelope = self.onset_envelope(mel_db);
        let centre = envelope.iter().sum::<f32>() / envelope.len().max(1) as f32;
        let centred: Vec<f32> = envelope.iter().map(|v| v - centre).collect();

        let energy: f32 = centred.iter().map(|v| v * v).sum();
        if energy <= f32::EPSILON {
            return 0.0;
        }

        let min_lag = (60.0 * self.frame_rate / self.max_bpm).ceil().max(1.0) as usize;
        let max_lag = ((60.0 * self.frame_rate / self.min_bpm).floor() as usize)
            .min((self.max_lag_secs * self.frame_rate) as usize)
            .min(centred.len().saturating_sub(1));
        if min_lag > max_lag {
            return 0.0;
        }

        let mut best: Option<(f32, f32)> = None;
        for lag in min_lag..=max_lag {
            let correlation: f32 = centred[lag..]
                .iter()
                .zip(&centred)
                .map(|(a, b)| a * b)
                .sum();
            if correlation <= 0.0 {
                continue;
            }
            let bpm = 60.0 * self.frame_rate / lag as f32;
            let octaves = (bpm / self.start_bpm).log2();
            let weighted = correlation * (-0.5 * octaves * octaves).exp();
            if best.map_or(true, |(_, w)| weighted > w) {
                best = Some((bpm, weighted));
            }
        }

        best.map(|(bpm, _)| bpm).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> TempoEstimator {
        TempoEstimator::new(16_000, 512, 30.0, 320.0, 120.0, 8.0)
    }

    /// Mel frames with a click every `period` frames
    fn clicks(period: usize, frames: usize) -> Vec<Vec<f32>> {
        (0..frames)
            .map(|t| {
                let level = if t % period == 0 { 0.0 } else { -60.0 };
                vec![level; 16]
            })
            .collect()
    }

    #[test]
    fn test_constant_frames_have_no_tempo() {
        assert_eq!(estimator().estimate(&vec![vec![-20.0; 16]; 200]), 0.0);
    }

    #[test]
    fn test_too_short_envelope_has_no_tempo() {
        assert_eq!(estimator().estimate(&clicks(4, 3)), 0.0);
        assert_eq!(estimator().estimate(&[]), 0.0);
    }

    #[test]
    fn test_regular_clicks_give_matching_tempo() {
        // 31.25 frames/s; a click every 16 frames is ~117 BPM
        let tempo = estimator().estimate(&clicks(16, 400));
        assert!((tempo - 117.19).abs() < 1.0, "Expected ~117 BPM, got {}", tempo);
    }

    #[test]
    fn test_tempo_within_range() {
        let tempo = estimator().estimate(&clicks(5, 400));
        assert!((30.0..=320.0).contains(&tempo), "tempo {}", tempo);
    }
}
