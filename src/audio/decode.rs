// WAV decoding - container bytes to mono samples at the target rate
//
// Decoding is hound-based and accepts float and 16/24/32-bit integer PCM.
// Multi-channel audio is averaged to mono and resampled linearly to the
// detector's target rate before validation.

use std::io::{Cursor, Read};
use std::path::Path;

use crate::config::DetectorConfig;
use crate::error::AudioError;

use super::Waveform;

fn read_wav<R: Read>(
    mut reader: hound::WavReader<R>,
    source: &str,
) -> Result<(Vec<f32>, u32), AudioError> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::DecodeFailure {
            reason: format!("{} has zero channels", source),
        });
    }

    let read_error = |err: hound::Error| AudioError::DecodeFailure {
        reason: format!("error reading {}: {err}", source),
    };

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(read_error))
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 | 16 | 24 | 32 => {
                let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f32 / scale).map_err(read_error))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            bits => {
                return Err(AudioError::DecodeFailure {
                    reason: format!("unsupported bits_per_sample={} for {}", bits, source),
                })
            }
        },
    };

    log::debug!(
        "[Decode] {}: {} Hz, {} channel(s), {} frames",
        source,
        spec.sample_rate,
        spec.channels,
        samples.len() / spec.channels as usize
    );

    if spec.channels == 1 {
        return Ok((samples, spec.sample_rate));
    }

    let channels = spec.channels as usize;
    let mono = samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

/// Decode a WAV file into mono samples at its native rate
pub fn read_wav_file(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let reader = hound::WavReader::open(path).map_err(|err| AudioError::DecodeFailure {
        reason: format!("failed to open {}: {err}", path.display()),
    })?;
    read_wav(reader, &path.display().to_string())
}

/// Decode in-memory WAV bytes into mono samples at their native rate
pub fn read_wav_bytes(bytes: &[u8]) -> Result<(Vec<f32>, u32), AudioError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    read_wav(reader, "WAV payload")
}

/// Linear-interpolation resampling
///
/// Output length is `round(len * to / from)`. Returns the input unchanged
/// when the rates match or either rate is zero.
pub fn resample_linear(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || from == 0 || to == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from as f64 / to as f64;
    let out_len = (samples.len() as f64 * to as f64 / from as f64).round() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let position = i as f64 * ratio;
            let index = (position.floor() as usize).min(last);
            let next = (index + 1).min(last);
            let frac = (position - index as f64) as f32;
            samples[index] + (samples[next] - samples[index]) * frac
        })
        .collect()
}

fn into_waveform(
    samples: Vec<f32>,
    sample_rate: u32,
    config: &DetectorConfig,
) -> Result<Waveform, AudioError> {
    let target = config.target_sample_rate;
    let samples = if sample_rate != target {
        log::debug!("[Decode] Resampling {} Hz -> {} Hz", sample_rate, target);
        resample_linear(&samples, sample_rate, target)
    } else {
        samples
    };
    Waveform::new(samples, target, config)
}

/// Decode, resample and validate a WAV file
pub fn load_wav_file(path: &Path, config: &DetectorConfig) -> Result<Waveform, AudioError> {
    let (samples, sample_rate) = read_wav_file(path)?;
    into_waveform(samples, sample_rate, config)
}

/// Decode, resample and validate in-memory WAV bytes
pub fn decode_wav_bytes(bytes: &[u8], config: &DetectorConfig) -> Result<Waveform, AudioError> {
    let (samples, sample_rate) = read_wav_bytes(bytes)?;
    into_waveform(samples, sample_rate, config)
}
