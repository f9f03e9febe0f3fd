//! Deterministic synthetic recordings for tests and the CLI.
//!
//! Generators are seeded so the same spec always yields the same samples.
//! `Tone` is a sustained sine, the reference synthetic-sounding input.
//! `SpeechLike` strings together voiced syllables with gliding pitch,
//! varying brightness and loudness, breath noise and short pauses.
//! `WhiteNoise` is uniform noise.

use std::f32::consts::PI;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Default seed for noise-bearing patterns
pub const DEFAULT_SEED: u64 = 0x5A5A_FFF0;

/// Highest harmonic rendered for voiced syllables
const MAX_HARMONICS: usize = 20;

/// Breath noise level relative to the voiced component
const BREATH_LEVEL: f32 = 0.05;

/// Noise floor inside pauses, before normalisation
const PAUSE_NOISE: f32 = 0.002;

/// Peak amplitude after normalisation
const NORMALIZED_PEAK: f32 = 0.9;

/// Supported deterministic waveform patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalPattern {
    Tone,
    SpeechLike,
    WhiteNoise,
}

impl SignalPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalPattern::Tone => "tone",
            SignalPattern::SpeechLike => "speech-like",
            SignalPattern::WhiteNoise => "white-noise",
        }
    }
}

impl fmt::Display for SignalPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tone" | "sine" => Ok(SignalPattern::Tone),
            "speech-like" | "speech_like" | "speech" => Ok(SignalPattern::SpeechLike),
            "white-noise" | "white_noise" | "noise" => Ok(SignalPattern::WhiteNoise),
            other => Err(format!(
                "unknown pattern '{}' (expected tone, speech-like or white-noise)",
                other
            )),
        }
    }
}

/// Declarative description of a synthetic recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSpec {
    pub pattern: SignalPattern,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Tone frequency; ignored by the other patterns
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_duration_ms() -> u32 {
    3_000
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_frequency_hz() -> f32 {
    200.0
}

fn default_amplitude() -> f32 {
    0.8
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl SignalSpec {
    pub fn new(pattern: SignalPattern, duration_ms: u32) -> Self {
        Self {
            pattern,
            duration_ms,
            sample_rate: default_sample_rate(),
            frequency_hz: default_frequency_hz(),
            amplitude: default_amplitude(),
            seed: default_seed(),
        }
    }

    /// Render the samples described by this spec
    pub fn generate(&self) -> Vec<f32> {
        match self.pattern {
            SignalPattern::Tone => tone(
                self.frequency_hz,
                self.amplitude,
                self.duration_ms,
                self.sample_rate,
            ),
            SignalPattern::SpeechLike => {
                speech_like(self.duration_ms, self.sample_rate, self.seed)
            }
            SignalPattern::WhiteNoise => {
                white_noise(self.amplitude, self.duration_ms, self.sample_rate, self.seed)
            }
        }
    }
}

fn duration_frames(duration_ms: u32, sample_rate: u32) -> usize {
    (duration_ms as u64 * sample_rate as u64 / 1_000) as usize
}

/// Sustained sine at constant amplitude
pub fn tone(frequency_hz: f32, amplitude: f32, duration_ms: u32, sample_rate: u32) -> Vec<f32> {
    let len = duration_frames(duration_ms, sample_rate);
    let step = frequency_hz / sample_rate.max(1) as f32;
    let mut phase = 0.0f32;
    (0..len)
        .map(|_| {
            let value = amplitude * (2.0 * PI * phase).sin();
            phase += step;
            if phase >= 1.0 {
                phase -= 1.0;
            }
            value
        })
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude)`
pub fn white_noise(amplitude: f32, duration_ms: u32, sample_rate: u32, seed: u64) -> Vec<f32> {
    let len = duration_frames(duration_ms, sample_rate);
    let amplitude = amplitude.abs().max(f32::MIN_POSITIVE);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect()
}

/// Raised-cosine attack and release around a flat sustain
fn syllable_envelope(n: usize, len: usize, ramp: usize) -> f32 {
    let ramp = ramp.min(len / 2).max(1);
    let position = if n < ramp {
        n
    } else if n >= len - ramp {
        len - 1 - n
    } else {
        return 1.0;
    };
    let x = position as f32 / ramp as f32;
    (0.5 * PI * x).sin().powi(2)
}

/// Speech-like sequence of voiced syllables separated by short pauses
///
/// Each syllable draws its own pitch (100-240 Hz, gliding up to ±15%),
/// harmonic roll-off, loudness and length; pauses last 20-45 ms. The result
/// is normalised to a 0.9 peak.
pub fn speech_like(duration_ms: u32, sample_rate: u32, seed: u64) -> Vec<f32> {
    let total = duration_frames(duration_ms, sample_rate);
    let sr = sample_rate.max(1) as f32;
    let ramp = (0.025 * sr) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(total);

    while out.len() < total {
        let syllable_len = ((rng.gen_range(0.15f32..0.26) * sr) as usize).max(1);
        let f0_start: f32 = rng.gen_range(100.0..240.0);
        let f0_end = f0_start * rng.gen_range(0.85f32..1.15);
        let rolloff: f32 = rng.gen_range(0.3..0.9);
        let level: f32 = rng.gen_range(0.3..1.0);

        let mut phase = 0.0f32;
        for n in 0..syllable_len {
            let progress = n as f32 / syllable_len as f32;
            let f0 = f0_start + (f0_end - f0_start) * progress;
            phase = (phase + 2.0 * PI * f0 / sr) % (2.0 * PI);

            let mut voiced = 0.0;
            let mut gain = 1.0;
            let mut gain_sum = 0.0;
            for k in 1..=MAX_HARMONICS {
                if k as f32 * f0 >= sr / 2.0 {
                    break;
                }
                voiced += gain * (k as f32 * phase).sin();
                gain_sum += gain;
                gain *= rolloff;
            }
            let voiced = voiced / gain_sum.max(1.0);
            let breath = rng.gen_range(-1.0f32..1.0) * BREATH_LEVEL;
            out.push(level * syllable_envelope(n, syllable_len, ramp) * (voiced + breath));
        }

        let pause_len = (rng.gen_range(0.020f32..0.045) * sr) as usize;
        for _ in 0..pause_len {
            out.push(rng.gen_range(-1.0f32..1.0) * PAUSE_NOISE);
        }
    }

    out.truncate(total);
    normalize(&mut out, NORMALIZED_PEAK);
    out
}

fn normalize(samples: &mut [f32], target_peak: f32) {
    let peak = samples.iter().fold(0.0f32, |p, s| p.max(s.abs()));
    if peak > 0.0 {
        let gain = target_peak / peak;
        samples.iter_mut().for_each(|s| *s *= gain);
    }
}

fn pcm_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn write_pcm<W: std::io::Write + std::io::Seek>(
    writer: &mut hound::WavWriter<W>,
    samples: &[f32],
) -> Result<(), hound::Error> {
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    Ok(())
}

/// Write mono 16-bit PCM WAV to `path`
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), hound::Error> {
    let mut writer = hound::WavWriter::create(path, pcm_spec(sample_rate))?;
    write_pcm(&mut writer, samples)?;
    writer.finalize()
}

/// Encode mono 16-bit PCM WAV into memory
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), pcm_spec(sample_rate))?;
        write_pcm(&mut writer, samples)?;
        writer.finalize()?;
    }
    Ok(bytes)
}
