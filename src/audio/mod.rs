// Audio module - waveform intake, decoding and validation

pub mod decode;
pub mod waveform;

// Re-export commonly used types for convenience
pub use decode::{decode_wav_bytes, load_wav_file, read_wav_bytes, read_wav_file, resample_linear};
pub use waveform::Waveform;
