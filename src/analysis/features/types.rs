// Types module - Data structures for acoustic descriptors
//
// The feature vocabulary is closed: every descriptor the extractor can
// produce has a `FeatureName` variant, and the wire/report form uses the
// snake_case string returned by `FeatureName::as_str`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Name of a scalar acoustic descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureName {
    // Cepstral
    MfccVariance,
    MfccStdMean,
    MfccDeltaStd,
    MfccDelta2Std,

    // Pitch
    PitchMean,
    PitchStd,
    PitchRange,
    PitchCv,
    PitchJumps,

    // Spectral
    SpectralCentroidMean,
    SpectralCentroidStd,
    SpectralBandwidthMean,
    SpectralBandwidthStd,
    SpectralRolloffMean,
    SpectralFlatnessMean,
    SpectralFlatnessStd,
    SpectralContrastMean,

    // Temporal
    ZcrMean,
    ZcrStd,
    RmsMean,
    RmsStd,
    RmsCv,
    SilenceRatio,
    Tempo,

    // Voice quality
    HarmonicRatio,
    Jitter,
    Shimmer,
}

impl FeatureName {
    /// Every descriptor, in extraction order
    pub const ALL: [FeatureName; 27] = [
        FeatureName::MfccVariance,
        FeatureName::MfccStdMean,
        FeatureName::MfccDeltaStd,
        FeatureName::MfccDelta2Std,
        FeatureName::PitchMean,
        FeatureName::PitchStd,
        FeatureName::PitchRange,
        FeatureName::PitchCv,
        FeatureName::PitchJumps,
        FeatureName::SpectralCentroidMean,
        FeatureName::SpectralCentroidStd,
        FeatureName::SpectralBandwidthMean,
        FeatureName::SpectralBandwidthStd,
        FeatureName::SpectralRolloffMean,
        FeatureName::SpectralFlatnessMean,
        FeatureName::SpectralFlatnessStd,
        FeatureName::SpectralContrastMean,
        FeatureName::ZcrMean,
        FeatureName::ZcrStd,
        FeatureName::RmsMean,
        FeatureName::RmsStd,
        FeatureName::RmsCv,
        FeatureName::SilenceRatio,
        FeatureName::Tempo,
        FeatureName::HarmonicRatio,
        FeatureName::Jitter,
        FeatureName::Shimmer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::MfccVariance => "mfcc_variance",
            FeatureName::MfccStdMean => "mfcc_std_mean",
            FeatureName::MfccDeltaStd => "mfcc_delta_std",
            FeatureName::MfccDelta2Std => "mfcc_delta2_std",
            FeatureName::PitchMean => "pitch_mean",
            FeatureName::PitchStd => "pitch_std",
            FeatureName::PitchRange => "pitch_range",
            FeatureName::PitchCv => "pitch_cv",
            FeatureName::PitchJumps => "pitch_jumps",
            FeatureName::SpectralCentroidMean => "spectral_centroid_mean",
            FeatureName::SpectralCentroidStd => "spectral_centroid_std",
            FeatureName::SpectralBandwidthMean => "spectral_bandwidth_mean",
            FeatureName::SpectralBandwidthStd => "spectral_bandwidth_std",
            FeatureName::SpectralRolloffMean => "spectral_rolloff_mean",
            FeatureName::SpectralFlatnessMean => "spectral_flatness_mean",
            FeatureName::SpectralFlatnessStd => "spectral_flatness_std",
            FeatureName::SpectralContrastMean => "spectral_contrast_mean",
            FeatureName::ZcrMean => "zcr_mean",
            FeatureName::ZcrStd => "zcr_std",
            FeatureName::RmsMean => "rms_mean",
            FeatureName::RmsStd => "rms_std",
            FeatureName::RmsCv => "rms_cv",
            FeatureName::SilenceRatio => "silence_ratio",
            FeatureName::Tempo => "tempo",
            FeatureName::HarmonicRatio => "harmonic_ratio",
            FeatureName::Jitter => "jitter",
            FeatureName::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named descriptors computed once per recording
///
/// Built by `FeatureExtractor::extract` and read-only afterwards. Lookups of
/// a descriptor that was never recorded yield 0.0, matching the zero-fill
/// policy for degenerate inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    values: BTreeMap<FeatureName, f32>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: FeatureName, value: f32) {
        self.values.insert(name, value);
    }

    /// Value of `name`, or 0.0 when absent
    pub fn get(&self, name: FeatureName) -> f32 {
        self.values.get(&name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, name: FeatureName) -> bool {
        self.values.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f32)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

impl FromIterator<(FeatureName, f32)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (FeatureName, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}
