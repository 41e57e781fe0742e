use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{CastMode, NormalizationMode, SliceAxis};

/// Voxel range used when computing dataset statistics.
pub const DEFAULT_STATS_CLIP: ClipRange = ClipRange::new(-1000.0, 1000.0);

/// Voxel range used by global normalization.
pub const DEFAULT_NORM_CLIP: ClipRange = ClipRange::new(-1024.0, 3071.0);

/// Closed interval voxel intensities are clipped into.
///
/// Serialized as a two element array `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct ClipRange {
    pub min: f32,
    pub max: f32,
}

impl ClipRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Both bounds finite and `min < max`
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    /// Saturate `value` into the range. Never panics, even on an invalid
    /// range; NaN passes through.
    #[inline]
    pub fn clip(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

impl From<[f32; 2]> for ClipRange {
    fn from([min, max]: [f32; 2]) -> Self {
        Self::new(min, max)
    }
}

impl From<ClipRange> for [f32; 2] {
    fn from(range: ClipRange) -> Self {
        [range.min, range.max]
    }
}

impl fmt::Display for ClipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipRangeError {
    #[error("Expected MIN,MAX, got {0:?}")]
    Format(String),

    #[error("Clip range bounds must be finite with MIN < MAX, got {0:?}")]
    Bounds(String),
}

impl FromStr for ClipRange {
    type Err = ClipRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_error = || ClipRangeError::Format(s.to_owned());
        let (min, max) = s.split_once(',').ok_or_else(format_error)?;
        let min: f32 = min.trim().parse().map_err(|_| format_error())?;
        let max: f32 = max.trim().parse().map_err(|_| format_error())?;
        let range = Self::new(min, max);
        if !range.is_valid() {
            return Err(ClipRangeError::Bounds(s.to_owned()));
        }
        Ok(range)
    }
}

/// Unvalidated run parameters, as they come off the command line.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source_folder: PathBuf,
    pub target_folder: PathBuf,
    pub slice_dim: i64,
    pub spacing: usize,
    pub global_norm: bool,
    pub cast: CastMode,
    pub stats_clip: ClipRange,
    pub norm_clip: ClipRange,
}

impl ConversionRequest {
    /// Request with default clipping and cast settings
    pub fn new(
        source_folder: impl Into<PathBuf>,
        target_folder: impl Into<PathBuf>,
        slice_dim: i64,
        spacing: usize,
    ) -> Self {
        Self {
            source_folder: source_folder.into(),
            target_folder: target_folder.into(),
            slice_dim,
            spacing,
            global_norm: true,
            cast: CastMode::default(),
            stats_clip: DEFAULT_STATS_CLIP,
            norm_clip: DEFAULT_NORM_CLIP,
        }
    }

    pub fn with_global_norm(mut self, global_norm: bool) -> Self {
        self.global_norm = global_norm;
        self
    }

    pub fn with_cast(mut self, cast: CastMode) -> Self {
        self.cast = cast;
        self
    }
}

/// Run parameters after every precondition has been checked.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub source_folder: PathBuf,
    pub target_folder: PathBuf,
    pub axis: SliceAxis,
    pub spacing: usize,
    pub normalization: NormalizationMode,
    pub cast: CastMode,
    pub stats_clip: ClipRange,
    pub norm_clip: ClipRange,
    /// Input volumes in processing order
    pub volume_files: Vec<PathBuf>,
}
