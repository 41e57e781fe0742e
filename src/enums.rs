use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

/// Voxel axis a volume is sliced along, in NIfTI `dim[1..=3]` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceAxis {
    X,
    Y,
    Z,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Expected slice axis to be in [0, 1, 2], got {0}")]
pub struct InvalidAxis(pub i64);

impl SliceAxis {
    pub fn index(self) -> usize {
        match self {
            SliceAxis::X => 0,
            SliceAxis::Y => 1,
            SliceAxis::Z => 2,
        }
    }
}

impl TryFrom<i64> for SliceAxis {
    type Error = InvalidAxis;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SliceAxis::X),
            1 => Ok(SliceAxis::Y),
            2 => Ok(SliceAxis::Z),
            other => Err(InvalidAxis(other)),
        }
    }
}

impl fmt::Display for SliceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum NormalizationMode {
    /// Rescale each volume by its own min and max.
    Local,
    /// Clip, then standardize with dataset-wide mean and std.
    #[default]
    Global,
}

/// How normalized `f32` values become 8-bit pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CastMode {
    /// Clamp to `[0, 255]`, then truncate. NaN maps to 0.
    #[default]
    Clamp,
    /// Truncate toward zero, then wrap modulo 256.
    Wrap,
}

impl CastMode {
    #[inline]
    pub fn to_u8(self, value: f32) -> u8 {
        match self {
            // `as` saturates and sends NaN to 0
            CastMode::Clamp => value.clamp(0.0, 255.0) as u8,
            CastMode::Wrap => {
                if value.is_finite() {
                    (value.trunc() as i64).rem_euclid(256) as u8
                } else {
                    0
                }
            }
        }
    }
}
