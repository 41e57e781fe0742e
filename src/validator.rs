use crate::config::{ClipRange, ConversionConfig, ConversionRequest};
use crate::enums::{InvalidAxis, NormalizationMode, SliceAxis};
use crate::volume_loader::{VolumeLoader, VolumeLoaderError};

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Source folder {0} does not exist")]
    MissingSourceFolder(PathBuf),

    #[error("Source folder {0} contains no nii.gz images")]
    NoVolumes(PathBuf),

    #[error("Target folder {0} does not exist")]
    MissingTargetFolder(PathBuf),

    #[error(transparent)]
    InvalidAxis(#[from] InvalidAxis),

    #[error("Spacing must be at least 1")]
    ZeroSpacing,

    #[error("Clip range {name} must have finite bounds with MIN < MAX, got {range}")]
    InvalidClipRange { name: &'static str, range: ClipRange },

    #[error(
        "Spacing {spacing} must be smaller than the extent {extent} of axis {axis} in {sample}"
    )]
    SpacingTooLarge {
        spacing: usize,
        extent: usize,
        axis: SliceAxis,
        sample: PathBuf,
    },

    #[error(transparent)]
    Loader(#[from] VolumeLoaderError),
}

pub struct Validator;

impl Validator {
    /// Check every precondition of a run and resolve it into a config.
    ///
    /// Checks run in a fixed order and stop at the first failure. Only the
    /// first volume (by file name) is opened, to check the spacing against
    /// its extent.
    pub fn validate(request: &ConversionRequest) -> Result<ConversionConfig, ValidationError> {
        let source = &request.source_folder;
        if !source.is_dir() {
            return Err(ValidationError::MissingSourceFolder(source.clone()));
        }

        let volume_files = VolumeLoader::list_volume_files(source)?;
        let Some(sample) = volume_files.first() else {
            return Err(ValidationError::NoVolumes(source.clone()));
        };

        if !request.target_folder.is_dir() {
            return Err(ValidationError::MissingTargetFolder(
                request.target_folder.clone(),
            ));
        }

        let axis = SliceAxis::try_from(request.slice_dim)?;
        if request.spacing == 0 {
            return Err(ValidationError::ZeroSpacing);
        }
        for (name, range) in [
            ("stats_clip", request.stats_clip),
            ("norm_clip", request.norm_clip),
        ] {
            if !range.is_valid() {
                return Err(ValidationError::InvalidClipRange { name, range });
            }
        }

        let (d0, d1, d2) = VolumeLoader::load_shape(sample)?;
        let extent = [d0, d1, d2][axis.index()];
        if request.spacing >= extent {
            return Err(ValidationError::SpacingTooLarge {
                spacing: request.spacing,
                extent,
                axis,
                sample: sample.clone(),
            });
        }
        debug!(volumes = volume_files.len(), %axis, spacing = request.spacing, "arguments valid");

        Ok(ConversionConfig {
            source_folder: request.source_folder.clone(),
            target_folder: request.target_folder.clone(),
            axis,
            spacing: request.spacing,
            normalization: if request.global_norm {
                NormalizationMode::Global
            } else {
                NormalizationMode::Local
            },
            cast: request.cast,
            stats_clip: request.stats_clip,
            norm_clip: request.norm_clip,
            volume_files,
        })
    }
}
