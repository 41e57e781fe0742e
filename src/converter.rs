use crate::config::{ConversionConfig, ConversionRequest};
use crate::enums::NormalizationMode;
use crate::manifest::{ManifestError, RunManifest};
use crate::normalizer::Normalizer;
use crate::statistics::{DatasetStatistics, StatisticsCache, StatisticsError, StatisticsEstimator};
use crate::validator::{ValidationError, Validator};
use crate::volume::Volume;
use crate::volume_loader::{VolumeLoader, VolumeLoaderError};

use image::ImageFormat;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Statistics(#[from] StatisticsError),

    #[error(transparent)]
    Loader(#[from] VolumeLoaderError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Slice {index} of {volume} does not fit an image buffer")]
    SliceTooLarge { volume: PathBuf, index: usize },

    #[error("Failed to write {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a finished run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub volumes: usize,
    pub slices: usize,
    pub manifest: PathBuf,
}

pub struct Converter {
    config: ConversionConfig,
    statistics_dir: PathBuf,
}

impl Converter {
    /// Validate a request and prepare a converter for it.
    ///
    /// Computed dataset statistics are written to the current directory
    /// unless [`Converter::with_statistics_dir`] says otherwise.
    pub fn new(request: &ConversionRequest) -> Result<Self, ConvertError> {
        Ok(Self {
            config: Validator::validate(request)?,
            statistics_dir: PathBuf::from("."),
        })
    }

    pub fn with_statistics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.statistics_dir = dir.into();
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert every volume, then write the manifest.
    ///
    /// Volumes are processed one at a time in file name order. The first
    /// error aborts the run; output already written stays in place.
    pub fn run(&self) -> Result<ConversionSummary, ConvertError> {
        let config = &self.config;
        let stats = match config.normalization {
            NormalizationMode::Global => {
                let cache = StatisticsCache::new(&config.source_folder, &self.statistics_dir);
                Some(StatisticsEstimator::estimate(
                    &config.volume_files,
                    config.stats_clip,
                    &cache,
                )?)
            }
            NormalizationMode::Local => None,
        };

        let mut slices = 0;
        for path in &config.volume_files {
            slices += self.convert_volume(path, stats.as_ref())?;
        }

        let manifest = RunManifest::from(config).write(&config.target_folder)?;
        info!(
            volumes = config.volume_files.len(),
            slices,
            manifest = %manifest.display(),
            "conversion finished"
        );

        Ok(ConversionSummary {
            volumes: config.volume_files.len(),
            slices,
            manifest,
        })
    }

    fn convert_volume(
        &self,
        path: &Path,
        stats: Option<&DatasetStatistics>,
    ) -> Result<usize, ConvertError> {
        let config = &self.config;
        let mut volume = VolumeLoader::load_from_file(path)?;
        match stats {
            Some(stats) => Normalizer::global(&mut volume, config.norm_clip, stats),
            None => Normalizer::local(&mut volume),
        }

        let output_dir = config
            .target_folder
            .join(VolumeLoader::volume_basename(path)?);
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir)?;
        }
        info!(
            volume = %path.display(),
            shape = ?volume.dim(),
            output = %output_dir.display(),
            "slicing volume"
        );

        let mut written = 0;
        for (index, slice) in volume.slices(config.axis, config.spacing) {
            let image = Volume::slice_to_image(&slice, config.cast).ok_or_else(|| {
                ConvertError::SliceTooLarge {
                    volume: path.to_path_buf(),
                    index,
                }
            })?;
            let slice_path = output_dir.join(slice_file_name(index, config.axis.index()));
            image
                .save_with_format(&slice_path, ImageFormat::Png)
                .map_err(|source| ConvertError::Image {
                    path: slice_path.clone(),
                    source,
                })?;
            debug!(path = %slice_path.display(), "wrote slice");
            written += 1;
        }
        Ok(written)
    }
}

/// `slice_<index>_<axis>.png`
pub fn slice_file_name(index: usize, axis: usize) -> String {
    format!("slice_{index}_{axis}.png")
}
