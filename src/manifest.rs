use crate::config::{ClipRange, ConversionConfig};
use crate::enums::{CastMode, NormalizationMode};

use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// File name of the run manifest inside the target folder.
pub const MANIFEST_FILE: &str = "slices_info.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parameters of a conversion run, as written next to its output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunManifest {
    pub source_folder: PathBuf,
    pub target_folder: PathBuf,
    pub slice_dim: usize,
    pub spacing: usize,
    pub global_norm: bool,
    pub cast: CastMode,
    pub stats_clip: ClipRange,
    pub norm_clip: ClipRange,
}

impl From<&ConversionConfig> for RunManifest {
    fn from(config: &ConversionConfig) -> Self {
        Self {
            source_folder: config.source_folder.clone(),
            target_folder: config.target_folder.clone(),
            slice_dim: config.axis.index(),
            spacing: config.spacing,
            global_norm: config.normalization == NormalizationMode::Global,
            cast: config.cast,
            stats_clip: config.stats_clip,
            norm_clip: config.norm_clip,
        }
    }
}

impl RunManifest {
    /// Write the manifest into `target_folder`, replacing any previous one
    pub fn write(&self, target_folder: impl AsRef<Path>) -> Result<PathBuf, ManifestError> {
        let path = target_folder.as_ref().join(MANIFEST_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(path)
    }
}
