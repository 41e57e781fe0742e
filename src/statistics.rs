use crate::config::ClipRange;
use crate::volume::Volume;
use crate::volume_loader::{VolumeLoader, VolumeLoaderError};

use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};

/// File name of the cached dataset statistics.
pub const PROPERTIES_FILE: &str = "dataset_properties.json";

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("No volumes to compute statistics from")]
    NoVolumes,

    #[error("Failed to load volume: {0}")]
    Loader(#[from] VolumeLoaderError),

    #[error("Dataset properties {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dataset-wide intensity statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub mean: f64,
    pub std: f64,
    /// Per-volume means of clipped voxels
    #[serde(default)]
    pub means: Vec<f64>,
    /// Per-volume population variances of clipped voxels
    #[serde(default)]
    pub variances: Vec<f64>,
}

impl DatasetStatistics {
    /// Combine per-volume moments. The std is `sqrt(mean of variances)`,
    /// which ignores differing voxel counts and the spread of the means.
    pub fn from_moments(means: Vec<f64>, variances: Vec<f64>) -> Result<Self, StatisticsError> {
        if means.is_empty() || means.len() != variances.len() {
            return Err(StatisticsError::NoVolumes);
        }
        let count = means.len() as f64;
        let mean = means.iter().sum::<f64>() / count;
        let std = (variances.iter().sum::<f64>() / count).sqrt();
        Ok(Self {
            mean,
            std,
            means,
            variances,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StatisticsError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|source| StatisticsError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StatisticsError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self).map_err(|source| StatisticsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush()?;
        Ok(())
    }
}

/// Mean and population variance of a volume's voxels after clipping.
pub fn clipped_moments(volume: &Volume, clip: ClipRange) -> (f64, f64) {
    let data = volume.data();
    let count = data.len();
    if count == 0 {
        return (f64::NAN, f64::NAN);
    }
    let count = count as f64;
    let mean = data.iter().map(|&v| f64::from(clip.clip(v))).sum::<f64>() / count;
    let variance = data
        .iter()
        .map(|&v| {
            let d = f64::from(clip.clip(v)) - mean;
            d * d
        })
        .sum::<f64>()
        / count;
    (mean, variance)
}

/// Where dataset statistics are looked up and where fresh ones are stored.
#[derive(Debug, Clone)]
pub struct StatisticsCache {
    pub read_path: PathBuf,
    pub write_path: PathBuf,
}

impl StatisticsCache {
    /// Look up the cache in the source folder, store new ones in `write_dir`.
    pub fn new(source_folder: impl AsRef<Path>, write_dir: impl AsRef<Path>) -> Self {
        Self {
            read_path: source_folder.as_ref().join(PROPERTIES_FILE),
            write_path: write_dir.as_ref().join(PROPERTIES_FILE),
        }
    }

    fn paths_differ(&self) -> bool {
        let dir = |p: &Path| p.parent().and_then(|d| fs::canonicalize(d).ok());
        match (dir(&self.read_path), dir(&self.write_path)) {
            (Some(read), Some(write)) => read != write,
            _ => self.read_path != self.write_path,
        }
    }
}

pub struct StatisticsEstimator;

impl StatisticsEstimator {
    /// Return cached statistics if present, otherwise compute them over
    /// `volume_files` and persist them.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is malformed, a volume cannot be loaded
    /// or the computed statistics cannot be written
    pub fn estimate(
        volume_files: &[PathBuf],
        clip: ClipRange,
        cache: &StatisticsCache,
    ) -> Result<DatasetStatistics, StatisticsError> {
        if cache.read_path.is_file() {
            let stats = DatasetStatistics::load(&cache.read_path)?;
            info!(
                path = %cache.read_path.display(),
                mean = stats.mean,
                std = stats.std,
                "loaded cached dataset statistics"
            );
            return Ok(stats);
        }

        let stats = Self::compute(volume_files, clip)?;
        if cache.paths_differ() {
            warn!(
                read = %cache.read_path.display(),
                write = %cache.write_path.display(),
                "dataset statistics are written outside the folder they are read from"
            );
        }
        stats.save(&cache.write_path)?;
        info!(
            path = %cache.write_path.display(),
            mean = stats.mean,
            std = stats.std,
            "computed dataset statistics"
        );
        Ok(stats)
    }

    pub fn compute(
        volume_files: &[PathBuf],
        clip: ClipRange,
    ) -> Result<DatasetStatistics, StatisticsError> {
        let mut means = Vec::with_capacity(volume_files.len());
        let mut variances = Vec::with_capacity(volume_files.len());
        for path in volume_files {
            let volume = VolumeLoader::load_from_file(path)?;
            let (mean, variance) = clipped_moments(&volume, clip);
            means.push(mean);
            variances.push(variance);
        }
        DatasetStatistics::from_moments(means, variances)
    }
}
