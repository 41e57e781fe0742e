use crate::volume::Volume;

use ndarray::{ArrayD, Axis, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

/// File name suffix of the volumes picked up from a source folder.
pub const VOLUME_EXTENSION: &str = ".nii.gz";

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("Expected a 3D volume in {path}, got shape {shape:?}")]
    NotThreeDimensional { path: PathBuf, shape: Vec<usize> },

    #[error("Cannot derive an output name from {0}")]
    InvalidFileName(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NIfTI error in {path}: {source}")]
    Nifti {
        path: PathBuf,
        #[source]
        source: nifti::NiftiError,
    },
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// List the `.nii.gz` files directly inside `path`, sorted by file name
    pub fn list_volume_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, VolumeLoaderError> {
        let mut paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|s| s.to_str())
                        .is_some_and(|name| name.ends_with(VOLUME_EXTENSION))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Load a single NIfTI file into a volume
    ///
    /// Scaling slope and intercept from the header are applied. Trailing
    /// singleton dimensions (e.g. a 4D file with one time point) are dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the data is not 3D
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Volume, VolumeLoaderError> {
        let path = path.as_ref();
        let nifti_error = |source| VolumeLoaderError::Nifti {
            path: path.to_path_buf(),
            source,
        };

        let object = ReaderOptions::new().read_file(path).map_err(nifti_error)?;
        let data: ArrayD<f32> = object
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(nifti_error)?;

        let data = Self::squeeze_trailing(data);
        let shape = data.shape().to_vec();
        let data = data.into_dimensionality::<Ix3>().map_err(|_| {
            VolumeLoaderError::NotThreeDimensional {
                path: path.to_path_buf(),
                shape,
            }
        })?;
        debug!(path = %path.display(), shape = ?data.dim(), "loaded volume");

        Ok(Volume::new(data))
    }

    /// Read one volume and report its shape
    pub fn load_shape(path: impl AsRef<Path>) -> Result<(usize, usize, usize), VolumeLoaderError> {
        Self::load_from_file(path).map(|volume| volume.dim())
    }

    /// Output folder name for a volume: its file name up to the first `.`
    pub fn volume_basename(path: impl AsRef<Path>) -> Result<String, VolumeLoaderError> {
        let path = path.as_ref();
        path.file_name()
            .and_then(|s| s.to_str())
            .and_then(|name| name.split('.').next())
            .filter(|stem| !stem.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| VolumeLoaderError::InvalidFileName(path.to_path_buf()))
    }

    fn squeeze_trailing(mut data: ArrayD<f32>) -> ArrayD<f32> {
        while data.ndim() > 3 && data.shape().last() == Some(&1) {
            let last = data.ndim() - 1;
            data = data.remove_axis(Axis(last));
        }
        data
    }
}
