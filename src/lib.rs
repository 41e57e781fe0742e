//! # nifti-slices library
//!
//! This crate converts NIfTI volumes into 8-bit grayscale PNG slices for
//! inspection or dataset preparation.
//!
//! Every `.nii.gz` file in a source folder is loaded into a [`Volume`],
//! its intensities are normalized into the 0..=255 range and every n-th
//! slice along one voxel axis is written to
//! `<target>/<volume name>/slice_<index>_<axis>.png`. A `slices_info.json`
//! manifest with the run parameters is written to the target folder once
//! all volumes are done.
//!
//! Two normalizations are available:
//!  - Local: each volume is rescaled by its own minimum and maximum
//!  - Global: voxels are clipped and standardized with a dataset-wide
//!    mean and standard deviation. The statistics are computed once over
//!    all volumes and cached in `dataset_properties.json`.
//!
//! Volumes are processed sequentially. The first error aborts the run.
//!
//! # Examples
//!
//! ## Slicing a folder of volumes
//!
//! Write every fifth slice along the first axis, normalizing each volume
//! on its own.
//!
//! ```no_run
//! # use nifti_slices::{ConversionRequest, Converter};
//! let request = ConversionRequest::new("volumes", "slices", 0, 5).with_global_norm(false);
//! let summary = Converter::new(&request)
//!     .and_then(|converter| converter.run())
//!     .expect("should have converted the volumes");
//! println!("wrote {} slices", summary.slices);
//! ```

pub mod config;
pub mod converter;
pub mod enums;
pub mod manifest;
pub mod normalizer;
pub mod statistics;
pub mod validator;
pub mod volume;
pub mod volume_loader;

pub use config::{ClipRange, ConversionConfig, ConversionRequest};
pub use converter::{ConversionSummary, ConvertError, Converter};
pub use enums::{CastMode, NormalizationMode, SliceAxis};
pub use statistics::DatasetStatistics;
pub use volume::Volume;
pub use volume_loader::VolumeLoader;
