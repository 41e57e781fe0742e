#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::Array3;
use nifti::writer::WriterOptions;

/// Volume whose voxels count up in memory order, offset by `offset`.
pub fn ramp(shape: (usize, usize, usize), offset: f32) -> Array3<f32> {
    let (_, d1, d2) = shape;
    Array3::from_shape_fn(shape, |(i, j, k)| (i * d1 * d2 + j * d2 + k) as f32 + offset)
}

/// Write `data` as a gzipped NIfTI file named `name` inside `dir`.
pub fn write_volume(dir: &Path, name: &str, data: &Array3<f32>) -> PathBuf {
    let path = dir.join(name);
    WriterOptions::new(&path)
        .write_nifti(data)
        .expect("should have written test volume");
    path
}

/// Every file below `dir` with its contents, sorted by relative path.
pub fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let contents = std::fs::read(&path).unwrap();
                files.push((path.strip_prefix(dir).unwrap().to_path_buf(), contents));
            }
        }
    }
    files.sort();
    files
}

/// File names directly inside `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
