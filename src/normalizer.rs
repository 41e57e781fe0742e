use crate::config::ClipRange;
use crate::statistics::DatasetStatistics;
use crate::volume::Volume;

/// Output intensity of a fully rescaled voxel.
const INTENSITY_MAX: f32 = 255.0;

pub struct Normalizer;

impl Normalizer {
    /// Rescale a volume into `[0, 255]` using its own extrema.
    ///
    /// A constant volume maps to all zeros.
    pub fn local(volume: &mut Volume) {
        let Some((min, max)) = volume.min_max() else {
            return;
        };
        let range = max - min;
        if range == 0.0 {
            volume.data_mut().fill(0.0);
            return;
        }
        volume
            .data_mut()
            .mapv_inplace(|v| (v - min) / range * INTENSITY_MAX);
    }

    /// Standardize a volume against dataset-wide statistics.
    ///
    /// Voxels are clipped to `clip`, shifted by `clip.min` and scaled by
    /// `255 / (max - min)` where `min`/`max` are the volume's unclipped
    /// extrema. The global mean and std are mapped into the same scale and
    /// used to standardize the result. Output is not bounded to `[0, 255]`.
    pub fn global(volume: &mut Volume, clip: ClipRange, stats: &DatasetStatistics) {
        let Some((min, max)) = volume.min_max() else {
            return;
        };
        let range = max - min;
        let scale = if range == 0.0 { 0.0 } else { INTENSITY_MAX / range };

        let mean = (stats.mean as f32 - clip.min) * scale;
        let std = stats.std as f32 * scale;
        if std == 0.0 || !std.is_finite() {
            volume.data_mut().fill(0.0);
            return;
        }

        volume.data_mut().mapv_inplace(|v| {
            let scaled = (clip.clip(v) - clip.min) * scale;
            (scaled - mean) / std
        });
    }
}
