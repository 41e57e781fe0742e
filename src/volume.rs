use crate::enums::CastMode;
use crate::enums::SliceAxis;

use image::GrayImage;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::Axis;

#[derive(Debug, Default, Clone)]
pub struct Volume {
    pub data: Array3<f32>,
}

impl Volume {
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Get the dimensions of the volume in NIfTI axis order
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    pub fn data_mut(&mut self) -> &mut Array3<f32> {
        &mut self.data
    }

    /// Number of voxels along `axis`
    pub fn extent(&self, axis: SliceAxis) -> usize {
        self.data.len_of(Axis(axis.index()))
    }

    /// Smallest and largest voxel value, ignoring NaN. `None` for an empty
    /// or all-NaN volume.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let (min, max) = self
            .data
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        (min <= max).then_some((min, max))
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        axis: SliceAxis,
    ) -> Option<ArrayView2<'_, f32>> {
        if index >= self.extent(axis) {
            return None;
        }
        Some(self.data.index_axis(Axis(axis.index()), index))
    }

    /// Lazily walk the volume along `axis`, yielding every `spacing`-th slice
    /// starting at index 0. A zero spacing yields nothing.
    pub fn slices(&self, axis: SliceAxis, spacing: usize) -> Slices<'_> {
        Slices {
            volume: self,
            axis,
            spacing,
            next: 0,
        }
    }

    /// Encode a 2D slice as an 8-bit grayscale image. Rows of the slice
    /// become image rows, so a `(rows, cols)` slice is `cols` pixels wide.
    pub fn slice_to_image(slice: &ArrayView2<'_, f32>, cast: CastMode) -> Option<GrayImage> {
        let (height, width) = slice.dim();
        let pixel_data: Vec<u8> = slice.iter().map(|&v| cast.to_u8(v)).collect();
        GrayImage::from_raw(
            u32::try_from(width).ok()?,
            u32::try_from(height).ok()?,
            pixel_data,
        )
    }
}

/// Iterator returned by [`Volume::slices`].
#[derive(Debug)]
pub struct Slices<'a> {
    volume: &'a Volume,
    axis: SliceAxis,
    spacing: usize,
    next: usize,
}

impl<'a> Iterator for Slices<'a> {
    type Item = (usize, ArrayView2<'a, f32>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.spacing == 0 {
            return None;
        }
        let index = self.next;
        let slice = self.volume.get_slice_from_axis(index, self.axis)?;
        self.next = index.saturating_add(self.spacing);
        Some((index, slice))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let extent = self.volume.extent(self.axis);
        let remaining = if self.spacing == 0 || self.next >= extent {
            0
        } else {
            (extent - self.next).div_ceil(self.spacing)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Slices<'_> {}
