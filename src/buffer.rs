//! Dense output buffer for generated samples.
//!
//! Samples are stored as `f32` in a single `Vec` laid out with axis 0
//! varying fastest, matching [`Grid::linear_index`]. The buffer keeps the grid
//! it was generated on so downstream code can recover the physical geometry.
use crate::error::SourceError;
use crate::grid::{Grid, Region};
use crate::image::ImageF32;

#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer<const D: usize> {
    grid: Grid<D>,
    data: Vec<f32>,
}

impl<const D: usize> SampleBuffer<D> {
    /// Zero-initialized buffer covering `grid`.
    pub fn new(grid: Grid<D>) -> Self {
        let len = grid.len();
        Self {
            grid,
            data: vec![0.0; len],
        }
    }

    pub fn from_vec(grid: Grid<D>, data: Vec<f32>) -> Result<Self, SourceError> {
        if data.len() != grid.len() {
            return Err(SourceError::DimensionMismatch {
                expected: grid.len(),
                actual: data.len(),
            });
        }
        Ok(Self { grid, data })
    }

    #[inline]
    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    #[inline]
    pub fn size(&self) -> [usize; D] {
        self.grid.size()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Sample at `index`. Panics when the index is outside the grid.
    #[inline]
    pub fn get(&self, index: [usize; D]) -> f32 {
        self.data[self.grid.linear_index(&index)]
    }

    #[inline]
    pub fn set(&mut self, index: [usize; D], value: f32) {
        let i = self.grid.linear_index(&index);
        self.data[i] = value;
    }

    /// Copy of the samples of `region`, in region order.
    pub fn region_values(&self, region: &Region<D>) -> Result<Vec<f32>, SourceError> {
        self.check_region(region)?;
        Ok(region
            .indices()
            .map(|idx| self.data[self.grid.linear_index(&idx)])
            .collect())
    }

    /// Scatter `values` (in region order) into `region`.
    pub fn write_region(&mut self, region: &Region<D>, values: &[f32]) -> Result<(), SourceError> {
        self.check_region(region)?;
        if values.len() != region.len() {
            return Err(SourceError::invalid_region(
                region,
                format!("expected {} values, got {}", region.len(), values.len()),
            ));
        }
        for (idx, &v) in region.indices().zip(values) {
            let i = self.grid.linear_index(&idx);
            self.data[i] = v;
        }
        Ok(())
    }

    pub fn non_finite_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_finite()).count()
    }

    /// Fails with [`SourceError::NumericOverflow`] when any sample is NaN or
    /// infinite. Evaluation never performs this check on its own.
    pub fn ensure_finite(&self) -> Result<(), SourceError> {
        match self.non_finite_count() {
            0 => Ok(()),
            count => Err(SourceError::NumericOverflow { count }),
        }
    }

    /// Smallest and largest finite sample.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    fn check_region(&self, region: &Region<D>) -> Result<(), SourceError> {
        if region.is_inside(&self.grid) {
            Ok(())
        } else {
            Err(SourceError::invalid_region(
                region,
                format!("outside grid of size {:?}", self.grid.size()),
            ))
        }
    }
}

impl SampleBuffer<2> {
    /// Copy a 2-D buffer into a row-major image (x along rows).
    pub fn to_image(&self) -> ImageF32 {
        let [w, h] = self.size();
        ImageF32 {
            w,
            h,
            stride: w,
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_round_trip_writes_only_the_region() {
        let grid = Grid::<2>::new([4, 3]).unwrap();
        let mut buf = SampleBuffer::new(grid);
        let region = Region::new([1, 1], [2, 2]);
        buf.write_region(&region, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(buf.get([1, 1]), 1.0);
        assert_eq!(buf.get([2, 1]), 2.0);
        assert_eq!(buf.get([1, 2]), 3.0);
        assert_eq!(buf.get([2, 2]), 4.0);
        assert_eq!(buf.as_slice().iter().filter(|&&v| v != 0.0).count(), 4);
        assert_eq!(
            buf.region_values(&region).unwrap(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn out_of_bounds_regions_are_rejected() {
        let grid = Grid::<2>::new([4, 3]).unwrap();
        let mut buf = SampleBuffer::new(grid);
        let region = Region::new([3, 0], [2, 1]);
        assert!(matches!(
            buf.write_region(&region, &[0.0, 0.0]),
            Err(SourceError::InvalidRegion { .. })
        ));
        assert!(buf.region_values(&region).is_err());
        assert!(buf
            .write_region(&Region::new([0, 0], [2, 1]), &[1.0])
            .is_err());
    }

    #[test]
    fn non_finite_samples_are_reported_on_request() {
        let grid = Grid::<1>::new([4]).unwrap();
        let buf = SampleBuffer::from_vec(grid, vec![0.0, f32::NAN, 1.0, f32::INFINITY]).unwrap();
        assert_eq!(buf.non_finite_count(), 2);
        assert_eq!(
            buf.ensure_finite(),
            Err(SourceError::NumericOverflow { count: 2 })
        );
        assert_eq!(buf.min_max(), Some((0.0, 1.0)));
    }

    #[test]
    fn two_dimensional_buffer_converts_to_image() {
        let grid = Grid::<2>::new([3, 2]).unwrap();
        let buf = SampleBuffer::from_vec(grid, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let img = buf.to_image();
        assert_eq!((img.w, img.h), (3, 2));
        assert_eq!(img.get(2, 0), 2.0);
        assert_eq!(img.get(0, 1), 3.0);
    }
}
