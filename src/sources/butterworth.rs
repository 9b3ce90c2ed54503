//! Butterworth lowpass magnitude rendered directly as an image.
//!
//! For every index the source measures the normalized distance to the center
//! of the index grid,
//!
//! ```text
//! r = sqrt(Σ ((size_i / 2 − index_i) / size_i)²)
//! ```
//!
//! and stores `1 / (1 + (r / cutoff)^(2·order))`. The value is 1 at the
//! center, 0.5 at `r == cutoff` and decreases monotonically outward.
//!
//! The center is taken in index units. Spacing, origin and direction are
//! carried to the output geometry but do not move or stretch the pattern.
use crate::error::{ensure_positive, SourceError};
use crate::grid::{Grid, Region};
use crate::source::{check_region, ImageSource};
use serde::{Deserialize, Serialize};

/// Butterworth lowpass magnitude at normalized `radius`.
///
/// `cutoff` must be non-zero; the even exponent keeps the ratio term
/// non-negative for any finite input. Overflowing inputs yield non-finite
/// values rather than errors.
#[inline]
pub fn butterworth_response(radius: f64, cutoff: f64, order: f64) -> f64 {
    let ratio = radius / cutoff;
    1.0 / (1.0 + ratio.powf(2.0 * order))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButterworthParams {
    /// Normalized radius where the response drops to one half.
    pub cutoff: f64,
    /// Rolloff steepness; larger orders give a sharper transition.
    pub order: f64,
}

impl Default for ButterworthParams {
    fn default() -> Self {
        Self {
            cutoff: 0.5,
            order: 1.0,
        }
    }
}

impl ButterworthParams {
    pub fn validate(&self) -> Result<(), SourceError> {
        ensure_positive("cutoff", self.cutoff)?;
        ensure_positive("order", self.order)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ButterworthSource<const D: usize> {
    grid: Grid<D>,
    params: ButterworthParams,
}

impl<const D: usize> ButterworthSource<D> {
    /// Source on the default 64-per-axis grid with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(grid: Grid<D>, params: ButterworthParams) -> Result<Self, SourceError> {
        params.validate()?;
        Ok(Self { grid, params })
    }

    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid<D> {
        &mut self.grid
    }

    pub fn params(&self) -> ButterworthParams {
        self.params
    }

    pub fn cutoff(&self) -> f64 {
        self.params.cutoff
    }

    pub fn order(&self) -> f64 {
        self.params.order
    }

    pub fn set_cutoff(&mut self, cutoff: f64) -> Result<(), SourceError> {
        ensure_positive("cutoff", cutoff)?;
        self.params.cutoff = cutoff;
        Ok(())
    }

    pub fn set_order(&mut self, order: f64) -> Result<(), SourceError> {
        ensure_positive("order", order)?;
        self.params.order = order;
        Ok(())
    }
}

impl<const D: usize> ImageSource<D> for ButterworthSource<D> {
    fn output_info(&self) -> &Grid<D> {
        &self.grid
    }

    fn validate(&self) -> Result<(), SourceError> {
        self.params.validate()
    }

    fn compute_region(&self, region: &Region<D>, out: &mut [f32]) -> Result<(), SourceError> {
        check_region(&self.grid, region, out.len())?;
        let size = self.grid.size();
        let ButterworthParams { cutoff, order } = self.params;

        let mut center = [0.0; D];
        for axis in 0..D {
            center[axis] = size[axis] as f64 / 2.0;
        }

        for (index, dst) in region.indices().zip(out.iter_mut()) {
            let mut radius = 0.0;
            for axis in 0..D {
                let dist = (center[axis] - index[axis] as f64) / size[axis] as f64;
                radius += dist * dist;
            }
            *dst = butterworth_response(radius.sqrt(), cutoff, order) as f32;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn render<const D: usize>(source: &ButterworthSource<D>) -> Vec<f32> {
        let region = source.grid().largest_region();
        let mut out = vec![0.0f32; region.len()];
        source.compute_region(&region, &mut out).unwrap();
        out
    }

    #[test]
    fn response_hits_one_and_one_half() {
        assert_eq!(butterworth_response(0.0, 0.3, 2.0), 1.0);
        assert_eq!(butterworth_response(0.3, 0.3, 2.0), 0.5);
        assert_abs_diff_eq!(
            butterworth_response(0.5, 0.25, 2.0),
            1.0 / 17.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn center_is_one_for_even_sizes() {
        for size in [2usize, 8, 16, 64] {
            let mut source = ButterworthSource::<2>::new();
            source.grid_mut().set_size([size, size]).unwrap();
            let out = render(&source);
            let grid = source.grid();
            let center = grid.linear_index(&[size / 2, size / 2]);
            assert_eq!(out[center], 1.0, "size {size}");
        }
    }

    #[test]
    fn cutoff_radius_evaluates_to_one_half() {
        let mut source = ButterworthSource::<1>::new();
        source.set_cutoff(0.25).unwrap();
        source.set_order(3.0).unwrap();
        let out = render(&source);
        // (32 - 16) / 64 == 0.25
        assert_eq!(out[16], 0.5);
        assert_eq!(out[48], 0.5);
    }

    #[test]
    fn response_decreases_with_radius() {
        let mut source = ButterworthSource::<1>::new();
        source.set_cutoff(0.2).unwrap();
        source.set_order(4.0).unwrap();
        let out = render(&source);
        for x in 33..64 {
            assert!(out[x] <= out[x - 1], "x={x}: {} > {}", out[x], out[x - 1]);
        }
        for x in 1..=32 {
            assert!(out[x] >= out[x - 1], "x={x}: {} < {}", out[x], out[x - 1]);
        }
    }

    #[test]
    fn pattern_ignores_physical_geometry() {
        let plain = ButterworthSource::<2>::new();
        let mut moved = ButterworthSource::<2>::new();
        moved.grid_mut().set_spacing([0.25, 3.0]).unwrap();
        moved.grid_mut().set_origin([-10.0, 7.5]).unwrap();
        assert_eq!(render(&plain), render(&moved));
    }

    #[test]
    fn degenerate_parameters_are_rejected() {
        let mut source = ButterworthSource::<2>::new();
        assert!(matches!(
            source.set_cutoff(0.0),
            Err(SourceError::InvalidParameter { name: "cutoff", .. })
        ));
        assert!(source.set_cutoff(-0.1).is_err());
        assert!(source.set_cutoff(f64::NAN).is_err());
        assert!(source.set_order(0.0).is_err());
        assert_eq!(source.params(), ButterworthParams::default());

        let bad = ButterworthParams {
            cutoff: 0.0,
            order: 1.0,
        };
        assert!(ButterworthSource::<2>::with_params(Grid::default(), bad).is_err());
    }

    #[test]
    fn extreme_order_saturates_instead_of_failing() {
        let mut source = ButterworthSource::<1>::new();
        source.set_cutoff(1e-300).unwrap();
        source.set_order(1e6).unwrap();
        let out = render(&source);
        // Overflow saturates the ratio term: the center stays 1, the rest 0.
        assert_eq!(out[32], 1.0);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn mismatched_output_is_an_invalid_region() {
        let source = ButterworthSource::<2>::new();
        let region = Region::new([0, 0], [4, 4]);
        let mut out = vec![0.0f32; 15];
        assert!(matches!(
            source.compute_region(&region, &mut out),
            Err(SourceError::InvalidRegion { .. })
        ));
        let outside = Region::new([62, 0], [4, 4]);
        let mut out = vec![0.0f32; 16];
        assert!(source.compute_region(&outside, &mut out).is_err());
    }
}
