//! Plane-wave sinusoid over the physical coordinates of a grid.
//!
//! ```text
//! value = sin(2π · Σ frequency_i · p_i + phase_offset)
//! ```
//!
//! All axes share one phase term, so the frequency vector sets the wave's
//! orientation and spatial frequency together.
//!
//! The parameters also have a flattened form, `[frequency_0 .. frequency_{D-1},
//! phase_offset]`, for fitting and optimization code. The two views are
//! converted with [`SinusoidParams::to_vector`] and
//! [`SinusoidParams::from_vector`].
use crate::error::{ensure_finite, SourceError};
use crate::grid::{Grid, Region, DEFAULT_SIZE};
use crate::source::{check_region, ImageSource};
use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SinusoidParams<const D: usize> {
    /// Cycles per physical unit along each axis.
    pub frequency: [f64; D],
    /// Phase added to every sample, in radians.
    pub phase_offset: f64,
}

impl<const D: usize> Default for SinusoidParams<D> {
    /// One cycle across a default-sized grid on every axis.
    fn default() -> Self {
        Self {
            frequency: [1.0 / DEFAULT_SIZE as f64; D],
            phase_offset: 0.0,
        }
    }
}

impl<const D: usize> SinusoidParams<D> {
    /// Length of the flattened parameter vector.
    pub const LEN: usize = D + 1;

    pub fn to_vector(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(&self.frequency);
        out.push(self.phase_offset);
        out
    }

    pub fn from_vector(values: &[f64]) -> Result<Self, SourceError> {
        if values.len() != Self::LEN {
            return Err(SourceError::DimensionMismatch {
                expected: Self::LEN,
                actual: values.len(),
            });
        }
        let mut frequency = [0.0; D];
        frequency.copy_from_slice(&values[..D]);
        let params = Self {
            frequency,
            phase_offset: values[D],
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        for &f in &self.frequency {
            ensure_finite("frequency", f)?;
        }
        ensure_finite("phase_offset", self.phase_offset)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SinusoidSource<const D: usize> {
    grid: Grid<D>,
    params: SinusoidParams<D>,
}

impl<const D: usize> SinusoidSource<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(grid: Grid<D>, params: SinusoidParams<D>) -> Result<Self, SourceError> {
        params.validate()?;
        Ok(Self { grid, params })
    }

    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid<D> {
        &mut self.grid
    }

    pub fn params(&self) -> SinusoidParams<D> {
        self.params
    }

    pub fn frequency(&self) -> [f64; D] {
        self.params.frequency
    }

    pub fn phase_offset(&self) -> f64 {
        self.params.phase_offset
    }

    pub fn set_frequency(&mut self, frequency: [f64; D]) -> Result<(), SourceError> {
        for &f in &frequency {
            ensure_finite("frequency", f)?;
        }
        self.params.frequency = frequency;
        Ok(())
    }

    pub fn set_phase_offset(&mut self, phase_offset: f64) -> Result<(), SourceError> {
        ensure_finite("phase_offset", phase_offset)?;
        self.params.phase_offset = phase_offset;
        Ok(())
    }

    pub fn number_of_parameters(&self) -> usize {
        SinusoidParams::<D>::LEN
    }

    /// Flattened `[frequency.., phase_offset]`.
    pub fn parameters(&self) -> Vec<f64> {
        self.params.to_vector()
    }

    /// Replace all parameters from the flattened form. On error the current
    /// parameters are kept.
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<(), SourceError> {
        self.params = SinusoidParams::from_vector(values)?;
        Ok(())
    }
}

impl<const D: usize> ImageSource<D> for SinusoidSource<D> {
    fn output_info(&self) -> &Grid<D> {
        &self.grid
    }

    fn validate(&self) -> Result<(), SourceError> {
        self.params.validate()
    }

    fn compute_region(&self, region: &Region<D>, out: &mut [f32]) -> Result<(), SourceError> {
        check_region(&self.grid, region, out.len())?;
        let SinusoidParams {
            frequency,
            phase_offset,
        } = self.params;

        for (index, dst) in region.indices().zip(out.iter_mut()) {
            let point = self.grid.index_to_physical(index);
            let cycles: f64 = frequency.iter().zip(&point).map(|(f, p)| f * p).sum();
            *dst = (TAU * cycles + phase_offset).sin() as f32;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flattened_parameters_follow_named_fields() {
        let mut source = SinusoidSource::<3>::new();
        source.set_frequency([0.01, 0.2, 0.4]).unwrap();
        source.set_phase_offset(0.3).unwrap();
        assert_eq!(source.number_of_parameters(), 4);
        assert_eq!(source.parameters(), vec![0.01, 0.2, 0.4, 0.3]);

        source.set_parameters(&[0.02, 0.1, 0.2, 0.2]).unwrap();
        assert_eq!(source.frequency(), [0.02, 0.1, 0.2]);
        assert_eq!(source.phase_offset(), 0.2);
    }

    #[test]
    fn vector_view_round_trips() {
        let params = SinusoidParams {
            frequency: [0.5, -1.25],
            phase_offset: 1.5,
        };
        let back = SinusoidParams::<2>::from_vector(&params.to_vector()).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn wrong_vector_length_keeps_previous_parameters() {
        let mut source = SinusoidSource::<3>::new();
        source.set_parameters(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        let err = source.set_parameters(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            SourceError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        );
        assert!(source.set_parameters(&[0.0; 5]).is_err());
        assert!(source.set_parameters(&[0.0, f64::NAN, 0.0, 0.0]).is_err());
        assert_eq!(source.parameters(), vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn one_dimensional_wave_crosses_zero_at_half_period() {
        let grid = Grid::<1>::new([10]).unwrap();
        let params = SinusoidParams {
            frequency: [0.1],
            phase_offset: 0.0,
        };
        let source = SinusoidSource::with_params(grid, params).unwrap();
        let region = source.grid().largest_region();
        let mut out = vec![0.0f32; 10];
        source.compute_region(&region, &mut out).unwrap();
        assert_abs_diff_eq!(out[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[5], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], (TAU * 0.2).sin() as f32, epsilon = 1e-6);
        assert!(out[1] > 0.0 && out[7] < 0.0);
    }

    #[test]
    fn samples_use_physical_coordinates() {
        let grid = Grid::<2>::new([8, 8])
            .and_then(|g| g.with_spacing([0.5, 2.0]))
            .and_then(|g| g.with_origin([1.0, -3.0]))
            .unwrap();
        let params = SinusoidParams {
            frequency: [0.15, 0.05],
            phase_offset: 0.7,
        };
        let source = SinusoidSource::with_params(grid, params).unwrap();
        let region = Region::new([3, 5], [1, 1]);
        let mut out = [0.0f32];
        source.compute_region(&region, &mut out).unwrap();
        // p = (1 + 3 * 0.5, -3 + 5 * 2) = (2.5, 7)
        let expected = (TAU * (0.15 * 2.5 + 0.05 * 7.0) + 0.7).sin();
        assert_abs_diff_eq!(out[0] as f64, expected, epsilon = 1e-6);
    }

    #[test]
    fn non_finite_named_parameters_are_rejected() {
        let mut source = SinusoidSource::<2>::new();
        assert!(source.set_frequency([f64::INFINITY, 0.0]).is_err());
        assert!(source.set_phase_offset(f64::NAN).is_err());
        assert_eq!(source.params(), SinusoidParams::default());
    }
}
