//! Configuration of the `generate_source` tool.
//!
//! Vectors are plain JSON arrays; their length selects the dimension, and
//! every vector of one grid must agree with `size`.
use crate::error::SourceError;
use crate::grid::{Direction, Grid};
use crate::image::io::Intensity;
use crate::sources::{ButterworthParams, SinusoidParams};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct SourceToolConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub grid: GridConfig,
    /// Region count; defaults to one per pool thread.
    #[serde(default)]
    pub workers: Option<usize>,
    pub output: SourceOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Butterworth(ButterworthParams),
    Sinusoid(SinusoidConfig),
}

impl SourceConfig {
    pub fn name(&self) -> &'static str {
        match self {
            SourceConfig::Butterworth(_) => "butterworth",
            SourceConfig::Sinusoid(_) => "sinusoid",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SinusoidConfig {
    /// Cycles per physical unit along each axis; empty means the default.
    pub frequency: Vec<f64>,
    pub phase_offset: f64,
}

impl SinusoidConfig {
    pub fn to_params<const D: usize>(&self) -> Result<SinusoidParams<D>, SourceError> {
        let mut params = SinusoidParams::<D>::default();
        if !self.frequency.is_empty() {
            params.frequency = to_array(&self.frequency)?;
        }
        params.phase_offset = self.phase_offset;
        params.validate()?;
        Ok(params)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: Vec<usize>,
    pub spacing: Option<Vec<f64>>,
    pub origin: Option<Vec<f64>>,
    /// Row-major `D × D` direction matrix.
    pub direction: Option<Vec<f64>>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: vec![crate::grid::DEFAULT_SIZE; 2],
            spacing: None,
            origin: None,
            direction: None,
        }
    }
}

impl GridConfig {
    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    pub fn to_grid<const D: usize>(&self) -> Result<Grid<D>, SourceError> {
        let mut grid = Grid::new(to_array(&self.size)?)?;
        if let Some(spacing) = &self.spacing {
            grid = grid.with_spacing(to_array(spacing)?)?;
        }
        if let Some(origin) = &self.origin {
            grid = grid.with_origin(to_array(origin)?)?;
        }
        if let Some(direction) = &self.direction {
            if direction.len() != D * D {
                return Err(SourceError::DimensionMismatch {
                    expected: D * D,
                    actual: direction.len(),
                });
            }
            grid = grid.with_direction(Direction::<D>::from_row_slice(direction))?;
        }
        Ok(grid)
    }
}

#[derive(Debug, Deserialize)]
pub struct SourceOutputConfig {
    pub summary_json: PathBuf,
    /// Written for 2-D grids only.
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub intensity: Intensity,
}

fn to_array<T: Copy, const D: usize>(values: &[T]) -> Result<[T; D], SourceError> {
    <[T; D]>::try_from(values).map_err(|_| SourceError::DimensionMismatch {
        expected: D,
        actual: values.len(),
    })
}
