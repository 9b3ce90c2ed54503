#![doc = include_str!("../README.md")]

// Core: sampling geometry, sources and their evaluation.
pub mod buffer;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod source;
pub mod sources;

// Image analysis.
pub mod phase_symmetry;

// Supporting modules for the tools.
pub mod config;
pub mod diagnostics;
pub mod image;

// --- High-level re-exports -------------------------------------------------

pub use crate::buffer::SampleBuffer;
pub use crate::error::SourceError;
pub use crate::evaluator::RegionEvaluator;
pub use crate::grid::{Direction, Grid, Region};
pub use crate::source::{ImageSource, SourcePipeline};
pub use crate::sources::{
    butterworth_response, ButterworthParams, ButterworthSource, SinusoidParams, SinusoidSource,
};

pub use crate::phase_symmetry::{PhaseSymmetry, PhaseSymmetryParams};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use field_sources::prelude::*;
///
/// # fn main() -> Result<(), SourceError> {
/// let mut source = SinusoidSource::<2>::new();
/// source.grid_mut().set_size([128, 96])?;
/// source.set_parameters(&[0.05, 0.0, 0.0])?;
///
/// let buffer = RegionEvaluator::default().evaluate(&source)?;
/// let symmetry = PhaseSymmetry::default().compute(&buffer.to_image())?;
/// println!("peak={:?}", symmetry.min_max());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageF32;
    pub use crate::{
        ButterworthParams, ButterworthSource, Grid, ImageSource, PhaseSymmetry,
        PhaseSymmetryParams, Region, RegionEvaluator, SampleBuffer, SinusoidParams,
        SinusoidSource, SourceError, SourcePipeline,
    };
}
