//! Capability set shared by the parametric sources, plus an output cache that
//! regenerates only when the source changed.
use crate::buffer::SampleBuffer;
use crate::error::SourceError;
use crate::evaluator::RegionEvaluator;
use crate::grid::{Grid, Region};
use log::debug;

/// A pure per-index generator over a sampling grid.
///
/// `compute_region` must depend only on the index, the grid and the source's
/// own parameters so that any partition of the grid produces the same output.
pub trait ImageSource<const D: usize>: Sync {
    /// Geometry of the output the source produces.
    fn output_info(&self) -> &Grid<D>;

    /// Re-check parameters before an evaluation starts.
    fn validate(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Write the samples of `region` into `out`, in region order.
    ///
    /// Fails with [`SourceError::InvalidRegion`] when the region leaves the
    /// grid or `out` does not hold exactly `region.len()` values.
    fn compute_region(&self, region: &Region<D>, out: &mut [f32]) -> Result<(), SourceError>;
}

/// Common precondition of [`ImageSource::compute_region`].
pub(crate) fn check_region<const D: usize>(
    grid: &Grid<D>,
    region: &Region<D>,
    out_len: usize,
) -> Result<(), SourceError> {
    if !region.is_inside(grid) {
        return Err(SourceError::invalid_region(
            region,
            format!("outside grid of size {:?}", grid.size()),
        ));
    }
    if out_len != region.len() {
        return Err(SourceError::invalid_region(
            region,
            format!("output holds {out_len} values, region has {}", region.len()),
        ));
    }
    Ok(())
}

/// Owns a source and the output generated from it.
///
/// The cached buffer is tagged with a snapshot of the source taken when it was
/// generated; it is stale as soon as the current source compares unequal to
/// that snapshot. Re-assigning an unchanged value therefore keeps it fresh.
#[derive(Clone, Debug)]
pub struct SourcePipeline<S, const D: usize> {
    source: S,
    cached: Option<(S, SampleBuffer<D>)>,
}

impl<S, const D: usize> SourcePipeline<S, D>
where
    S: ImageSource<D> + Clone + PartialEq,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access for parameter changes. The cached output stays around
    /// and is compared against the source on the next access.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn is_stale(&self) -> bool {
        self.cached
            .as_ref()
            .map_or(true, |(snapshot, _)| *snapshot != self.source)
    }

    /// Regenerate the output when stale and return it.
    pub fn update(&mut self, evaluator: &RegionEvaluator) -> Result<&SampleBuffer<D>, SourceError> {
        let entry = match self.cached.take() {
            Some(entry) if entry.0 == self.source => {
                debug!("SourcePipeline::update output is up to date");
                entry
            }
            _ => {
                debug!("SourcePipeline::update regenerating output");
                let buffer = evaluator.evaluate(&self.source)?;
                (self.source.clone(), buffer)
            }
        };
        Ok(&self.cached.insert(entry).1)
    }

    /// Output of the last [`update`](Self::update), if still fresh.
    pub fn output(&self) -> Option<&SampleBuffer<D>> {
        match &self.cached {
            Some((snapshot, buffer)) if *snapshot == self.source => Some(buffer),
            _ => None,
        }
    }

    /// Hand the fresh output to the caller, dropping the cache.
    pub fn into_output(self) -> Option<SampleBuffer<D>> {
        match self.cached {
            Some((snapshot, buffer)) if snapshot == self.source => Some(buffer),
            _ => None,
        }
    }
}
