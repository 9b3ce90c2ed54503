//! Region-parallel evaluation of an [`ImageSource`].
//!
//! The largest region of the output grid is split into slabs along the slowest
//! axis. Each slab is a contiguous run of the output buffer, so the buffer can
//! be carved into disjoint `&mut [f32]` pieces and handed to independent
//! workers without locks. With the `parallel` feature the slabs run on the
//! Rayon pool; otherwise they run one after the other. Either way the result
//! is identical, because sources are pure per-index functions.
//!
//! [`RegionEvaluator::evaluate_regions`] accepts an arbitrary caller-supplied
//! partition instead. Those regions need not be contiguous in memory: each is
//! computed into its own scratch vector and scattered after the join.
use crate::buffer::SampleBuffer;
use crate::error::SourceError;
use crate::grid::{Grid, Region};
use crate::source::ImageSource;
use log::debug;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Splits a grid into regions and fills them with a source.
#[derive(Clone, Copy, Debug)]
pub struct RegionEvaluator {
    workers: usize,
    parallel: bool,
}

impl Default for RegionEvaluator {
    /// One region per pool thread, parallel when the feature is enabled.
    fn default() -> Self {
        Self {
            workers: default_workers(),
            parallel: cfg!(feature = "parallel"),
        }
    }
}

#[cfg(feature = "parallel")]
fn default_workers() -> usize {
    rayon::current_num_threads().max(1)
}

#[cfg(not(feature = "parallel"))]
fn default_workers() -> usize {
    1
}

impl RegionEvaluator {
    /// Split into up to `workers` regions. Regions run in parallel only when
    /// the `parallel` feature is enabled.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Evaluate the whole grid as a single region on the calling thread.
    pub fn single_region() -> Self {
        Self {
            workers: 1,
            parallel: false,
        }
    }

    /// Keep the region count but run regions on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel && cfg!(feature = "parallel")
    }

    /// Regions `evaluate` would dispatch for `grid`.
    pub fn split<const D: usize>(&self, grid: &Grid<D>) -> Vec<Region<D>> {
        grid.largest_region().split_slowest(self.workers)
    }

    /// Fill the source's whole output grid.
    pub fn evaluate<S, const D: usize>(&self, source: &S) -> Result<SampleBuffer<D>, SourceError>
    where
        S: ImageSource<D> + ?Sized,
    {
        source.validate()?;
        let grid = source.output_info().clone();
        let regions = self.split(&grid);
        let mut buffer = SampleBuffer::new(grid);

        let start = Instant::now();
        {
            let slabs = carve_slabs(&regions, buffer.as_mut_slice());
            run_slabs(source, slabs, self.is_parallel())?;
        }
        debug!(
            "RegionEvaluator::evaluate size={:?} regions={} parallel={} elapsed_ms={:.3}",
            buffer.size(),
            regions.len(),
            self.is_parallel(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(buffer)
    }

    /// Fill the output grid from an explicit partition.
    ///
    /// Every region must lie inside the grid; together they must cover every
    /// index exactly once.
    pub fn evaluate_regions<S, const D: usize>(
        &self,
        source: &S,
        regions: &[Region<D>],
    ) -> Result<SampleBuffer<D>, SourceError>
    where
        S: ImageSource<D> + ?Sized,
    {
        source.validate()?;
        let grid = source.output_info().clone();
        check_partition(&grid, regions)?;

        let start = Instant::now();
        let computed = compute_regions(source, regions, self.is_parallel())?;

        let mut buffer = SampleBuffer::new(grid);
        for (region, values) in regions.iter().zip(&computed) {
            buffer.write_region(region, values)?;
        }
        debug!(
            "RegionEvaluator::evaluate_regions size={:?} regions={} elapsed_ms={:.3}",
            buffer.size(),
            regions.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(buffer)
    }
}

/// Pair each slab with its run of `data`. Slabs come from `split_slowest` on
/// the largest region, so they are consecutive in memory and in order.
fn carve_slabs<'a, const D: usize>(
    regions: &[Region<D>],
    mut data: &'a mut [f32],
) -> Vec<(Region<D>, &'a mut [f32])> {
    let mut slabs = Vec::with_capacity(regions.len());
    for region in regions {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(region.len());
        slabs.push((*region, head));
        data = tail;
    }
    debug_assert!(data.is_empty(), "slabs must cover the buffer");
    slabs
}

#[cfg(feature = "parallel")]
fn run_slabs<S, const D: usize>(
    source: &S,
    slabs: Vec<(Region<D>, &mut [f32])>,
    parallel: bool,
) -> Result<(), SourceError>
where
    S: ImageSource<D> + ?Sized,
{
    if parallel && slabs.len() > 1 {
        slabs
            .into_par_iter()
            .try_for_each(|(region, out)| source.compute_region(&region, out))
    } else {
        slabs
            .into_iter()
            .try_for_each(|(region, out)| source.compute_region(&region, out))
    }
}

#[cfg(not(feature = "parallel"))]
fn run_slabs<S, const D: usize>(
    source: &S,
    slabs: Vec<(Region<D>, &mut [f32])>,
    _parallel: bool,
) -> Result<(), SourceError>
where
    S: ImageSource<D> + ?Sized,
{
    slabs
        .into_iter()
        .try_for_each(|(region, out)| source.compute_region(&region, out))
}

fn compute_one<S, const D: usize>(source: &S, region: &Region<D>) -> Result<Vec<f32>, SourceError>
where
    S: ImageSource<D> + ?Sized,
{
    let mut values = vec![0.0f32; region.len()];
    source.compute_region(region, &mut values)?;
    Ok(values)
}

#[cfg(feature = "parallel")]
fn compute_regions<S, const D: usize>(
    source: &S,
    regions: &[Region<D>],
    parallel: bool,
) -> Result<Vec<Vec<f32>>, SourceError>
where
    S: ImageSource<D> + ?Sized,
{
    if parallel && regions.len() > 1 {
        regions.par_iter().map(|r| compute_one(source, r)).collect()
    } else {
        regions.iter().map(|r| compute_one(source, r)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn compute_regions<S, const D: usize>(
    source: &S,
    regions: &[Region<D>],
    _parallel: bool,
) -> Result<Vec<Vec<f32>>, SourceError>
where
    S: ImageSource<D> + ?Sized,
{
    regions.iter().map(|r| compute_one(source, r)).collect()
}

fn check_partition<const D: usize>(grid: &Grid<D>, regions: &[Region<D>]) -> Result<(), SourceError> {
    let mut covered = vec![false; grid.len()];
    for region in regions {
        if !region.is_inside(grid) {
            return Err(SourceError::invalid_region(
                region,
                format!("outside grid of size {:?}", grid.size()),
            ));
        }
        for index in region.indices() {
            let slot = &mut covered[grid.linear_index(&index)];
            if *slot {
                return Err(SourceError::invalid_region(
                    region,
                    format!("overlaps another region at {index:?}"),
                ));
            }
            *slot = true;
        }
    }
    if let Some(missing) = covered.iter().position(|&c| !c) {
        return Err(SourceError::invalid_region(
            regions,
            format!("partition leaves linear index {missing} uncovered"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ButterworthSource, SinusoidSource};

    fn tiles<const D: usize>(grid: &Grid<D>, tile: usize) -> Vec<Region<D>> {
        // Recursively cut every axis into `tile`-sized pieces.
        let mut regions = vec![grid.largest_region()];
        for axis in 0..D {
            let mut next = Vec::new();
            for region in regions {
                let mut start = region.index[axis];
                let end = start + region.size[axis];
                while start < end {
                    let mut piece = region;
                    piece.index[axis] = start;
                    piece.size[axis] = tile.min(end - start);
                    next.push(piece);
                    start += tile;
                }
            }
            regions = next;
        }
        regions
    }

    #[test]
    fn slab_count_follows_workers_and_slowest_extent() {
        let grid = Grid::<3>::new([8, 8, 3]).unwrap();
        assert_eq!(RegionEvaluator::new(2).split(&grid).len(), 2);
        assert_eq!(RegionEvaluator::new(16).split(&grid).len(), 3);
        assert_eq!(RegionEvaluator::single_region().split(&grid).len(), 1);
    }

    #[test]
    fn decomposition_does_not_change_butterworth_output() {
        let mut source = ButterworthSource::<3>::new();
        source.grid_mut().set_size([17, 12, 9]).unwrap();
        source.set_cutoff(0.3).unwrap();
        source.set_order(2.5).unwrap();

        let reference = RegionEvaluator::single_region().evaluate(&source).unwrap();
        for workers in [2, 3, 4, 9, 64] {
            let out = RegionEvaluator::new(workers).evaluate(&source).unwrap();
            assert_eq!(out, reference, "workers={workers}");
        }
        let tiled = RegionEvaluator::new(4)
            .evaluate_regions(&source, &tiles(source.grid(), 5))
            .unwrap();
        assert_eq!(tiled, reference);
    }

    #[test]
    fn decomposition_does_not_change_sinusoid_output() {
        let mut source = SinusoidSource::<2>::new();
        source.grid_mut().set_size([31, 23]).unwrap();
        source.grid_mut().set_spacing([0.7, 1.3]).unwrap();
        source.set_parameters(&[0.05, -0.11, 0.4]).unwrap();

        let reference = RegionEvaluator::single_region().evaluate(&source).unwrap();
        for tile in [1, 4, 7, 40] {
            let regions = tiles(source.grid(), tile);
            let out = RegionEvaluator::default()
                .evaluate_regions(&source, &regions)
                .unwrap();
            assert_eq!(out, reference, "tile={tile}");
            let out = RegionEvaluator::single_region()
                .evaluate_regions(&source, &regions)
                .unwrap();
            assert_eq!(out, reference, "sequential tile={tile}");
        }
        let seq = RegionEvaluator::new(5).sequential().evaluate(&source).unwrap();
        assert_eq!(seq, reference);
    }

    #[test]
    fn bad_partitions_are_invalid_regions() {
        let mut source = ButterworthSource::<2>::new();
        source.grid_mut().set_size([4, 4]).unwrap();
        let eval = RegionEvaluator::single_region();

        let outside = [Region::new([0, 0], [4, 5])];
        let overlapping = [Region::new([0, 0], [4, 3]), Region::new([0, 2], [4, 2])];
        let gap = [Region::new([0, 0], [4, 3])];
        for regions in [&outside[..], &overlapping[..], &gap[..]] {
            assert!(matches!(
                eval.evaluate_regions(&source, regions),
                Err(SourceError::InvalidRegion { .. })
            ));
        }
    }

    #[test]
    fn one_dimensional_grid_splits_along_its_only_axis() {
        let mut source = SinusoidSource::<1>::new();
        source.grid_mut().set_size([10]).unwrap();
        let regions = RegionEvaluator::new(3).split(source.grid());
        assert_eq!(
            regions.iter().map(|r| (r.index[0], r.size[0])).collect::<Vec<_>>(),
            vec![(0, 4), (4, 3), (7, 3)]
        );
        let a = RegionEvaluator::new(3).evaluate(&source).unwrap();
        let b = RegionEvaluator::single_region().evaluate(&source).unwrap();
        assert_eq!(a, b);
    }
}
