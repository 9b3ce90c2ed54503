//! Regular N-dimensional sampling grid with physical calibration.
//!
//! A grid maps an integer index tuple to a physical point through
//!
//! ```text
//! p = origin + direction · (index ∘ spacing)
//! ```
//!
//! where `∘` is the per-axis product. Axis 0 varies fastest in every linear
//! layout used by the crate (x, then y, then z).
//!
//! Setters validate their input and report whether the stored value actually
//! changed, so callers can treat re-assigning the same geometry as a no-op.
use crate::error::{ensure_finite, ensure_positive, SourceError};
use nalgebra::SMatrix;

/// Samples per axis of a default grid.
pub const DEFAULT_SIZE: usize = 64;

/// Square orientation matrix of a `D`-dimensional grid.
pub type Direction<const D: usize> = SMatrix<f64, D, D>;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid<const D: usize> {
    size: [usize; D],
    spacing: [f64; D],
    origin: [f64; D],
    direction: Direction<D>,
}

impl<const D: usize> Default for Grid<D> {
    fn default() -> Self {
        Self {
            size: [DEFAULT_SIZE; D],
            spacing: [1.0; D],
            origin: [0.0; D],
            direction: Direction::<D>::identity(),
        }
    }
}

impl<const D: usize> Grid<D> {
    /// Grid of the given size with unit spacing, zero origin and identity
    /// direction.
    pub fn new(size: [usize; D]) -> Result<Self, SourceError> {
        let mut grid = Self::default();
        grid.set_size(size)?;
        Ok(grid)
    }

    pub fn with_spacing(mut self, spacing: [f64; D]) -> Result<Self, SourceError> {
        self.set_spacing(spacing)?;
        Ok(self)
    }

    pub fn with_origin(mut self, origin: [f64; D]) -> Result<Self, SourceError> {
        self.set_origin(origin)?;
        Ok(self)
    }

    pub fn with_direction(mut self, direction: Direction<D>) -> Result<Self, SourceError> {
        self.set_direction(direction)?;
        Ok(self)
    }

    #[inline]
    pub fn size(&self) -> [usize; D] {
        self.size
    }

    #[inline]
    pub fn spacing(&self) -> [f64; D] {
        self.spacing
    }

    #[inline]
    pub fn origin(&self) -> [f64; D] {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Returns `Ok(true)` when the size changed.
    pub fn set_size(&mut self, size: [usize; D]) -> Result<bool, SourceError> {
        if let Some(axis) = size.iter().position(|&s| s == 0) {
            return Err(SourceError::invalid_parameter(
                "size",
                format!("axis {axis} has zero samples"),
            ));
        }
        Ok(replace_if_changed(&mut self.size, size))
    }

    /// Returns `Ok(true)` when the spacing changed.
    pub fn set_spacing(&mut self, spacing: [f64; D]) -> Result<bool, SourceError> {
        for &s in &spacing {
            ensure_positive("spacing", s)?;
        }
        Ok(replace_if_changed(&mut self.spacing, spacing))
    }

    /// Returns `Ok(true)` when the origin changed.
    pub fn set_origin(&mut self, origin: [f64; D]) -> Result<bool, SourceError> {
        for &o in &origin {
            ensure_finite("origin", o)?;
        }
        Ok(replace_if_changed(&mut self.origin, origin))
    }

    /// Returns `Ok(true)` when the direction changed. Singular or non-finite
    /// matrices are rejected.
    pub fn set_direction(&mut self, direction: Direction<D>) -> Result<bool, SourceError> {
        if direction.iter().any(|v| !v.is_finite()) {
            return Err(SourceError::invalid_parameter(
                "direction",
                "matrix contains non-finite entries",
            ));
        }
        invert_direction(&direction)?;
        Ok(replace_if_changed(&mut self.direction, direction))
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.size.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Region spanning `0..size` on every axis.
    pub fn largest_region(&self) -> Region<D> {
        Region::new([0; D], self.size)
    }

    pub fn contains_index(&self, index: &[usize; D]) -> bool {
        index.iter().zip(&self.size).all(|(&i, &s)| i < s)
    }

    /// Offset of `index` in a dense buffer laid out with axis 0 fastest.
    #[inline]
    pub fn linear_index(&self, index: &[usize; D]) -> usize {
        let mut offset = 0;
        let mut stride = 1;
        for axis in 0..D {
            offset += index[axis] * stride;
            stride *= self.size[axis];
        }
        offset
    }

    /// Physical location of a sample. Indices outside `[0, size)` are mapped
    /// like any other, the result is just not on the grid.
    pub fn index_to_physical(&self, index: [usize; D]) -> [f64; D] {
        let mut scaled = [0.0; D];
        for axis in 0..D {
            scaled[axis] = index[axis] as f64 * self.spacing[axis];
        }
        let mut point = self.origin;
        for (row, p) in point.iter_mut().enumerate() {
            for (col, s) in scaled.iter().enumerate() {
                *p += self.direction[(row, col)] * s;
            }
        }
        point
    }

    /// Inverse of [`index_to_physical`](Self::index_to_physical) for arbitrary
    /// points, returning the continuous index.
    pub fn physical_to_continuous_index(&self, point: [f64; D]) -> Result<[f64; D], SourceError> {
        let inverse = invert_direction(&self.direction)?;
        let mut offset = [0.0; D];
        for axis in 0..D {
            offset[axis] = point[axis] - self.origin[axis];
        }
        let mut index = [0.0; D];
        for (row, idx) in index.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (col, o) in offset.iter().enumerate() {
                acc += inverse[(row, col)] * o;
            }
            *idx = acc / self.spacing[row];
        }
        Ok(index)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn invert_direction<const D: usize>(direction: &Direction<D>) -> Result<Direction<D>, SourceError> {
    direction
        .try_inverse()
        .filter(|inv| inv.iter().all(|v| v.is_finite()))
        .ok_or_else(|| SourceError::invalid_parameter("direction", "matrix is not invertible"))
}

/// Contiguous rectangular range of grid indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region<const D: usize> {
    /// First index on every axis.
    pub index: [usize; D],
    /// Extent on every axis.
    pub size: [usize; D],
}

impl<const D: usize> Region<D> {
    pub fn new(index: [usize; D], size: [usize; D]) -> Self {
        Self { index, size }
    }

    pub fn len(&self) -> usize {
        self.size.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every index of the region lies in `[0, grid.size)`.
    pub fn is_inside(&self, grid: &Grid<D>) -> bool {
        let bounds = grid.size();
        (0..D).all(|axis| {
            self.index[axis]
                .checked_add(self.size[axis])
                .is_some_and(|end| end <= bounds[axis])
        })
    }

    pub fn contains(&self, index: &[usize; D]) -> bool {
        (0..D).all(|axis| {
            index[axis] >= self.index[axis] && index[axis] - self.index[axis] < self.size[axis]
        })
    }

    /// Indices of the region, axis 0 varying fastest.
    pub fn indices(&self) -> RegionIndices<D> {
        RegionIndices {
            region: *self,
            current: self.index,
            remaining: self.len(),
        }
    }

    /// Split into at most `pieces` slabs along the outermost axis that has
    /// more than one sample. Slab extents differ by at most one, larger slabs
    /// first. A region with nothing to split is returned unchanged.
    pub fn split_slowest(&self, pieces: usize) -> Vec<Region<D>> {
        let Some(axis) = (0..D).rev().find(|&axis| self.size[axis] > 1) else {
            return vec![*self];
        };
        let extent = self.size[axis];
        let count = pieces.clamp(1, extent);
        let base = extent / count;
        let extra = extent % count;

        let mut out = Vec::with_capacity(count);
        let mut start = self.index[axis];
        for k in 0..count {
            let len = base + usize::from(k < extra);
            let mut slab = *self;
            slab.index[axis] = start;
            slab.size[axis] = len;
            out.push(slab);
            start += len;
        }
        out
    }
}

/// Iterator over the indices of a [`Region`].
#[derive(Clone, Debug)]
pub struct RegionIndices<const D: usize> {
    region: Region<D>,
    current: [usize; D],
    remaining: usize,
}

impl<const D: usize> Iterator for RegionIndices<D> {
    type Item = [usize; D];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let out = self.current;
        self.remaining -= 1;
        if self.remaining > 0 {
            for axis in 0..D {
                self.current[axis] += 1;
                if self.current[axis] < self.region.index[axis] + self.region.size[axis] {
                    break;
                }
                self.current[axis] = self.region.index[axis];
            }
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const D: usize> ExactSizeIterator for RegionIndices<D> {}
