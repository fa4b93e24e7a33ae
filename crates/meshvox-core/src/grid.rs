//! Voxel Grid
//!
//! Fixed-size boolean occupancy lattice with bounds-checked linear indexing.
//! Cells only ever go from unoccupied to occupied.
//!
//! Voxel `(x, y, z)` is centered on `(x / W, y / H, z / D)` and extends
//! `0.5 / dimension` to either side on each axis, so voxel 0 straddles the
//! origin of the unit cube.

use std::ops::Range;

use crate::error::{VoxelError, VoxelResult};
use crate::math::{Aabb, Axis, DVec3};

/// Dimensions of a voxel lattice and the geometry derived from them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lattice {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Lattice {
    /// Create lattice dimensions; every axis needs at least one voxel and
    /// the voxel count must fit in an allocation
    pub fn new(width: usize, height: usize, depth: usize) -> VoxelResult<Self> {
        let count = width
            .checked_mul(height)
            .and_then(|slice| slice.checked_mul(depth))
            .filter(|&count| count > 0 && count <= isize::MAX as usize);
        if count.is_none() {
            return Err(VoxelError::InvalidGridDimensions { width, height, depth });
        }
        Ok(Self { width, height, depth })
    }

    /// Total number of voxels
    pub fn voxel_count(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Number of voxels in one z-slice
    pub fn slice_len(&self) -> usize {
        self.width * self.height
    }

    /// Dimensions as `[W, H, D]`
    pub fn dimensions(&self) -> [usize; 3] {
        [self.width, self.height, self.depth]
    }

    fn size(&self) -> DVec3 {
        DVec3::new(self.width as f64, self.height as f64, self.depth as f64)
    }

    /// `x + y * W + z * W * H`, or `IndexOutOfRange`
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> VoxelResult<usize> {
        if x >= self.width || y >= self.height || z >= self.depth {
            return Err(VoxelError::IndexOutOfRange {
                x,
                y,
                z,
                width: self.width,
                height: self.height,
                depth: self.depth,
            });
        }
        Ok(x + y * self.width + z * self.slice_len())
    }

    /// Inverse of [`Lattice::linear_index`] for an in-range index
    pub fn coordinates(&self, index: usize) -> [usize; 3] {
        let slice = self.slice_len();
        [index % self.width, (index % slice) / self.width, index / slice]
    }

    /// World-space center of a voxel in unit-cube coordinates
    pub fn voxel_center(&self, x: usize, y: usize, z: usize) -> DVec3 {
        DVec3::new(x as f64, y as f64, z as f64) / self.size()
    }

    /// Half the voxel size on each axis
    pub fn voxel_half_size(&self) -> DVec3 {
        DVec3::splat(0.5) / self.size()
    }

    /// Closed bounds of a voxel
    pub fn voxel_bounds(&self, x: usize, y: usize, z: usize) -> Aabb {
        Aabb::from_center_half_extents(self.voxel_center(x, y, z), self.voxel_half_size())
    }

    /// Voxel indices along `axis` whose bounds may overlap `[min, max]`.
    ///
    /// The range is padded by one voxel on each side, so it is a superset of
    /// the exactly overlapping voxels; callers still run the exact bounds test.
    pub fn candidate_range(&self, axis: Axis, min: f64, max: f64) -> Range<usize> {
        let n = self.dimensions()[axis.index()];
        let scale = n as f64;

        let first = (min * scale - 0.5).floor() - 1.0;
        let last = (max * scale + 0.5).ceil() + 1.0;

        if last < 0.0 || first > (n - 1) as f64 {
            return 0..0;
        }

        let first = first.max(0.0) as usize;
        let last = last.min((n - 1) as f64) as usize;
        first..last + 1
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self {
            width: VoxelGrid::DEFAULT_SIZE,
            height: VoxelGrid::DEFAULT_SIZE,
            depth: VoxelGrid::DEFAULT_SIZE,
        }
    }
}

/// Boolean occupancy grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    lattice: Lattice,
    cells: Vec<bool>,
}

impl VoxelGrid {
    /// Default voxel count along each axis
    pub const DEFAULT_SIZE: usize = 128;

    /// Allocate an all-unoccupied grid
    pub fn new(width: usize, height: usize, depth: usize) -> VoxelResult<Self> {
        Ok(Self::with_lattice(Lattice::new(width, height, depth)?))
    }

    /// Allocate an all-unoccupied grid for validated dimensions
    pub fn with_lattice(lattice: Lattice) -> Self {
        Self {
            lattice,
            cells: vec![false; lattice.voxel_count()],
        }
    }

    pub fn lattice(&self) -> Lattice {
        self.lattice
    }

    pub fn width(&self) -> usize {
        self.lattice.width
    }

    pub fn height(&self) -> usize {
        self.lattice.height
    }

    pub fn depth(&self) -> usize {
        self.lattice.depth
    }

    /// Total number of voxels
    pub fn voxel_count(&self) -> usize {
        self.cells.len()
    }

    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> VoxelResult<usize> {
        self.lattice.linear_index(x, y, z)
    }

    /// Mark a voxel occupied; marking it again is a no-op
    pub fn mark_occupied(&mut self, x: usize, y: usize, z: usize) -> VoxelResult<()> {
        let index = self.lattice.linear_index(x, y, z)?;
        self.cells[index] = true;
        Ok(())
    }

    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> VoxelResult<bool> {
        Ok(self.cells[self.lattice.linear_index(x, y, z)?])
    }

    /// Number of occupied voxels
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Coordinates of occupied voxels, x fastest, then y, then z
    pub fn iter_occupied(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell)
            .map(|(index, _)| self.lattice.coordinates(index))
    }

    /// Flat occupancy buffer in linear-index order
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    pub fn voxel_bounds(&self, x: usize, y: usize, z: usize) -> Aabb {
        self.lattice.voxel_bounds(x, y, z)
    }

    /// Flat occupancy buffer for writers that split it into disjoint z-slices
    pub(crate) fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    /// Set every cell whose flag in `occupied` is true
    pub(crate) fn merge_occupied(&mut self, occupied: impl IntoIterator<Item = bool>) {
        for (cell, hit) in self.cells.iter_mut().zip(occupied) {
            *cell |= hit;
        }
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::with_lattice(Lattice::default())
    }
}
