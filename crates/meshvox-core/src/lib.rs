//! # Meshvox Core
//!
//! Triangle mesh voxelization for the Meshvox toolchain.
//!
//! This crate turns an indexed triangle mesh into a boolean occupancy grid:
//! - **Math**: double-precision bounding boxes and axis-aligned quads
//! - **Geometry**: segment/quad, segment/box and triangle/box predicates
//! - **Mesh**: index validation and aspect-preserving unit-cube normalization
//! - **Grid**: bounds-checked occupancy lattice
//! - **Voxelizer**: per-triangle and per-voxel traversal, sequential or parallel

pub mod error;
pub mod geometry;
pub mod grid;
pub mod math;
pub mod mesh;
pub mod voxelizer;

use serde::{Deserialize, Serialize};

pub use error::{VoxelError, VoxelResult};
pub use geometry::{intersect_line_cube, intersect_line_quad, intersect_triangle_cube, Triangle};
pub use grid::{Lattice, VoxelGrid};
pub use math::{Aabb, Axis, DVec3, Quad};
pub use mesh::{normalize_vertices, Mesh, NormalizedMesh};
pub use voxelizer::{voxelize, Voxelizer};

/// Traversal order over the triangle/voxel pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// For each triangle, test the voxels inside its bounding box
    PerTriangle,
    /// For each voxel, test triangles until the first hit
    PerVoxel,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::PerTriangle
    }
}

/// How the traversal is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Execution {
    /// Run on the calling thread
    Sequential,
    /// Spread the work over the rayon thread pool
    Parallel,
}

impl Default for Execution {
    fn default() -> Self {
        Self::Sequential
    }
}

/// Voxelization configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelizeConfig {
    /// Voxels along X
    pub grid_width: usize,
    /// Voxels along Y
    pub grid_height: usize,
    /// Voxels along Z
    pub grid_depth: usize,
    /// Traversal strategy
    pub strategy: Strategy,
    /// Sequential or parallel execution
    pub execution: Execution,
}

impl Default for VoxelizeConfig {
    fn default() -> Self {
        Self {
            grid_width: VoxelGrid::DEFAULT_SIZE,
            grid_height: VoxelGrid::DEFAULT_SIZE,
            grid_depth: VoxelGrid::DEFAULT_SIZE,
            strategy: Strategy::PerTriangle,
            execution: Execution::Sequential,
        }
    }
}

impl VoxelizeConfig {
    /// Cubic grid with `size` voxels per axis
    pub fn cubic(size: usize) -> Self {
        Self {
            grid_width: size,
            grid_height: size,
            grid_depth: size,
            ..Self::default()
        }
    }

    /// Builder-style strategy override
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder-style execution override
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Lattice described by the grid dimensions
    pub fn lattice(&self) -> VoxelResult<Lattice> {
        Lattice::new(self.grid_width, self.grid_height, self.grid_depth)
    }

    /// Check the configuration without allocating anything
    pub fn validate(&self) -> VoxelResult<()> {
        self.lattice().map(|_| ())
    }
}
