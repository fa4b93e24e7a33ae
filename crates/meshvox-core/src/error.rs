//! Error taxonomy for voxelization

use glam::DVec3;
use thiserror::Error;

/// Voxelization errors
///
/// Every variant is fatal: voxelization is deterministic, so a failing input
/// fails the same way on every run and no partially filled grid is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoxelError {
    /// The mesh cannot be voxelized (empty, zero extent, bad indices, ...)
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A quad was built from bounds that are not flat on exactly one axis
    #[error("Invalid quad: bounds {min} .. {max} must be flat on exactly one axis")]
    InvalidQuad { min: DVec3, max: DVec3 },

    /// Grid access outside the lattice
    #[error("Voxel ({x}, {y}, {z}) is out of range for a {width}x{height}x{depth} grid")]
    IndexOutOfRange {
        x: usize,
        y: usize,
        z: usize,
        width: usize,
        height: usize,
        depth: usize,
    },

    /// A grid dimension is zero or the voxel count does not fit in memory
    #[error("Invalid grid dimensions {width}x{height}x{depth}: need at least one voxel per axis and an addressable voxel count")]
    InvalidGridDimensions {
        width: usize,
        height: usize,
        depth: usize,
    },
}

/// Result type for voxelization operations
pub type VoxelResult<T> = Result<T, VoxelError>;
