//! # Meshvox Assets
//!
//! Input and output around the voxelization core.
//!
//! ## Features
//! - JSON mesh documents (shared vertex list, one index list per mesh)
//! - Occupancy grid export as placement commands or JSON

pub mod document;
pub mod export;

use meshvox_core::VoxelError;
use thiserror::Error;

pub use document::{MeshDocument, MeshEntry, VertexEntry};
pub use export::{export_grid, export_grid_to_path, ExportFormat, ExportOptions, GridExport};

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Mesh {index} not found (document has {available} meshes)")]
    MeshNotFound { index: usize, available: usize },

    #[error(transparent)]
    Voxel(#[from] VoxelError),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
