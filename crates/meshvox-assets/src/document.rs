//! Mesh Documents
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "vertices": [{ "position": [0.0, 1.0, 2.0] }, ...],
//!   "meshes": [{ "indices": [0, 1, 2, ...] }, ...]
//! }
//! ```
//!
//! All meshes index into the shared vertex list. Unknown fields are ignored.

use std::path::Path;

use glam::DVec3;
use meshvox_core::Mesh;
use serde::{Deserialize, Serialize};

use crate::{AssetError, AssetResult};

/// One entry of the shared vertex list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexEntry {
    pub position: DVec3,
}

/// One index list, grouped in triangles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshEntry {
    #[serde(default)]
    pub indices: Vec<u32>,
}

/// Parsed mesh document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    #[serde(default)]
    pub vertices: Vec<VertexEntry>,
    #[serde(default)]
    pub meshes: Vec<MeshEntry>,
}

impl MeshDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(source: &str) -> AssetResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a document from disk
    pub fn load(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let document = Self::from_json_str(&source)?;

        log::info!(
            "Loaded {}: {} vertices, {} meshes",
            path.display(),
            document.vertices.len(),
            document.meshes.len()
        );

        Ok(document)
    }

    /// Vertex positions in document order
    pub fn positions(&self) -> Vec<DVec3> {
        self.vertices.iter().map(|vertex| vertex.position).collect()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Build the mesh at `index` over the shared vertex list
    pub fn to_mesh(&self, index: usize) -> AssetResult<Mesh> {
        let entry = self.meshes.get(index).ok_or(AssetError::MeshNotFound {
            index,
            available: self.meshes.len(),
        })?;

        Ok(Mesh::new(self.positions(), entry.indices.clone())?)
    }

    /// Build one mesh from every index list in the document
    pub fn to_merged_mesh(&self) -> AssetResult<Mesh> {
        let indices = self
            .meshes
            .iter()
            .flat_map(|entry| entry.indices.iter().copied())
            .collect();

        Ok(Mesh::new(self.positions(), indices)?)
    }
}
