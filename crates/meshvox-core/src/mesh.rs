//! Triangle Mesh and Normalization
//!
//! A [`Mesh`] owns a flat vertex buffer and an index buffer grouped in
//! triples. Normalizing it rescales every vertex into the unit cube while
//! preserving aspect ratio, producing a [`NormalizedMesh`], the only mesh type
//! the voxelizer accepts.

use crate::error::{VoxelError, VoxelResult};
use crate::geometry::Triangle;
use crate::math::{Aabb, DVec3};

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<DVec3>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Create a mesh, validating the index buffer against the vertices
    pub fn new(vertices: Vec<DVec3>, indices: Vec<u32>) -> VoxelResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(VoxelError::InvalidMesh(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }

        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= vertices.len())
        {
            return Err(VoxelError::InvalidMesh(format!(
                "index {} at position {} references a missing vertex ({} vertices)",
                index,
                position,
                vertices.len()
            )));
        }

        Ok(Self { vertices, indices })
    }

    /// Vertex buffer
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Index buffer
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounds of every vertex, `Aabb::EMPTY` for an empty mesh
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Triangle `i`, built from indices `3i`, `3i + 1`, `3i + 2`
    pub fn triangle(&self, i: usize) -> Option<Triangle> {
        let start = i.checked_mul(3)?;
        let corners = self.indices.get(start..start.checked_add(3)?)?;
        Some(self.make_triangle(corners))
    }

    /// Iterate over all triangles in index order
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|corners| self.make_triangle(corners))
    }

    fn make_triangle(&self, corners: &[u32]) -> Triangle {
        // Indices were validated in `new`
        Triangle::new(
            self.vertices[corners[0] as usize],
            self.vertices[corners[1] as usize],
            self.vertices[corners[2] as usize],
        )
    }

    /// Rescale the mesh into the unit cube
    pub fn normalize(mut self) -> VoxelResult<NormalizedMesh> {
        let source_bounds = normalize_vertices(&mut self.vertices)?;
        Ok(NormalizedMesh {
            mesh: self,
            source_bounds,
        })
    }
}

/// A mesh whose vertices all lie in `[0, 1]^3`
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMesh {
    mesh: Mesh,
    source_bounds: Aabb,
}

impl NormalizedMesh {
    /// Wrap a mesh that is already expressed in unit-cube coordinates.
    ///
    /// Every coordinate must be finite and inside `[0, 1]`.
    pub fn from_unit_cube(mesh: Mesh) -> VoxelResult<Self> {
        let unit = Aabb::new(DVec3::ZERO, DVec3::ONE);
        if let Some(vertex) = mesh.vertices.iter().find(|v| !unit.contains_point(**v)) {
            return Err(VoxelError::InvalidMesh(format!(
                "vertex {} lies outside the unit cube",
                vertex
            )));
        }

        let source_bounds = mesh.bounds();
        Ok(Self {
            mesh,
            source_bounds,
        })
    }

    /// The normalized mesh
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Bounds of the vertices before normalization
    pub fn source_bounds(&self) -> Aabb {
        self.source_bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.mesh.triangles()
    }

    /// Take back the underlying mesh
    pub fn into_inner(self) -> Mesh {
        self.mesh
    }
}

/// Normalize a vertex buffer into the unit cube in place.
///
/// Each coordinate `c` on axis `a` becomes `(c - min_a) / range`, where
/// `range` is the largest extent across the three axes, so the widest axis
/// spans exactly `[0, 1]` and proportions are preserved. Returns the bounds the
/// vertices had before normalization.
pub fn normalize_vertices(vertices: &mut [DVec3]) -> VoxelResult<Aabb> {
    if vertices.is_empty() {
        return Err(VoxelError::InvalidMesh("mesh has no vertices".into()));
    }

    if let Some(vertex) = vertices.iter().find(|v| !v.is_finite()) {
        return Err(VoxelError::InvalidMesh(format!(
            "vertex {} has a non-finite coordinate",
            vertex
        )));
    }

    let bounds = Aabb::from_points(vertices.iter());
    let range = bounds.max_extent();

    if !(range > 0.0 && range.is_finite()) {
        return Err(VoxelError::InvalidMesh(format!(
            "bounding box {} .. {} has no usable extent",
            bounds.min, bounds.max
        )));
    }

    for vertex in vertices.iter_mut() {
        *vertex = (*vertex - bounds.min) / range;
    }

    log::debug!(
        "Normalized {} vertices from {} .. {} (range {})",
        vertices.len(),
        bounds.min,
        bounds.max,
        range
    );

    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_vertices() -> Vec<DVec3> {
        vec![
            DVec3::new(-2.0, 10.0, 3.0),
            DVec3::new(2.0, 11.0, 3.5),
            DVec3::new(0.0, 10.5, 4.0),
            DVec3::new(1.0, 12.0, 3.25),
        ]
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new(box_vertices(), vec![0, 1, 2, 1, 2, 3]).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().count(), 2);
        assert_eq!(mesh.triangle(1).map(|t| t.v2), Some(DVec3::new(1.0, 12.0, 3.25)));
        assert!(mesh.triangle(2).is_none());
        assert!(mesh.triangle(usize::MAX / 3 + 1).is_none());
        assert!(mesh.triangle(usize::MAX).is_none());
    }

    #[test]
    fn test_mesh_rejects_partial_triangle() {
        let result = Mesh::new(box_vertices(), vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(VoxelError::InvalidMesh(_))));
    }

    #[test]
    fn test_mesh_rejects_missing_vertex() {
        let result = Mesh::new(box_vertices(), vec![0, 1, 4]);
        assert!(matches!(result, Err(VoxelError::InvalidMesh(_))));
    }

    #[test]
    fn test_mesh_without_triangles_is_valid() {
        let mesh = Mesh::new(box_vertices(), Vec::new()).unwrap();
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.normalize().is_ok());
    }

    #[test]
    fn test_normalize_into_unit_cube() {
        let original = box_vertices();
        let mut vertices = original.clone();
        let source = normalize_vertices(&mut vertices).unwrap();

        assert_eq!(source.min, DVec3::new(-2.0, 10.0, 3.0));
        assert_eq!(source.max, DVec3::new(2.0, 12.0, 4.0));

        for v in &vertices {
            assert!(v.min_element() >= 0.0 && v.max_element() <= 1.0);
        }

        let bounds = Aabb::from_points(&vertices);
        // X had the largest extent (4.0) and now spans [0, 1] exactly
        assert_eq!(bounds.min, DVec3::ZERO);
        assert_eq!(bounds.max.x, 1.0);
        assert_eq!(bounds.max.y, 0.5);
        assert_eq!(bounds.max.z, 0.25);
    }

    #[test]
    fn test_normalize_preserves_aspect_ratio() {
        let original = box_vertices();
        let before = Aabb::from_points(&original).size();

        let mut vertices = original;
        normalize_vertices(&mut vertices).unwrap();
        let after = Aabb::from_points(&vertices).size();

        assert!((before.y / before.x - after.y / after.x).abs() < 1e-12);
        assert!((before.z / before.x - after.z / after.x).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_flat_mesh() {
        // Zero extent on Z alone is fine
        let mut vertices = vec![
            DVec3::new(0.0, 0.0, 5.0),
            DVec3::new(3.0, 0.0, 5.0),
            DVec3::new(0.0, 6.0, 5.0),
        ];
        normalize_vertices(&mut vertices).unwrap();
        assert_eq!(vertices[1], DVec3::new(0.5, 0.0, 0.0));
        assert_eq!(vertices[2], DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        let mut vertices: Vec<DVec3> = Vec::new();
        assert!(matches!(
            normalize_vertices(&mut vertices),
            Err(VoxelError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_coincident_vertices() {
        let mut vertices = vec![DVec3::splat(7.0); 3];
        assert!(matches!(
            normalize_vertices(&mut vertices),
            Err(VoxelError::InvalidMesh(_))
        ));
        // Nothing was written
        assert_eq!(vertices, vec![DVec3::splat(7.0); 3]);
    }

    #[test]
    fn test_normalize_rejects_non_finite() {
        let mut vertices = vec![DVec3::ZERO, DVec3::new(1.0, f64::NAN, 0.0)];
        assert!(matches!(
            normalize_vertices(&mut vertices),
            Err(VoxelError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_mesh_normalize_keeps_source_bounds() {
        let mesh = Mesh::new(box_vertices(), vec![0, 1, 2]).unwrap();
        let normalized = mesh.normalize().unwrap();

        assert_eq!(normalized.source_bounds().min, DVec3::new(-2.0, 10.0, 3.0));
        assert_eq!(normalized.triangle_count(), 1);
        assert_eq!(normalized.mesh().vertices()[0], DVec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_from_unit_cube_validates_range() {
        let inside = Mesh::new(vec![DVec3::ZERO, DVec3::ONE, DVec3::splat(0.5)], vec![0, 1, 2]).unwrap();
        assert!(NormalizedMesh::from_unit_cube(inside).is_ok());

        let outside = Mesh::new(vec![DVec3::ZERO, DVec3::splat(1.5), DVec3::ONE], vec![0, 1, 2]).unwrap();
        assert!(matches!(
            NormalizedMesh::from_unit_cube(outside),
            Err(VoxelError::InvalidMesh(_))
        ));
    }
}
