//! Geometry Primitives
//!
//! Exact intersection predicates used by the voxelizer:
//! - Segment vs. axis-aligned quad
//! - Segment vs. axis-aligned box (six quad faces)
//! - Triangle vs. axis-aligned box (three segment tests)
//!
//! All predicates treat bounds as closed: touching a corner, an edge or a face
//! counts as an intersection.
//!
//! The triangle test only looks at the triangle's edges. A triangle whose
//! interior passes through a box without any edge touching it is reported as
//! not intersecting.

use crate::error::{VoxelError, VoxelResult};
use crate::math::{lerp, Aabb, DVec3, Quad};

/// A triangle in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: DVec3,
    pub v1: DVec3,
    pub v2: DVec3,
}

impl Triangle {
    /// Create a triangle from its three vertices
    pub fn new(v0: DVec3, v1: DVec3, v2: DVec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Axis-aligned bounds of the three vertices
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.v0.min(self.v1.min(self.v2)),
            self.v0.max(self.v1.max(self.v2)),
        )
    }

    /// Edges in winding order: v0-v1, v1-v2, v2-v0
    pub fn edges(&self) -> [(DVec3, DVec3); 3] {
        [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)]
    }

    /// Edge-only intersection test against a box
    pub fn intersects_box(&self, cube: &Aabb) -> bool {
        self.edges()
            .into_iter()
            .any(|(p1, p2)| segment_intersects_box(p1, p2, cube))
    }
}

/// Segment vs. quad from raw corner bounds.
///
/// Fails with [`VoxelError::InvalidQuad`] unless exactly one axis of the
/// bounds is flat.
pub fn intersect_line_quad(
    p1: DVec3,
    p2: DVec3,
    quad_min: DVec3,
    quad_max: DVec3,
) -> VoxelResult<bool> {
    let quad = Quad::from_bounds(quad_min, quad_max).ok_or(VoxelError::InvalidQuad {
        min: quad_min,
        max: quad_max,
    })?;

    Ok(segment_intersects_quad(p1, p2, &quad))
}

/// Segment vs. quad
pub fn segment_intersects_quad(p1: DVec3, p2: DVec3, quad: &Quad) -> bool {
    let axis = quad.axis.index();
    let constant = quad.plane_constant();

    // A segment parallel to the plane yields an infinite or NaN t
    let t = (constant - p1[axis]) / (p2[axis] - p1[axis]);
    if !(0.0..=1.0).contains(&t) {
        return false;
    }

    let mut hit = lerp(p1, p2, t);
    // The hit lies on the plane by construction; don't let rounding move it off
    hit[axis] = constant;

    quad.contains_point(hit)
}

/// Segment vs. box from raw corner bounds
pub fn intersect_line_cube(p1: DVec3, p2: DVec3, cube_min: DVec3, cube_max: DVec3) -> bool {
    segment_intersects_box(p1, p2, &Aabb::new(cube_min, cube_max))
}

/// Segment vs. box.
///
/// An endpoint inside or on the box is an intersection. Otherwise the segment
/// must cross one of the six faces.
pub fn segment_intersects_box(p1: DVec3, p2: DVec3, cube: &Aabb) -> bool {
    if cube.contains_point(p1) || cube.contains_point(p2) {
        return true;
    }

    cube.faces()
        .iter()
        .any(|face| segment_intersects_quad(p1, p2, face))
}

/// Triangle vs. box from raw corner bounds
pub fn intersect_triangle_cube(
    v0: DVec3,
    v1: DVec3,
    v2: DVec3,
    cube_min: DVec3,
    cube_max: DVec3,
) -> bool {
    Triangle::new(v0, v1, v2).intersects_box(&Aabb::new(cube_min, cube_max))
}
