//! Math utilities
//!
//! Double-precision re-exports from glam and the bounding volumes used by the
//! voxelizer.

pub use glam::DVec3;

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in X, Y, Z order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl Aabb {
    /// Create an empty AABB
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Create an AABB from min and max corners
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from center and half-extents
    pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest AABB enclosing all points; `EMPTY` for no points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Self {
        let mut result = Self::EMPTY;
        for point in points {
            result.expand_to_include(*point);
        }
        result
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Largest extent across the three axes
    pub fn max_extent(&self) -> f64 {
        self.size().max_element()
    }

    /// Check if the AABB is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Check if a point is inside the AABB (bounds inclusive)
    pub fn contains_point(&self, point: DVec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another (touching counts)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Expand the AABB to include a point
    pub fn expand_to_include(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// The six boundary faces as flat quads: -X, +X, -Y, +Y, -Z, +Z
    pub fn faces(&self) -> [Quad; 6] {
        let (lo, hi) = (self.min, self.max);
        [
            Quad::on_plane(Axis::X, lo, DVec3::new(lo.x, hi.y, hi.z)),
            Quad::on_plane(Axis::X, DVec3::new(hi.x, lo.y, lo.z), hi),
            Quad::on_plane(Axis::Y, lo, DVec3::new(hi.x, lo.y, hi.z)),
            Quad::on_plane(Axis::Y, DVec3::new(lo.x, hi.y, lo.z), hi),
            Quad::on_plane(Axis::Z, lo, DVec3::new(hi.x, hi.y, lo.z)),
            Quad::on_plane(Axis::Z, DVec3::new(lo.x, lo.y, hi.z), hi),
        ]
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Axis-aligned rectangle: a box with zero extent on its plane axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
    /// Axis normal to the quad's supporting plane
    pub axis: Axis,
}

impl Quad {
    /// Build a quad from corner bounds, finding the flat axis.
    ///
    /// Returns `None` unless exactly one axis has `min == max`.
    pub fn from_bounds(min: DVec3, max: DVec3) -> Option<Self> {
        let mut flat = Axis::ALL
            .into_iter()
            .filter(|axis| min[axis.index()] == max[axis.index()]);

        match (flat.next(), flat.next()) {
            (Some(axis), None) => Some(Self { min, max, axis }),
            _ => None,
        }
    }

    fn on_plane(axis: Axis, min: DVec3, max: DVec3) -> Self {
        debug_assert_eq!(min[axis.index()], max[axis.index()]);
        Self { min, max, axis }
    }

    /// Coordinate of the supporting plane along `axis`
    pub fn plane_constant(&self) -> f64 {
        self.min[self.axis.index()]
    }

    /// Inclusive bounds test for a point assumed to lie on the plane
    pub fn contains_point(&self, point: DVec3) -> bool {
        Aabb::new(self.min, self.max).contains_point(point)
    }
}

/// Linear interpolation between two points
pub fn lerp(a: DVec3, b: DVec3, t: f64) -> DVec3 {
    a + (b - a) * t
}
