//! Voxelizer
//!
//! Drives the triangle/box predicate over a normalized mesh and a voxel
//! lattice. Two traversals produce identical grids:
//! - **PerTriangle**: each triangle visits the voxels around its bounding box
//! - **PerVoxel**: each voxel scans the triangles until the first hit
//!
//! Either one runs sequentially or on the rayon pool. Parallel per-voxel work
//! is split into disjoint z-slices; parallel per-triangle work may hit the same
//! voxel from several threads, so it writes through an atomic shadow buffer
//! with an idempotent `store(true)` and merges it into the grid after the join.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::error::VoxelResult;
use crate::geometry::Triangle;
use crate::grid::{Lattice, VoxelGrid};
use crate::math::{Aabb, Axis};
use crate::mesh::NormalizedMesh;
use crate::{Execution, Strategy, VoxelizeConfig};

/// A triangle with its precomputed bounds
#[derive(Debug, Clone, Copy)]
struct Candidate {
    triangle: Triangle,
    bounds: Aabb,
}

impl Candidate {
    fn new(triangle: Triangle) -> Self {
        Self {
            triangle,
            bounds: triangle.aabb(),
        }
    }

    /// Bounding box pruning followed by the exact edge test.
    ///
    /// Both traversals go through here so they agree bit for bit.
    fn covers(&self, voxel: &Aabb) -> bool {
        self.bounds.intersects(voxel) && self.triangle.intersects_box(voxel)
    }
}

/// Voxelizes one normalized mesh with a fixed configuration
pub struct Voxelizer<'a> {
    mesh: &'a NormalizedMesh,
    config: VoxelizeConfig,
    lattice: Lattice,
}

impl<'a> Voxelizer<'a> {
    /// Create a voxelizer, validating the grid dimensions
    pub fn new(mesh: &'a NormalizedMesh, config: VoxelizeConfig) -> VoxelResult<Self> {
        let lattice = config.lattice()?;
        Ok(Self {
            mesh,
            config,
            lattice,
        })
    }

    pub fn config(&self) -> &VoxelizeConfig {
        &self.config
    }

    pub fn lattice(&self) -> Lattice {
        self.lattice
    }

    /// Build the occupancy grid.
    ///
    /// The grid is only returned once every triangle has been processed.
    pub fn voxelize(&self) -> VoxelResult<VoxelGrid> {
        let start = Instant::now();
        let [width, height, depth] = self.lattice.dimensions();

        log::info!(
            "Voxelizing {} triangles into a {}x{}x{} grid ({:?}, {:?})",
            self.mesh.triangle_count(),
            width,
            height,
            depth,
            self.config.strategy,
            self.config.execution
        );

        let candidates: Vec<Candidate> = self.mesh.triangles().map(Candidate::new).collect();
        let mut grid = VoxelGrid::with_lattice(self.lattice);

        match (self.config.strategy, self.config.execution) {
            (Strategy::PerTriangle, Execution::Sequential) => {
                self.per_triangle(&candidates, &mut grid)?
            }
            (Strategy::PerTriangle, Execution::Parallel) => {
                self.per_triangle_parallel(&candidates, &mut grid)?
            }
            (Strategy::PerVoxel, Execution::Sequential) => self.per_voxel(&candidates, &mut grid),
            (Strategy::PerVoxel, Execution::Parallel) => {
                self.per_voxel_parallel(&candidates, &mut grid)
            }
        }

        log::info!(
            "Voxelization complete: {} of {} voxels occupied in {:.2?}",
            grid.occupied_count(),
            grid.voxel_count(),
            start.elapsed()
        );

        Ok(grid)
    }

    fn per_triangle(&self, candidates: &[Candidate], grid: &mut VoxelGrid) -> VoxelResult<()> {
        for candidate in candidates {
            self.for_each_covered_voxel(candidate, |x, y, z| grid.mark_occupied(x, y, z))?;
        }
        Ok(())
    }

    fn per_triangle_parallel(
        &self,
        candidates: &[Candidate],
        grid: &mut VoxelGrid,
    ) -> VoxelResult<()> {
        let lattice = self.lattice;
        let occupied: Vec<AtomicBool> = (0..lattice.voxel_count())
            .map(|_| AtomicBool::new(false))
            .collect();

        candidates.par_iter().try_for_each(|candidate| {
            self.for_each_covered_voxel(candidate, |x, y, z| {
                let index = lattice.linear_index(x, y, z)?;
                occupied[index].store(true, Ordering::Relaxed);
                Ok(())
            })
        })?;

        grid.merge_occupied(occupied.into_iter().map(AtomicBool::into_inner));
        Ok(())
    }

    /// Call `mark` for every voxel the candidate covers
    fn for_each_covered_voxel(
        &self,
        candidate: &Candidate,
        mut mark: impl FnMut(usize, usize, usize) -> VoxelResult<()>,
    ) -> VoxelResult<()> {
        let lattice = self.lattice;
        let Aabb { min, max } = candidate.bounds;

        let xs = lattice.candidate_range(Axis::X, min.x, max.x);
        let ys = lattice.candidate_range(Axis::Y, min.y, max.y);
        let zs = lattice.candidate_range(Axis::Z, min.z, max.z);

        for z in zs {
            for y in ys.clone() {
                for x in xs.clone() {
                    let voxel = lattice.voxel_bounds(x, y, z);
                    if !candidate.covers(&voxel) {
                        continue;
                    }
                    mark(x, y, z)?;
                }
            }
        }

        Ok(())
    }

    fn per_voxel(&self, candidates: &[Candidate], grid: &mut VoxelGrid) {
        let slice_len = self.lattice.slice_len();
        for (z, slice) in grid.cells_mut().chunks_mut(slice_len).enumerate() {
            self.fill_slice(candidates, z, slice);
        }
    }

    fn per_voxel_parallel(&self, candidates: &[Candidate], grid: &mut VoxelGrid) {
        let slice_len = self.lattice.slice_len();
        grid.cells_mut()
            .par_chunks_mut(slice_len)
            .enumerate()
            .for_each(|(z, slice)| self.fill_slice(candidates, z, slice));
    }

    /// Per-voxel scan of one z-slice
    fn fill_slice(&self, candidates: &[Candidate], z: usize, slice: &mut [bool]) {
        let lattice = self.lattice;
        for y in 0..lattice.height {
            log::trace!("Checking y = {}, z = {}", y, z);

            for x in 0..lattice.width {
                let voxel = lattice.voxel_bounds(x, y, z);
                if candidates.iter().any(|candidate| candidate.covers(&voxel)) {
                    slice[x + y * lattice.width] = true;
                }
            }
        }
    }
}

/// Voxelize a normalized mesh in one call
pub fn voxelize(mesh: &NormalizedMesh, config: &VoxelizeConfig) -> VoxelResult<VoxelGrid> {
    Voxelizer::new(mesh, *config)?.voxelize()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;
    use crate::error::VoxelError;
    use crate::math::DVec3;
    use crate::mesh::Mesh;

    const ALL_MODES: [(Strategy, Execution); 4] = [
        (Strategy::PerTriangle, Execution::Sequential),
        (Strategy::PerTriangle, Execution::Parallel),
        (Strategy::PerVoxel, Execution::Sequential),
        (Strategy::PerVoxel, Execution::Parallel),
    ];

    fn unit_mesh(triangles: &[[DVec3; 3]]) -> NormalizedMesh {
        let vertices: Vec<DVec3> = triangles.iter().flatten().copied().collect();
        let indices = (0..vertices.len() as u32).collect();
        NormalizedMesh::from_unit_cube(Mesh::new(vertices, indices).unwrap()).unwrap()
    }

    fn torus(rings: usize, sides: usize) -> Mesh {
        let mut vertices = Vec::with_capacity(rings * sides);
        for i in 0..rings {
            let u = TAU * i as f64 / rings as f64;
            for j in 0..sides {
                let v = TAU * j as f64 / sides as f64;
                let radius = 2.0 + 0.75 * v.cos();
                vertices.push(DVec3::new(radius * u.cos(), radius * u.sin(), 0.75 * v.sin()));
            }
        }

        let mut indices = Vec::with_capacity(rings * sides * 6);
        for i in 0..rings {
            let next_ring = (i + 1) % rings;
            for j in 0..sides {
                let next_side = (j + 1) % sides;
                let a = (i * sides + j) as u32;
                let b = (next_ring * sides + j) as u32;
                let c = (next_ring * sides + next_side) as u32;
                let d = (i * sides + next_side) as u32;
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }

        Mesh::new(vertices, indices).unwrap()
    }

    fn run(mesh: &NormalizedMesh, size: usize, strategy: Strategy, execution: Execution) -> VoxelGrid {
        let config = VoxelizeConfig::cubic(size)
            .with_strategy(strategy)
            .with_execution(execution);
        voxelize(mesh, &config).unwrap()
    }

    fn run_all(mesh: &NormalizedMesh, size: usize) -> VoxelGrid {
        let reference = run(mesh, size, Strategy::PerTriangle, Execution::Sequential);
        for (strategy, execution) in ALL_MODES {
            let grid = run(mesh, size, strategy, execution);
            assert_eq!(grid, reference, "{:?}/{:?} disagrees", strategy, execution);
        }
        reference
    }

    #[test]
    fn test_strategies_are_equivalent() {
        let mesh = torus(12, 8).normalize().unwrap();
        let grid = run_all(&mesh, 24);
        assert!(grid.occupied_count() > 0);
    }

    #[test]
    fn test_voxelize_is_idempotent() {
        let mesh = torus(10, 6).normalize().unwrap();
        let first = run(&mesh, 16, Strategy::PerTriangle, Execution::Parallel);
        let second = run(&mesh, 16, Strategy::PerTriangle, Execution::Parallel);
        assert_eq!(first, second);
    }

    #[test]
    fn test_adding_triangle_is_monotonic() {
        let base = torus(10, 6).normalize().unwrap().into_inner();
        let before = NormalizedMesh::from_unit_cube(base.clone()).unwrap();

        let mut vertices = base.vertices().to_vec();
        let mut indices = base.indices().to_vec();
        let first = vertices.len() as u32;
        vertices.extend_from_slice(&[
            DVec3::new(0.1, 0.1, 0.1),
            DVec3::new(0.9, 0.2, 0.3),
            DVec3::new(0.5, 0.9, 0.2),
        ]);
        indices.extend_from_slice(&[first, first + 1, first + 2]);
        let after = NormalizedMesh::from_unit_cube(Mesh::new(vertices, indices).unwrap()).unwrap();

        let smaller = run_all(&before, 16);
        let larger = run_all(&after, 16);

        assert!(larger.occupied_count() > smaller.occupied_count());
        for [x, y, z] in smaller.iter_occupied() {
            assert_eq!(larger.is_occupied(x, y, z), Ok(true));
        }
    }

    #[test]
    fn test_triangle_inside_single_voxel() {
        // Voxel 3 of 8 spans [0.3125, 0.4375] on each axis
        let mesh = unit_mesh(&[[
            DVec3::new(0.37, 0.37, 0.375),
            DVec3::new(0.38, 0.37, 0.375),
            DVec3::new(0.37, 0.38, 0.38),
        ]]);

        let grid = run_all(&mesh, 8);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.is_occupied(3, 3, 3), Ok(true));
    }

    #[test]
    fn test_vertex_on_voxel_boundary() {
        // x = 0.4375 is the shared face of voxels 3 and 4; both include it
        let mesh = unit_mesh(&[[
            DVec3::new(0.4375, 0.375, 0.375),
            DVec3::new(0.40, 0.37, 0.375),
            DVec3::new(0.41, 0.38, 0.38),
        ]]);

        let first = run_all(&mesh, 8);
        for _ in 0..3 {
            assert_eq!(run_all(&mesh, 8), first);
        }

        let occupied: Vec<_> = first.iter_occupied().collect();
        assert_eq!(occupied, vec![[3, 3, 3], [4, 3, 3]]);
    }

    #[test]
    fn test_degenerate_triangles() {
        let point = DVec3::splat(0.25);
        let single_point = unit_mesh(&[[point, point, point]]);
        let grid = run_all(&single_point, 8);
        assert_eq!(grid.iter_occupied().collect::<Vec<_>>(), vec![[2, 2, 2]]);

        let collinear = unit_mesh(&[[
            DVec3::new(0.2, 0.25, 0.25),
            DVec3::new(0.4, 0.25, 0.25),
            DVec3::new(0.6, 0.25, 0.25),
        ]]);
        let grid = run_all(&collinear, 8);
        let occupied: Vec<_> = grid.iter_occupied().collect();
        assert_eq!(occupied, vec![[2, 2, 2], [3, 2, 2], [4, 2, 2], [5, 2, 2]]);
    }

    #[test]
    fn test_large_triangle_interior_is_not_filled() {
        // Edge-only test: voxels the triangle passes through without an edge
        // touching them stay empty
        let mesh = unit_mesh(&[[
            DVec3::new(0.0, 0.0, 0.5),
            DVec3::new(1.0, 0.0, 0.5),
            DVec3::new(0.0, 1.0, 0.5),
        ]]);

        let grid = run_all(&mesh, 8);
        assert_eq!(grid.is_occupied(0, 0, 4), Ok(true));
        assert_eq!(grid.is_occupied(4, 0, 4), Ok(true));
        assert_eq!(grid.is_occupied(0, 4, 4), Ok(true));
        assert_eq!(grid.is_occupied(2, 2, 4), Ok(false));
        assert_eq!(grid.is_occupied(1, 2, 4), Ok(false));
    }

    #[test]
    fn test_empty_mesh_gives_empty_grid() {
        let mesh = Mesh::new(vec![DVec3::ZERO, DVec3::ONE], Vec::new())
            .unwrap()
            .normalize()
            .unwrap();
        let grid = run_all(&mesh, 4);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_non_cubic_grid() {
        let mesh = torus(8, 6).normalize().unwrap();
        let config = VoxelizeConfig {
            grid_width: 12,
            grid_height: 10,
            grid_depth: 6,
            ..VoxelizeConfig::default()
        };

        let reference = voxelize(&mesh, &config).unwrap();
        assert_eq!(reference.lattice().dimensions(), [12, 10, 6]);
        for (strategy, execution) in ALL_MODES {
            let config = config.with_strategy(strategy).with_execution(execution);
            assert_eq!(voxelize(&mesh, &config).unwrap(), reference);
        }
    }

    #[test]
    fn test_invalid_grid_config() {
        let mesh = torus(4, 4).normalize().unwrap();
        let config = VoxelizeConfig {
            grid_width: 0,
            ..VoxelizeConfig::default()
        };
        assert!(matches!(
            Voxelizer::new(&mesh, config),
            Err(VoxelError::InvalidGridDimensions { .. })
        ));
    }

    #[test]
    fn test_overflowing_grid_config() {
        let mesh = torus(4, 4).normalize().unwrap();
        let config = VoxelizeConfig::cubic(3_000_000);
        assert!(matches!(config.validate(), Err(VoxelError::InvalidGridDimensions { .. })));
        assert!(matches!(voxelize(&mesh, &config), Err(VoxelError::InvalidGridDimensions { .. })));
    }
}
