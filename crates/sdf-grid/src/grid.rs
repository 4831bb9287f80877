//! The immutable signed distance field container.

use nalgebra::Vector3;

use crate::bounds::Aabb;
use crate::error::{GridError, GridResult};
use crate::octahedral::Octahedron;
use crate::settings::VoxelizationSettings;
use crate::size::GridSize;

/// A dense, immutable signed distance field built from a triangle mesh.
///
/// Distances are stored in voxel units (one voxel = `voxel_size` world
/// units), negative inside the mesh and positive outside, in one contiguous
/// row-major array with X varying fastest. The parallel normal array stores
/// octahedrally packed unit surface normals.
///
/// A grid is created wholesale by one voxelization run and never mutated in
/// place; share it behind an [`std::sync::Arc`] and replace the reference to
/// publish a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct SdfGrid {
    mesh_bounds: Aabb,
    voxel_size: u32,
    max_smoothness: f32,
    settings: VoxelizationSettings,
    origin: Vector3<f32>,
    size: GridSize,
    distance_field: Vec<f32>,
    normals: Vec<Octahedron>,
}

impl SdfGrid {
    /// Assemble a grid from finished arrays.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LengthMismatch`] if either array does not hold
    /// exactly `size.volume()` entries.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mesh_bounds: Aabb,
        voxel_size: u32,
        max_smoothness: f32,
        settings: VoxelizationSettings,
        origin: Vector3<f32>,
        size: GridSize,
        distance_field: Vec<f32>,
        normals: Vec<Octahedron>,
    ) -> GridResult<Self> {
        let expected = size.volume();
        if distance_field.len() as u64 != expected {
            return Err(GridError::LengthMismatch {
                size,
                expected,
                got: distance_field.len(),
            });
        }
        if normals.len() as u64 != expected {
            return Err(GridError::LengthMismatch {
                size,
                expected,
                got: normals.len(),
            });
        }

        Ok(Self {
            mesh_bounds,
            voxel_size,
            max_smoothness,
            settings,
            origin,
            size,
            distance_field,
            normals,
        })
    }

    /// Bounds of the source mesh in voxel units, before smoothness padding.
    #[must_use]
    pub const fn mesh_bounds(&self) -> Aabb {
        self.mesh_bounds
    }

    /// World units per voxel.
    #[must_use]
    pub const fn voxel_size(&self) -> u32 {
        self.voxel_size
    }

    /// Fraction of the mesh extent used as grid padding.
    #[must_use]
    pub const fn max_smoothness(&self) -> f32 {
        self.max_smoothness
    }

    /// Sign-sweep settings the grid was built with.
    #[must_use]
    pub const fn settings(&self) -> VoxelizationSettings {
        self.settings
    }

    /// Grid-space minimum corner, in voxel units.
    #[must_use]
    pub const fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    /// Voxel dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// The raw signed distance array, in voxel units.
    #[must_use]
    pub fn distance_field(&self) -> &[f32] {
        &self.distance_field
    }

    /// The raw packed normal array.
    #[must_use]
    pub fn normals(&self) -> &[Octahedron] {
        &self.normals
    }

    /// Signed distance at a voxel, in voxel units.
    #[must_use]
    pub fn distance(&self, x: u32, y: u32, z: u32) -> f32 {
        self.distance_field[self.size.linear_index(x, y, z)]
    }

    /// Unpacked surface normal at a voxel.
    #[must_use]
    pub fn normal(&self, x: u32, y: u32, z: u32) -> Vector3<f32> {
        self.normals[self.size.linear_index(x, y, z)].decode()
    }

    /// Number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distance_field.len()
    }

    /// Returns `true` if the grid holds no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distance_field.is_empty()
    }

    /// Heap memory retained by this grid, for memory accounting.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.distance_field.capacity() * std::mem::size_of::<f32>()
            + self.normals.capacity() * std::mem::size_of::<Octahedron>()
    }

    /// World-space bounds covered by the field: the mesh bounds extended by
    /// one voxel and scaled back to world units.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        self.mesh_bounds
            .expanded_by(1.0)
            .scaled(self.voxel_size as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn small_grid() -> SdfGrid {
        let size = GridSize::new(2, 2, 2);
        SdfGrid::new(
            Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            10,
            0.2,
            VoxelizationSettings::default(),
            Vector3::new(-1.0, -1.0, -1.0),
            size,
            (0..8).map(|i| i as f32).collect(),
            vec![Octahedron::encode(Vector3::z()); 8],
        )
        .unwrap()
    }

    #[test]
    fn new_validates_distance_length() {
        let size = GridSize::new(2, 2, 2);
        let result = SdfGrid::new(
            Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            10,
            0.0,
            VoxelizationSettings::default(),
            Vector3::zeros(),
            size,
            vec![0.0; 7],
            vec![Octahedron::ZERO; 8],
        );
        assert!(matches!(result, Err(GridError::LengthMismatch { .. })));
    }

    #[test]
    fn new_validates_normal_length() {
        let size = GridSize::new(2, 2, 2);
        let result = SdfGrid::new(
            Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            10,
            0.0,
            VoxelizationSettings::default(),
            Vector3::zeros(),
            size,
            vec![0.0; 8],
            vec![Octahedron::ZERO; 9],
        );
        assert!(matches!(result, Err(GridError::LengthMismatch { .. })));
    }

    #[test]
    fn indexed_access() {
        let grid = small_grid();
        assert_eq!(grid.distance(0, 0, 0), 0.0);
        assert_eq!(grid.distance(1, 0, 0), 1.0);
        assert_eq!(grid.distance(1, 1, 1), 7.0);
        assert!(grid.normal(0, 0, 0).z > 0.99);
    }

    #[test]
    fn allocated_size_counts_arrays() {
        let grid = small_grid();
        assert!(grid.allocated_size() >= 8 * 4 + 8 * 2);
    }

    #[test]
    fn world_bounds_scales_by_voxel_size() {
        let grid = small_grid();
        let bounds = grid.world_bounds();
        assert_eq!(bounds.min, Point3::new(-10.0, -10.0, -10.0));
        assert_eq!(bounds.max, Point3::new(20.0, 20.0, 20.0));
    }
}
