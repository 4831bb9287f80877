//! Runtime world-space sampling of a grid.
//!
//! Queries take world-space positions, convert them into grid space, and
//! return world-space signed distances. Positions outside the grid are
//! clamped to the boundary voxels.

use nalgebra::Point3;

use rayon::prelude::*;

use crate::grid::SdfGrid;

/// Distance reported when no grid is available for a query.
///
/// Large enough that any consumer treating it as a real distance concludes
/// "far outside everything".
pub const MISSING_GRID_DISTANCE: f32 = 1.0e9;

/// Positions per parallel work item in [`sample_batch`].
const BATCH_CHUNK: usize = 1024;

/// Reconstruction filter used when sampling between voxel centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Snap to the nearest voxel.
    Nearest,
    /// Trilinear blend of the 8 surrounding voxels.
    #[default]
    Trilinear,
    /// Trilinear blend of per-voxel first-order extrapolations using the
    /// stored normals. Smooths the faceting that plain trilinear filtering
    /// shows near flat surfaces.
    Hermite,
}

/// Sample the signed distance at a world-space position.
///
/// The result is in world units, negative inside the mesh.
///
/// # Example
///
/// ```
/// use sdf_grid::{
///     sample, Aabb, GridSize, Interpolation, Octahedron, SdfGrid,
///     VoxelizationSettings,
/// };
/// use nalgebra::{Point3, Vector3};
///
/// let grid = SdfGrid::new(
///     Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
///     10,
///     0.0,
///     VoxelizationSettings::default(),
///     Vector3::zeros(),
///     GridSize::new(2, 2, 2),
///     vec![2.0; 8],
///     vec![Octahedron::encode(Vector3::z()); 8],
/// )
/// .unwrap();
///
/// let distance = sample(&grid, Point3::new(5.0, 5.0, 5.0), Interpolation::Trilinear);
/// assert!((distance - 20.0).abs() < 1e-4);
/// ```
#[must_use]
pub fn sample(grid: &SdfGrid, world: Point3<f32>, interpolation: Interpolation) -> f32 {
    if grid.is_empty() {
        return MISSING_GRID_DISTANCE;
    }

    let voxel_size = grid.voxel_size() as f32;
    let size = grid.size();
    let origin = grid.origin();

    // Grid-space coordinate, clamped onto the voxel lattice
    let clamp_axis = |value: f32, extent: u32| value.clamp(0.0, (extent - 1) as f32);
    let g = Point3::new(
        clamp_axis(world.x / voxel_size - origin.x, size.x),
        clamp_axis(world.y / voxel_size - origin.y, size.y),
        clamp_axis(world.z / voxel_size - origin.z, size.z),
    );

    let voxel_distance = match interpolation {
        Interpolation::Nearest => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let nearest = |value: f32| value.round() as u32;
            grid.distance(nearest(g.x), nearest(g.y), nearest(g.z))
        }
        Interpolation::Trilinear => {
            let cell = Cell::around(grid, g);
            cell.trilerp(|x, y, z| grid.distance(x, y, z))
        }
        Interpolation::Hermite => {
            let cell = Cell::around(grid, g);
            cell.trilerp(|x, y, z| {
                let corner = Point3::new(x as f32, y as f32, z as f32);
                grid.distance(x, y, z) + grid.normal(x, y, z).dot(&(g - corner))
            })
        }
    };

    voxel_distance * voxel_size
}

/// Sample a batch of positions in parallel.
///
/// Equivalent to mapping [`sample`] over `positions`, preserving order.
#[must_use]
pub fn sample_batch(
    grid: &SdfGrid,
    positions: &[Point3<f32>],
    interpolation: Interpolation,
) -> Vec<f32> {
    positions
        .par_chunks(BATCH_CHUNK)
        .flat_map_iter(|chunk| {
            chunk
                .iter()
                .map(|&position| sample(grid, position, interpolation))
        })
        .collect()
}

/// Sample a grid that may not exist yet.
///
/// Returns [`MISSING_GRID_DISTANCE`] when `grid` is `None`, so callers
/// waiting on an asynchronous build see "far away" instead of a hole.
#[must_use]
pub fn sample_or_missing(
    grid: Option<&SdfGrid>,
    world: Point3<f32>,
    interpolation: Interpolation,
) -> f32 {
    grid.map_or(MISSING_GRID_DISTANCE, |grid| {
        sample(grid, world, interpolation)
    })
}

/// The 8-voxel cell surrounding a grid-space position.
struct Cell {
    base: [u32; 3],
    upper: [u32; 3],
    frac: [f32; 3],
}

impl Cell {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn around(grid: &SdfGrid, g: Point3<f32>) -> Self {
        let size = grid.size();
        let mut base = [0_u32; 3];
        let mut upper = [0_u32; 3];
        let mut frac = [0.0_f32; 3];
        for axis in 0..3 {
            let extent = size.axis(axis);
            let value = g[axis];
            let floor = (value.floor() as u32).min(extent - 1);
            base[axis] = floor;
            upper[axis] = (floor + 1).min(extent - 1);
            frac[axis] = (value - floor as f32).clamp(0.0, 1.0);
        }
        Self { base, upper, frac }
    }

    fn trilerp(&self, mut value: impl FnMut(u32, u32, u32) -> f32) -> f32 {
        let [x0, y0, z0] = self.base;
        let [x1, y1, z1] = self.upper;
        let [fx, fy, fz] = self.frac;

        let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;

        let c00 = lerp(value(x0, y0, z0), value(x1, y0, z0), fx);
        let c10 = lerp(value(x0, y1, z0), value(x1, y1, z0), fx);
        let c01 = lerp(value(x0, y0, z1), value(x1, y0, z1), fx);
        let c11 = lerp(value(x0, y1, z1), value(x1, y1, z1), fx);

        let c0 = lerp(c00, c10, fy);
        let c1 = lerp(c01, c11, fy);
        lerp(c0, c1, fz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::octahedral::Octahedron;
    use crate::settings::VoxelizationSettings;
    use crate::size::GridSize;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn gradient_grid() -> SdfGrid {
        // Distance increases by 1 per voxel along X
        let size = GridSize::new(3, 2, 2);
        let distances = (0..size.volume())
            .map(|index| size.coord_of(index as usize).0 as f32)
            .collect();
        SdfGrid::new(
            Aabb::new(
                nalgebra::Point3::origin(),
                nalgebra::Point3::new(2.0, 1.0, 1.0),
            ),
            10,
            0.0,
            VoxelizationSettings::default(),
            Vector3::zeros(),
            size,
            distances,
            vec![Octahedron::encode(Vector3::x()); size.volume() as usize],
        )
        .unwrap()
    }

    #[test]
    fn nearest_snaps_to_voxel() {
        let grid = gradient_grid();
        let distance = sample(&grid, Point3::new(11.0, 0.0, 0.0), Interpolation::Nearest);
        assert_relative_eq!(distance, 10.0);
    }

    #[test]
    fn trilinear_interpolates_between_voxels() {
        let grid = gradient_grid();
        let distance = sample(&grid, Point3::new(5.0, 0.0, 0.0), Interpolation::Trilinear);
        assert_relative_eq!(distance, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn hermite_matches_trilinear_on_linear_field() {
        // The field already is d(x) = x with normal +X, so first-order
        // extrapolation reproduces the same values.
        let grid = gradient_grid();
        let position = Point3::new(7.5, 2.0, 3.0);
        let trilinear = sample(&grid, position, Interpolation::Trilinear);
        let hermite = sample(&grid, position, Interpolation::Hermite);
        assert_relative_eq!(hermite, trilinear, epsilon = 0.2);
    }

    #[test]
    fn positions_outside_are_clamped() {
        let grid = gradient_grid();
        let inside = sample(&grid, Point3::new(20.0, 0.0, 0.0), Interpolation::Trilinear);
        let outside = sample(&grid, Point3::new(500.0, 0.0, 0.0), Interpolation::Trilinear);
        assert_relative_eq!(inside, outside);
    }

    #[test]
    fn missing_grid_sentinel() {
        assert_relative_eq!(
            sample_or_missing(None, Point3::origin(), Interpolation::Trilinear),
            MISSING_GRID_DISTANCE
        );
        let grid = gradient_grid();
        let direct = sample(&grid, Point3::new(5.0, 5.0, 5.0), Interpolation::Trilinear);
        assert_relative_eq!(
            sample_or_missing(Some(&grid), Point3::new(5.0, 5.0, 5.0), Interpolation::Trilinear),
            direct
        );
    }

    #[test]
    fn batch_matches_scalar() {
        let grid = gradient_grid();
        let positions: Vec<_> = (0..50)
            .map(|i| Point3::new(i as f32 * 0.7, i as f32 * 0.3, 1.0))
            .collect();
        let batch = sample_batch(&grid, &positions, Interpolation::Trilinear);
        for (position, &result) in positions.iter().zip(&batch) {
            assert_relative_eq!(result, sample(&grid, *position, Interpolation::Trilinear));
        }
    }
}
