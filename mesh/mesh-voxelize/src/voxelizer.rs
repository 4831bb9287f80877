//! Scan-conversion of triangles into unsigned distances, surface positions,
//! and signed parity.

use nalgebra::{Point3, Vector2, Vector3};
use sdf_grid::{GridSize, VoxelizationSettings};
use tracing::debug;

use crate::error::{VoxelizeError, VoxelizeResult};
use crate::geometry::{point_in_triangle_2d, point_triangle_distance_squared};
use crate::sign::apply_signs;

/// Largest allowed voxel count per grid (1 GiB of distances at 4 bytes per
/// voxel).
pub const MAX_VOXEL_COUNT: u64 = 1 << 28;

/// Sentinel surface position for voxels no triangle has touched yet.
#[must_use]
pub fn unresolved_position() -> Point3<f32> {
    Point3::new(f32::MAX, f32::MAX, f32::MAX)
}

/// Returns `true` if a surface position is still the unresolved sentinel.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_unresolved(position: &Point3<f32>) -> bool {
    position.x == f32::MAX
}

/// Raw output of the scan-conversion pass.
///
/// Distances are exact near the surface and `f32::MAX` elsewhere; surface
/// positions are exact near the surface and the unresolved sentinel
/// elsewhere. Jump flooding turns this narrow band into a full field.
#[derive(Debug, Clone)]
pub struct VoxelizeOutput {
    /// Signed distances in voxel units. Far voxels hold `+/-f32::MAX`, with
    /// the sign already applied by the parity sweep.
    pub distances: Vec<f32>,
    /// Closest surface point per voxel, in grid space.
    pub surface_positions: Vec<Point3<f32>>,
    /// Interpolated (unnormalized) surface normal per touched voxel, present
    /// when per-vertex normals were supplied.
    pub normals: Option<Vec<Vector3<f32>>>,
    /// Number of sweep columns skipped as leaks.
    pub leak_count: u32,
}

/// Scan-convert a triangle mesh into a voxel grid.
///
/// `vertices` are in voxel units; `origin` is the grid minimum corner in the
/// same frame, so voxel `(x, y, z)` is centered at `vertices[..] - origin`
/// coordinates `(x, y, z)`. Each triangle writes exact distances into the
/// voxels overlapping its bounding box and registers sweep-axis crossings at
/// every lattice column its projection covers; the parity sweep then signs
/// the distances.
///
/// # Errors
///
/// Returns an error if the grid is degenerate or over budget, the index
/// buffer is malformed, or the normal array does not match the vertices.
pub fn voxelize(
    settings: VoxelizationSettings,
    vertices: &[Point3<f32>],
    indices: &[u32],
    origin: Vector3<f32>,
    size: GridSize,
    vertex_normals: Option<&[Vector3<f32>]>,
) -> VoxelizeResult<VoxelizeOutput> {
    if size.is_empty() {
        return Err(VoxelizeError::ZeroDimension { size });
    }
    if size.volume() >= MAX_VOXEL_COUNT {
        return Err(VoxelizeError::GridTooLarge {
            voxels: size.volume(),
            max: MAX_VOXEL_COUNT,
        });
    }
    if indices.len() % 3 != 0 {
        return Err(VoxelizeError::IndexCountNotTriangles {
            indices: indices.len(),
        });
    }
    if let Some(&index) = indices.iter().find(|&&index| index as usize >= vertices.len()) {
        return Err(VoxelizeError::IndexOutOfRange {
            index,
            vertex_count: vertices.len(),
        });
    }
    if let Some(normals) = vertex_normals {
        if normals.len() != vertices.len() {
            return Err(VoxelizeError::NormalCountMismatch {
                vertices: vertices.len(),
                normals: normals.len(),
            });
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    let voxel_count = size.volume() as usize;
    let mut distances = vec![f32::MAX; voxel_count];
    let mut surface_positions = vec![unresolved_position(); voxel_count];
    let mut normals = vertex_normals.map(|_| vec![Vector3::zeros(); voxel_count]);
    let mut counts = vec![0_i32; voxel_count];

    let (i_axis, j_axis, k_axis) = settings.sweep_axis.axes();

    for triangle in indices.chunks_exact(3) {
        let corners = [
            vertices[triangle[0] as usize] - origin,
            vertices[triangle[1] as usize] - origin,
            vertices[triangle[2] as usize] - origin,
        ];
        let [a, b, c] = corners;

        // Exact distances in the voxels overlapping the triangle
        let lo = |axis: usize| {
            band_min(a[axis].min(b[axis]).min(c[axis]), size.axis(axis))
        };
        let hi = |axis: usize| {
            band_max(a[axis].max(b[axis]).max(c[axis]), size.axis(axis))
        };
        for z in lo(2)..=hi(2) {
            for y in lo(1)..=hi(1) {
                for x in lo(0)..=hi(0) {
                    let center = Point3::new(x as f32, y as f32, z as f32);
                    let (distance_squared, weights) =
                        point_triangle_distance_squared(center, a, b, c);
                    let distance = distance_squared.sqrt();

                    let index = size.linear_index(x, y, z);
                    if distance < distances[index] {
                        distances[index] = distance;
                        surface_positions[index] = Point3::from(
                            a.coords * weights[0] + b.coords * weights[1] + c.coords * weights[2],
                        );
                        if let (Some(normals), Some(vertex_normals)) =
                            (normals.as_mut(), vertex_normals)
                        {
                            normals[index] = vertex_normals[triangle[0] as usize] * weights[0]
                                + vertex_normals[triangle[1] as usize] * weights[1]
                                + vertex_normals[triangle[2] as usize] * weights[2];
                        }
                    }
                }
            }
        }

        // Sweep-axis crossings at lattice columns covered by the projection
        let pa = Vector2::new(f64::from(a[i_axis]), f64::from(a[j_axis]));
        let pb = Vector2::new(f64::from(b[i_axis]), f64::from(b[j_axis]));
        let pc = Vector2::new(f64::from(c[i_axis]), f64::from(c[j_axis]));

        let min_i = inner_min(pa.x.min(pb.x).min(pc.x), size.axis(i_axis));
        let max_i = inner_max(pa.x.max(pb.x).max(pc.x), size.axis(i_axis));
        let min_j = inner_min(pa.y.min(pb.y).min(pc.y), size.axis(j_axis));
        let max_j = inner_max(pa.y.max(pb.y).max(pc.y), size.axis(j_axis));
        if min_i > max_i || min_j > max_j {
            continue;
        }

        for j in min_j..=max_j {
            for i in min_i..=max_i {
                let lattice = Vector2::new(f64::from(i), f64::from(j));
                let Some(weights) = point_in_triangle_2d(lattice, pa, pb, pc) else {
                    continue;
                };

                let crossing = weights[0] * f64::from(a[k_axis])
                    + weights[1] * f64::from(b[k_axis])
                    + weights[2] * f64::from(c[k_axis]);
                // The crossing belongs to the first voxel after it in sweep
                // order
                let snapped = if settings.reverse_sweep {
                    crossing.floor()
                } else {
                    crossing.ceil()
                };
                #[allow(clippy::cast_possible_truncation)]
                let k = (snapped as i64).clamp(0, i64::from(size.axis(k_axis)) - 1) as u32;

                let mut coord = [0_u32; 3];
                coord[i_axis] = i;
                coord[j_axis] = j;
                coord[k_axis] = k;
                counts[size.linear_index_of(coord)] += 1;
            }
        }
    }

    let leak_count = apply_signs(settings, size, &counts, &mut distances);
    if leak_count > 0 {
        debug!(leak_count, "sign sweep skipped leaking columns");
    }

    Ok(VoxelizeOutput {
        distances,
        surface_positions,
        normals,
        leak_count,
    })
}

/// One voxel of slack around each triangle's bounding box, so voxels right
/// next to an axis-aligned face still get an exact distance.
const EXACT_BAND: i64 = 1;

/// First lattice coordinate of a triangle's distance band along one axis.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn band_min(value: f32, extent: u32) -> u32 {
    (value.floor() as i64 - EXACT_BAND).clamp(0, i64::from(extent) - 1) as u32
}

/// Last lattice coordinate of a triangle's distance band along one axis.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn band_max(value: f32, extent: u32) -> u32 {
    (value.ceil() as i64 + EXACT_BAND).clamp(0, i64::from(extent) - 1) as u32
}

/// First lattice coordinate at or after `value`, clamped into the grid.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn inner_min(value: f64, extent: u32) -> u32 {
    (value.ceil() as i64).clamp(0, i64::from(extent) - 1) as u32
}

/// Last lattice coordinate at or before `value`, clamped into the grid.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn inner_max(value: f64, extent: u32) -> u32 {
    (value.floor() as i64).clamp(0, i64::from(extent) - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sdf_grid::SweepAxis;

    fn z_sweep(watertight: bool) -> VoxelizationSettings {
        VoxelizationSettings {
            sweep_axis: SweepAxis::Z,
            reverse_sweep: true,
            watertight,
            hide_leaks: true,
        }
    }

    #[test]
    fn rejects_malformed_input() {
        let size = GridSize::new(4, 4, 4);
        let vertices = [Point3::new(1.0, 1.0, 1.0); 3];
        let origin = Vector3::zeros();

        let result = voxelize(z_sweep(true), &vertices, &[0, 1], origin, size, None);
        assert!(matches!(
            result,
            Err(VoxelizeError::IndexCountNotTriangles { indices: 2 })
        ));

        let result = voxelize(z_sweep(true), &vertices, &[0, 1, 3], origin, size, None);
        assert!(matches!(
            result,
            Err(VoxelizeError::IndexOutOfRange { index: 3, .. })
        ));

        let normals = [Vector3::z(); 2];
        let result = voxelize(z_sweep(true), &vertices, &[0, 1, 2], origin, size, Some(&normals));
        assert!(matches!(
            result,
            Err(VoxelizeError::NormalCountMismatch { vertices: 3, normals: 2 })
        ));
    }

    #[test]
    fn rejects_degenerate_and_oversized_grids() {
        let vertices = [Point3::new(1.0, 1.0, 1.0); 3];
        let origin = Vector3::zeros();

        let result = voxelize(
            z_sweep(true),
            &vertices,
            &[0, 1, 2],
            origin,
            GridSize::new(4, 0, 4),
            None,
        );
        assert!(matches!(result, Err(VoxelizeError::ZeroDimension { .. })));

        let result = voxelize(
            z_sweep(true),
            &vertices,
            &[0, 1, 2],
            origin,
            GridSize::new(1 << 10, 1 << 10, 1 << 10),
            None,
        );
        assert!(matches!(result, Err(VoxelizeError::GridTooLarge { .. })));
    }

    #[test]
    fn triangle_band_gets_exact_distances() {
        // Flat triangle at z = 2, large enough to cover voxel (2, 2, _)
        let vertices = [
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(5.0, 0.0, 2.0),
            Point3::new(0.0, 5.0, 2.0),
        ];
        let size = GridSize::new(6, 6, 6);
        let output = voxelize(
            z_sweep(false),
            &vertices,
            &[0, 1, 2],
            Vector3::zeros(),
            size,
            None,
        )
        .unwrap();

        // Directly on the plane
        assert_relative_eq!(
            output.distances[size.linear_index(1, 1, 2)].abs(),
            0.0,
            epsilon = 1e-5
        );
        // One voxel above the plane
        assert_relative_eq!(
            output.distances[size.linear_index(1, 1, 3)].abs(),
            1.0,
            epsilon = 1e-5
        );
        // Far corner was never touched by the band
        assert_eq!(output.distances[size.linear_index(5, 5, 5)].abs(), f32::MAX);
    }

    #[test]
    fn surface_positions_land_on_the_triangle() {
        let vertices = [
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(5.0, 0.0, 2.0),
            Point3::new(0.0, 5.0, 2.0),
        ];
        let size = GridSize::new(6, 6, 6);
        let output = voxelize(
            z_sweep(false),
            &vertices,
            &[0, 1, 2],
            Vector3::zeros(),
            size,
            None,
        )
        .unwrap();

        let position = output.surface_positions[size.linear_index(1, 1, 3)];
        assert_relative_eq!(position.z, 2.0, epsilon = 1e-5);
        assert_relative_eq!(position.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(position.y, 1.0, epsilon = 1e-5);
        assert!(is_unresolved(&output.surface_positions[size.linear_index(5, 5, 5)]));
    }

    #[test]
    fn blended_normals_follow_the_face() {
        let vertices = [
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(5.0, 0.0, 2.0),
            Point3::new(0.0, 5.0, 2.0),
        ];
        let normals = [Vector3::z(); 3];
        let size = GridSize::new(6, 6, 6);
        let output = voxelize(
            z_sweep(false),
            &vertices,
            &[0, 1, 2],
            Vector3::zeros(),
            size,
            Some(&normals),
        )
        .unwrap();

        let blended = output.normals.unwrap();
        assert_relative_eq!(blended[size.linear_index(1, 1, 2)].z, 1.0, epsilon = 1e-5);
        // Untouched voxels stay zero for the propagation pass to fill
        assert_eq!(blended[size.linear_index(5, 5, 5)], Vector3::zeros());
    }

    #[test]
    fn origin_shifts_the_lattice() {
        let vertices = [
            Point3::new(10.0, 10.0, 12.0),
            Point3::new(15.0, 10.0, 12.0),
            Point3::new(10.0, 15.0, 12.0),
        ];
        let size = GridSize::new(6, 6, 6);
        let output = voxelize(
            z_sweep(false),
            &vertices,
            &[0, 1, 2],
            Vector3::new(10.0, 10.0, 10.0),
            size,
            None,
        )
        .unwrap();

        assert_relative_eq!(
            output.distances[size.linear_index(1, 1, 2)].abs(),
            0.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn open_shell_counts_no_leaks_under_full_cover() {
        // A quad overhanging the whole lattice so every column crosses it
        let vertices = [
            Point3::new(-1.0, -1.0, 2.5),
            Point3::new(13.0, -1.0, 2.5),
            Point3::new(13.0, 13.0, 2.5),
            Point3::new(-1.0, 13.0, 2.5),
        ];
        let size = GridSize::new(12, 12, 6);
        let output = voxelize(
            z_sweep(false),
            &vertices,
            &[0, 1, 2, 0, 2, 3],
            Vector3::zeros(),
            size,
            None,
        )
        .unwrap();

        assert_eq!(output.leak_count, 0);
        // Reverse sweep from above: voxels below the quad are inside
        assert!(output.distances[size.linear_index(6, 6, 1)] < 0.0);
        assert!(output.distances[size.linear_index(6, 6, 4)] > 0.0);
    }
}
