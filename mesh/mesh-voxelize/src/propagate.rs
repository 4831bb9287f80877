//! Jump-flood propagation of surface positions across the grid.
//!
//! Scan conversion only resolves voxels in a narrow band around the surface.
//! The jump-flood pass spreads the closest known surface position to every
//! voxel in `O(n log n)`, after which exact distances are recomputed from the
//! propagated positions.

use nalgebra::Point3;
use rayon::prelude::*;
use sdf_grid::GridSize;

use crate::voxelizer::is_unresolved;

/// Spread each voxel's closest surface position across the whole grid.
///
/// Runs the jump-flood passes with halving step sizes; at every step each
/// voxel adopts the best candidate among its 26 step-neighbors. The result
/// is approximate in the usual jump-flood sense but exact in the narrow band
/// where scan conversion already resolved positions.
pub fn jump_flood(size: GridSize, positions: &mut Vec<Point3<f32>>) {
    let max_dim = size.x.max(size.y).max(size.z);
    let mut step = max_dim.next_power_of_two() / 2;
    let mut scratch = positions.clone();

    while step >= 1 {
        flood_pass(size, step, positions, &mut scratch);
        std::mem::swap(positions, &mut scratch);
        step /= 2;
    }
}

fn flood_pass(
    size: GridSize,
    step: u32,
    source: &[Point3<f32>],
    target: &mut [Point3<f32>],
) {
    target
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, output)| {
            let (x, y, z) = size.coord_of(index);
            let center = Point3::new(x as f32, y as f32, z as f32);

            let mut best = source[index];
            let mut best_distance = if is_unresolved(&best) {
                f32::INFINITY
            } else {
                (best - center).norm_squared()
            };

            for dz in -1_i64..=1 {
                for dy in -1_i64..=1 {
                    for dx in -1_i64..=1 {
                        if dx == 0 && dy == 0 && dz == 0 {
                            continue;
                        }
                        let nx = i64::from(x) + dx * i64::from(step);
                        let ny = i64::from(y) + dy * i64::from(step);
                        let nz = i64::from(z) + dz * i64::from(step);
                        if !size.contains(nx, ny, nz) {
                            continue;
                        }

                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let candidate =
                            source[size.linear_index(nx as u32, ny as u32, nz as u32)];
                        if is_unresolved(&candidate) {
                            continue;
                        }

                        let distance = (candidate - center).norm_squared();
                        if distance < best_distance {
                            best_distance = distance;
                            best = candidate;
                        }
                    }
                }
            }

            *output = best;
        });
}

/// Replace each distance magnitude with the exact distance to the propagated
/// surface position, keeping the sign from the parity sweep.
///
/// Voxels whose position is still unresolved (a mesh with no triangles, or a
/// fully leaking grid) are left untouched.
pub fn distances_from_positions(
    size: GridSize,
    positions: &[Point3<f32>],
    distances: &mut [f32],
) {
    distances
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, distance)| {
            let position = positions[index];
            if is_unresolved(&position) {
                return;
            }
            let (x, y, z) = size.coord_of(index);
            let center = Point3::new(x as f32, y as f32, z as f32);
            *distance = (position - center).norm().copysign(*distance);
        });
}
