//! Surface normal reconstruction over the full grid.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use sdf_grid::GridSize;

use crate::progress::CancelToken;
use crate::voxelizer::is_unresolved;

/// Voxels per cancellation check.
const CANCEL_STRIDE: usize = 4096;

/// Produce a unit normal for every voxel.
///
/// Voxels touched by scan conversion keep their interpolated normal,
/// renormalized. Every other voxel looks up its propagated surface position
/// and trilinearly blends the raw normals of the 8 voxels around that
/// position; near the surface those voxels were all touched directly, so the
/// blend reads real data. Voxels that never resolved a surface position get
/// the zero vector.
///
/// The token is checked between chunks of voxels; a cancelled run stops
/// filling and returns `None`.
#[must_use]
pub fn propagate_normals(
    size: GridSize,
    surface_positions: &[Point3<f32>],
    raw_normals: &[Vector3<f32>],
    cancel: &CancelToken,
) -> Option<Vec<Vector3<f32>>> {
    let resolved: Vec<Vector3<f32>> = raw_normals
        .par_chunks(CANCEL_STRIDE)
        .enumerate()
        .flat_map_iter(|(chunk_index, chunk)| {
            let cancelled = cancel.is_cancelled();
            let offset = chunk_index * CANCEL_STRIDE;
            chunk.iter().enumerate().map(move |(within, &direct)| {
                if cancelled {
                    return Vector3::zeros();
                }
                resolve_normal(size, surface_positions, raw_normals, offset + within, direct)
            })
        })
        .collect();

    if cancel.is_cancelled() {
        return None;
    }
    Some(resolved)
}

fn resolve_normal(
    size: GridSize,
    surface_positions: &[Point3<f32>],
    raw_normals: &[Vector3<f32>],
    index: usize,
    direct: Vector3<f32>,
) -> Vector3<f32> {
    if let Some(unit) = direct.try_normalize(f32::EPSILON) {
        return unit;
    }

    let position = surface_positions[index];
    if is_unresolved(&position) {
        return Vector3::zeros();
    }

    sample_raw(size, raw_normals, position)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// Trilinear blend of the raw normal array at a grid-space position.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_raw(size: GridSize, raw_normals: &[Vector3<f32>], position: Point3<f32>) -> Vector3<f32> {
    let mut base = [0_u32; 3];
    let mut upper = [0_u32; 3];
    let mut alpha = [0.0_f32; 3];
    for axis in 0..3 {
        let extent = size.axis(axis);
        let floor = position[axis].floor();
        let clamped = (floor as i64).clamp(0, i64::from(extent) - 1) as u32;
        base[axis] = clamped;
        upper[axis] = (clamped + 1).min(extent - 1);
        alpha[axis] = (position[axis] - floor).clamp(0.0, 1.0);
    }

    let corner = |bits: usize| {
        let x = if bits & 0b001 != 0 { upper[0] } else { base[0] };
        let y = if bits & 0b010 != 0 { upper[1] } else { base[1] };
        let z = if bits & 0b100 != 0 { upper[2] } else { base[2] };
        raw_normals[size.linear_index(x, y, z)]
    };

    let lerp = |a: Vector3<f32>, b: Vector3<f32>, t: f32| a + (b - a) * t;

    let c00 = lerp(corner(0b000), corner(0b001), alpha[0]);
    let c10 = lerp(corner(0b010), corner(0b011), alpha[0]);
    let c01 = lerp(corner(0b100), corner(0b101), alpha[0]);
    let c11 = lerp(corner(0b110), corner(0b111), alpha[0]);

    let c0 = lerp(c00, c10, alpha[1]);
    let c1 = lerp(c01, c11, alpha[1]);
    lerp(c0, c1, alpha[2])
}
