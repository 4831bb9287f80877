//! Parity sign sweeps over intersection counts.

use sdf_grid::{GridSize, VoxelizationSettings};

/// Apply inside/outside signs to `distances` from per-voxel intersection
/// counts, returning the number of leaking columns.
///
/// Each column along the sweep axis is walked in sweep order, accumulating
/// crossing counts; voxels with odd accumulated parity are inside and get
/// their distance negated. Columns whose total parity is inconsistent with
/// the mesh topology are leaks: when `hide_leaks` is set they are skipped
/// entirely, which leaves a hole instead of a tube of wrong-signed voxels
/// running through the whole grid.
pub fn apply_signs(
    settings: VoxelizationSettings,
    size: GridSize,
    counts: &[i32],
    distances: &mut [f32],
) -> u32 {
    let (i_axis, j_axis, k_axis) = settings.sweep_axis.axes();
    let size_i = size.axis(i_axis);
    let size_j = size.axis(j_axis);
    let size_k = size.axis(k_axis);

    // An open shell swept away from its opening starts inside
    let seed = i32::from(!settings.watertight && !settings.reverse_sweep);

    let mut leak_count = 0_u32;
    let mut coord = [0_u32; 3];

    for j in 0..size_j {
        for i in 0..size_i {
            coord[i_axis] = i;
            coord[j_axis] = j;

            if settings.hide_leaks {
                let mut total = 0_i32;
                for k in 0..size_k {
                    coord[k_axis] = k;
                    total += counts[size.linear_index_of(coord)];
                }
                let leaking = if settings.watertight {
                    total % 2 != 0
                } else {
                    total == 0
                };
                if leaking {
                    leak_count += 1;
                    continue;
                }
            }

            let mut parity = seed;
            for step in 0..size_k {
                coord[k_axis] = if settings.reverse_sweep {
                    size_k - 1 - step
                } else {
                    step
                };
                let index = size.linear_index_of(coord);
                parity += counts[index];
                if parity % 2 != 0 {
                    distances[index] = -distances[index];
                }
            }
        }
    }

    leak_count
}
