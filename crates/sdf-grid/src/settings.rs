//! Voxelization sign-sweep configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The axis along which intersection parity is accumulated to determine
/// inside/outside signs.
///
/// If the mesh is a plane-like shell, sweep along its normal (usually Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SweepAxis {
    /// Sweep along X.
    #[default]
    X,
    /// Sweep along Y.
    Y,
    /// Sweep along Z.
    Z,
}

impl SweepAxis {
    /// The `(I, J, K)` axis permutation for this sweep direction.
    ///
    /// `I` and `J` span the plane orthogonal to the sweep; `K` is the sweep
    /// axis itself.
    ///
    /// # Example
    ///
    /// ```
    /// use sdf_grid::SweepAxis;
    ///
    /// assert_eq!(SweepAxis::Z.axes(), (0, 1, 2));
    /// assert_eq!(SweepAxis::X.axes(), (1, 2, 0));
    /// ```
    #[must_use]
    pub const fn axes(self) -> (usize, usize, usize) {
        match self {
            Self::X => (1, 2, 0),
            Self::Y => (2, 0, 1),
            Self::Z => (0, 1, 2),
        }
    }

    /// Stable byte tag used by the binary serialization and cache key.
    #[must_use]
    pub(crate) const fn to_u8(self) -> u8 {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Inverse of [`SweepAxis::to_u8`].
    pub(crate) const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }
}

/// How signs are derived from intersection parity during voxelization.
///
/// Part of the cache key: any change forces a full rebuild of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelizationSettings {
    /// Sweep direction used to determine the voxel signs.
    pub sweep_axis: SweepAxis,
    /// Walk each column the other way around: if the sweep axis is Z, top to
    /// bottom instead of bottom to top.
    pub reverse_sweep: bool,
    /// Assume every column of voxels starts outside the mesh, goes inside,
    /// then comes back out. Set to `false` for open shells (for example a
    /// half sphere with no bottom geometry).
    pub watertight: bool,
    /// Exclude leak columns from sign flips, leaving holes instead of long
    /// tubes going through the entire asset.
    pub hide_leaks: bool,
}

impl Default for VoxelizationSettings {
    fn default() -> Self {
        Self {
            sweep_axis: SweepAxis::X,
            reverse_sweep: true,
            watertight: true,
            hide_leaks: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_permutations() {
        for axis in [SweepAxis::X, SweepAxis::Y, SweepAxis::Z] {
            let (i, j, k) = axis.axes();
            let mut seen = [i, j, k];
            seen.sort_unstable();
            assert_eq!(seen, [0, 1, 2]);
        }
    }

    #[test]
    fn sweep_axis_is_last() {
        assert_eq!(SweepAxis::X.axes().2, 0);
        assert_eq!(SweepAxis::Y.axes().2, 1);
        assert_eq!(SweepAxis::Z.axes().2, 2);
    }

    #[test]
    fn byte_tag_roundtrip() {
        for axis in [SweepAxis::X, SweepAxis::Y, SweepAxis::Z] {
            assert_eq!(SweepAxis::from_u8(axis.to_u8()), Some(axis));
        }
        assert_eq!(SweepAxis::from_u8(3), None);
    }

    #[test]
    fn defaults_match_asset_defaults() {
        let settings = VoxelizationSettings::default();
        assert_eq!(settings.sweep_axis, SweepAxis::X);
        assert!(settings.reverse_sweep);
        assert!(settings.watertight);
        assert!(settings.hide_leaks);
    }
}
