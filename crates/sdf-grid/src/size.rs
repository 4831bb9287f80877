//! Integer voxel dimensions and flat-array indexing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Voxel dimensions of a dense grid.
///
/// The grid is stored as one contiguous array in row-major order with X
/// varying fastest: `index = x + y * size.x + z * size.x * size.y`.
///
/// # Example
///
/// ```
/// use sdf_grid::GridSize;
///
/// let size = GridSize::new(4, 3, 2);
/// assert_eq!(size.volume(), 24);
/// assert_eq!(size.linear_index(1, 2, 1), 1 + 2 * 4 + 1 * 4 * 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridSize {
    /// Voxel count along X.
    pub x: u32,
    /// Voxel count along Y.
    pub y: u32,
    /// Voxel count along Z.
    pub z: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total number of voxels.
    #[must_use]
    pub const fn volume(self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    /// Returns `true` if any dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    /// Voxel count along the given axis index (0 = X, 1 = Y, 2 = Z).
    #[must_use]
    pub const fn axis(self, axis: usize) -> u32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Flat index of the voxel at `(x, y, z)`.
    ///
    /// Coordinates must be in bounds; this is a pure index computation.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn linear_index(self, x: u32, y: u32, z: u32) -> usize {
        (x as u64 + y as u64 * self.x as u64 + z as u64 * self.x as u64 * self.y as u64) as usize
    }

    /// Flat index of the voxel at a coordinate triple.
    #[must_use]
    pub const fn linear_index_of(self, coord: [u32; 3]) -> usize {
        self.linear_index(coord[0], coord[1], coord[2])
    }

    /// Inverse of [`GridSize::linear_index`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn coord_of(self, index: usize) -> (u32, u32, u32) {
        let x = (index as u64 % self.x as u64) as u32;
        let y = (index as u64 / self.x as u64 % self.y as u64) as u32;
        let z = (index as u64 / (self.x as u64 * self.y as u64)) as u32;
        (x, y, z)
    }

    /// Checks that a signed coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(self, x: i64, y: i64, z: i64) -> bool {
        0 <= x && x < self.x as i64 && 0 <= y && y < self.y as i64 && 0 <= z && z < self.z as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume() {
        assert_eq!(GridSize::new(4, 3, 2).volume(), 24);
        assert_eq!(GridSize::new(0, 3, 2).volume(), 0);
    }

    #[test]
    fn is_empty() {
        assert!(GridSize::new(0, 1, 1).is_empty());
        assert!(GridSize::new(1, 0, 1).is_empty());
        assert!(GridSize::new(1, 1, 0).is_empty());
        assert!(!GridSize::new(1, 1, 1).is_empty());
    }

    #[test]
    fn x_varies_fastest() {
        let size = GridSize::new(4, 3, 2);
        assert_eq!(size.linear_index(0, 0, 0), 0);
        assert_eq!(size.linear_index(1, 0, 0), 1);
        assert_eq!(size.linear_index(0, 1, 0), 4);
        assert_eq!(size.linear_index(0, 0, 1), 12);
        assert_eq!(size.linear_index(3, 2, 1), 23);
    }

    #[test]
    fn coord_roundtrip() {
        let size = GridSize::new(5, 7, 3);
        for index in 0..size.volume() as usize {
            let (x, y, z) = size.coord_of(index);
            assert_eq!(size.linear_index(x, y, z), index);
        }
    }

    #[test]
    fn contains() {
        let size = GridSize::new(2, 2, 2);
        assert!(size.contains(0, 0, 0));
        assert!(size.contains(1, 1, 1));
        assert!(!size.contains(2, 0, 0));
        assert!(!size.contains(-1, 0, 0));
    }

    #[test]
    fn axis_lookup() {
        let size = GridSize::new(4, 5, 6);
        assert_eq!(size.axis(0), 4);
        assert_eq!(size.axis(1), 5);
        assert_eq!(size.axis(2), 6);
    }
}
