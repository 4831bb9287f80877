//! Error types for mesh voxelization.

use sdf_grid::{GridError, GridSize};
use thiserror::Error;

/// Result type for voxelization operations.
pub type VoxelizeResult<T> = Result<T, VoxelizeError>;

/// Errors that can occur while voxelizing a mesh.
#[derive(Debug, Error)]
pub enum VoxelizeError {
    /// The mesh has no vertices or no triangles.
    #[error("mesh is empty")]
    EmptyMesh,

    /// The voxel size must be at least one world unit.
    #[error("invalid voxel size {0}, must be >= 1")]
    InvalidVoxelSize(u32),

    /// The index buffer length is not a multiple of three.
    #[error("index count {indices} is not a multiple of 3")]
    IndexCountNotTriangles {
        /// Number of indices supplied.
        indices: usize,
    },

    /// An index refers past the end of the vertex buffer.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices supplied.
        vertex_count: usize,
    },

    /// The supplied per-vertex normal array does not match the vertex array.
    #[error("normal count mismatch: {vertices} vertices but {normals} normals")]
    NormalCountMismatch {
        /// Number of vertices supplied.
        vertices: usize,
        /// Number of normals supplied.
        normals: usize,
    },

    /// The requested grid would exceed the voxel budget. Increase the voxel
    /// size or reduce the smoothness padding.
    #[error("grid of {voxels} voxels exceeds the maximum of {max}")]
    GridTooLarge {
        /// Requested voxel count.
        voxels: u64,
        /// Largest allowed voxel count.
        max: u64,
    },

    /// The mesh collapses to zero extent along some axis at this voxel size.
    #[error("grid has a zero dimension: {size:?}")]
    ZeroDimension {
        /// The degenerate grid size.
        size: GridSize,
    },

    /// Error from the grid container or cache layer.
    #[error(transparent)]
    Grid(#[from] GridError),
}
