//! Triangle mesh to signed distance field voxelization.
//!
//! Turns an indexed triangle mesh into a dense [`sdf_grid::SdfGrid`]:
//!
//! - [`MeshData`] - Input mesh with optional per-vertex normals
//! - [`voxelize_mesh`] - The full pipeline, with caching and cancellation
//! - [`voxelize`] - The scan-conversion and sign-sweep core, for callers
//!   that manage their own grid placement
//! - [`jump_flood`] / [`distances_from_positions`] - Propagation of the
//!   narrow band into a full field
//! - [`propagate_normals`] - Per-voxel unit normal reconstruction
//!
//! # Algorithm
//!
//! Scan conversion rasterizes each triangle into the voxels around it,
//! recording exact unsigned distances and closest surface points. Signs come
//! from intersection parity: every lattice column along the sweep axis
//! counts the triangle crossings below each voxel, with a robust
//! simulation-of-simplicity orientation predicate so shared triangle edges
//! are counted exactly once. Jump flooding then spreads the closest surface
//! positions to the rest of the grid, distances are recomputed from the
//! propagated positions, and normals are reconstructed for every voxel.
//!
//! # Example
//!
//! ```
//! use mesh_voxelize::{voxelize_mesh, MeshData, VoxelizeContext};
//! use sdf_grid::VoxelizationSettings;
//! use nalgebra::Point3;
//!
//! // A tetrahedron, 40 units on a side, voxelized at 10 units per voxel
//! let mesh = MeshData::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(40.0, 0.0, 0.0),
//!         Point3::new(0.0, 40.0, 0.0),
//!         Point3::new(0.0, 0.0, 40.0),
//!     ],
//!     vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
//! );
//! let grid = voxelize_mesh(
//!     &mesh,
//!     "tetrahedron-v1",
//!     10,
//!     0.2,
//!     VoxelizationSettings::default(),
//!     &VoxelizeContext::new(),
//! )
//! .unwrap()
//! .unwrap();
//!
//! assert!(!grid.is_empty());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod geometry;
mod mesh;
mod normals;
mod pipeline;
mod progress;
mod propagate;
mod sign;
mod voxelizer;

pub use error::{VoxelizeError, VoxelizeResult};
pub use mesh::MeshData;
pub use normals::propagate_normals;
pub use pipeline::{voxelize_mesh, VoxelizeContext};
pub use progress::CancelToken;
pub use propagate::{distances_from_positions, jump_flood};
pub use voxelizer::{
    is_unresolved, unresolved_position, voxelize, VoxelizeOutput, MAX_VOXEL_COUNT,
};

// Re-export the grid types callers interact with
pub use sdf_grid::{Aabb, GridSize, SdfGrid, SweepAxis, VoxelizationSettings};
