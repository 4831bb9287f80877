//! Immutable voxelized signed distance field grids.
//!
//! This crate provides the data half of the mesh voxelization pipeline:
//!
//! - [`SdfGrid`] - The immutable, dense signed distance field container
//! - [`GridSize`] - Integer voxel dimensions with flat-array indexing
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`VoxelizationSettings`] and [`SweepAxis`] - Sign-sweep configuration
//! - [`Octahedron`] - 2-byte octahedral unit-vector packing for normals
//! - [`GridCache`] - Content-addressed derived-data cache of built grids
//! - [`sample`] / [`sample_batch`] - Runtime world-space field queries
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine dependencies**. It can be used
//! in CLI tools, servers, other game engines, and offline bakers.
//!
//! # Data Model
//!
//! A grid is produced wholesale by one voxelization run and never mutated in
//! place. Distances are stored in voxel units in a dense row-major array
//! (X varies fastest); normals are stored octahedrally packed alongside.
//! Published grids are shared by reference ([`std::sync::Arc`]) and replaced,
//! not patched, when the source mesh or parameters change, so concurrent
//! sampling never requires locking.
//!
//! # Example
//!
//! ```
//! use sdf_grid::{Aabb, GridSize, Octahedron, SdfGrid, VoxelizationSettings};
//! use nalgebra::{Point3, Vector3};
//!
//! let size = GridSize::new(2, 2, 2);
//! let bounds = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let grid = SdfGrid::new(
//!     bounds,
//!     10,
//!     0.0,
//!     VoxelizationSettings::default(),
//!     Vector3::zeros(),
//!     size,
//!     vec![1.0; 8],
//!     vec![Octahedron::encode(Vector3::z()); 8],
//! )
//! .unwrap();
//!
//! assert_eq!(grid.len(), 8);
//! assert_eq!(grid.distance(1, 1, 1), 1.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod bounds;
mod cache;
mod error;
mod grid;
mod octahedral;
mod sample;
mod serialize;
mod settings;
mod size;

pub use bounds::Aabb;
pub use cache::{CacheKey, GridCache};
pub use error::{GridError, GridResult};
pub use grid::SdfGrid;
pub use octahedral::Octahedron;
pub use sample::{
    sample, sample_batch, sample_or_missing, Interpolation, MISSING_GRID_DISTANCE,
};
pub use serialize::SCHEMA_VERSION;
pub use settings::{SweepAxis, VoxelizationSettings};
pub use size::GridSize;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
