//! The full mesh-to-grid voxelization pipeline.

use std::sync::Arc;

use nalgebra::Point3;
use sdf_grid::{
    Aabb, CacheKey, GridCache, GridSize, Octahedron, SdfGrid, VoxelizationSettings,
};
use tracing::{debug, info};

use crate::error::{VoxelizeError, VoxelizeResult};
use crate::mesh::MeshData;
use crate::normals::propagate_normals;
use crate::progress::CancelToken;
use crate::propagate::{distances_from_positions, jump_flood};
use crate::voxelizer::voxelize;

/// Shared services for a voxelization run.
#[derive(Debug, Clone, Default)]
pub struct VoxelizeContext {
    /// Derived-data cache consulted before voxelizing and updated after.
    pub cache: Option<Arc<GridCache>>,
    /// Cancellation flag checked between pipeline phases.
    pub cancel: CancelToken,
}

impl VoxelizeContext {
    /// A context with no cache and no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a derived-data cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<GridCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Voxelize a mesh into a signed distance field grid.
///
/// The mesh is scaled into voxel units (`voxel_size` world units per voxel),
/// its bounds are padded by `max_smoothness` times the largest extent, and
/// the grid is built over the padded box: scan conversion, parity sign
/// sweep, jump-flood propagation, exact distance recomputation, and normal
/// reconstruction. `mesh_id` identifies the mesh geometry for caching and
/// must change whenever the geometry does.
///
/// Returns `Ok(None)` if the run was cancelled through the context's token.
///
/// # Errors
///
/// Returns an error for an empty mesh, a zero voxel size, a malformed index
/// or normal buffer, or a grid that is degenerate or over budget.
pub fn voxelize_mesh(
    mesh: &MeshData,
    mesh_id: &str,
    voxel_size: u32,
    max_smoothness: f32,
    settings: VoxelizationSettings,
    context: &VoxelizeContext,
) -> VoxelizeResult<Option<Arc<SdfGrid>>> {
    if voxel_size == 0 {
        return Err(VoxelizeError::InvalidVoxelSize(voxel_size));
    }
    if mesh.is_empty() {
        return Err(VoxelizeError::EmptyMesh);
    }

    let key = CacheKey::build(mesh_id, voxel_size, max_smoothness, &settings);
    if let Some(cache) = &context.cache {
        if let Some(grid) = cache.get(&key) {
            debug!(key = key.as_str(), "voxelized grid cache hit");
            return Ok(Some(grid));
        }
    }

    info!(
        mesh_id,
        vertices = mesh.vertices.len(),
        triangles = mesh.triangle_count(),
        voxel_size,
        "voxelizing mesh"
    );

    let scale = 1.0 / voxel_size as f32;
    let scaled: Vec<Point3<f32>> = mesh.vertices.iter().map(|vertex| vertex * scale).collect();
    let mesh_bounds =
        Aabb::from_points(scaled.iter().copied()).ok_or(VoxelizeError::EmptyMesh)?;
    let padded = mesh_bounds.expanded_by(mesh_bounds.max_extent() * max_smoothness);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let ceil = |extent: f32| extent.ceil().max(0.0) as u32;
    let grid_size = GridSize::new(
        ceil(padded.size().x),
        ceil(padded.size().y),
        ceil(padded.size().z),
    );
    let origin = padded.min.coords;

    let vertex_normals = match &mesh.vertex_normals {
        Some(normals) => {
            if normals.len() != mesh.vertices.len() {
                return Err(VoxelizeError::NormalCountMismatch {
                    vertices: mesh.vertices.len(),
                    normals: normals.len(),
                });
            }
            normals.clone()
        }
        None => mesh.compute_vertex_normals(),
    };

    if context.cancel.is_cancelled() {
        return Ok(None);
    }

    let output = voxelize(
        settings,
        &scaled,
        &mesh.indices,
        origin,
        grid_size,
        Some(&vertex_normals),
    )?;
    let mut distances = output.distances;
    let mut surface_positions = output.surface_positions;
    let raw_normals = output.normals.unwrap_or_default();

    if context.cancel.is_cancelled() {
        return Ok(None);
    }

    jump_flood(grid_size, &mut surface_positions);

    if context.cancel.is_cancelled() {
        return Ok(None);
    }

    distances_from_positions(grid_size, &surface_positions, &mut distances);

    if context.cancel.is_cancelled() {
        return Ok(None);
    }

    let Some(resolved_normals) =
        propagate_normals(grid_size, &surface_positions, &raw_normals, &context.cancel)
    else {
        return Ok(None);
    };
    let packed: Vec<Octahedron> = resolved_normals
        .iter()
        .map(|normal| Octahedron::encode(*normal))
        .collect();

    // Last chance to discard before the grid is published or cached
    if context.cancel.is_cancelled() {
        return Ok(None);
    }

    let grid = SdfGrid::new(
        mesh_bounds,
        voxel_size,
        max_smoothness,
        settings,
        origin,
        grid_size,
        distances,
        packed,
    )
    .map_err(VoxelizeError::Grid)?;

    info!(
        voxels = grid.len(),
        leaks = output.leak_count,
        bytes = grid.allocated_size(),
        "voxelization finished"
    );

    let grid = Arc::new(grid);
    if let Some(cache) = &context.cache {
        cache.store(&key, &grid);
    }
    Ok(Some(grid))
}
