//! Input mesh representation.

use nalgebra::{Point3, Vector3};

/// An indexed triangle mesh to voxelize.
///
/// Vertices are in world units; indices form counter-clockwise triangles in
/// groups of three. Per-vertex normals are optional; when absent they are
/// derived from face geometry before voxelization.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex positions in world units.
    pub vertices: Vec<Point3<f32>>,
    /// Triangle vertex indices, three per triangle.
    pub indices: Vec<u32>,
    /// Optional per-vertex normals, parallel to `vertices`.
    pub vertex_normals: Option<Vec<Vector3<f32>>>,
}

impl MeshData {
    /// Create a mesh without per-vertex normals.
    #[must_use]
    pub fn new(vertices: Vec<Point3<f32>>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            vertex_normals: None,
        }
    }

    /// Create a mesh with explicit per-vertex normals.
    #[must_use]
    pub fn with_normals(
        vertices: Vec<Point3<f32>>,
        indices: Vec<u32>,
        vertex_normals: Vec<Vector3<f32>>,
    ) -> Self {
        Self {
            vertices,
            indices,
            vertex_normals: Some(vertex_normals),
        }
    }

    /// Returns `true` if the mesh has no vertices or no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.len() < 3
    }

    /// Number of whole triangles in the index buffer.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Area-weighted per-vertex normals derived from face geometry.
    ///
    /// Each face's cross product (which scales with its area) is accumulated
    /// onto its three vertices, then normalized. Vertices touched by no
    /// non-degenerate face fall back to +Z. Out-of-range indices are skipped.
    #[must_use]
    pub fn compute_vertex_normals(&self) -> Vec<Vector3<f32>> {
        let mut accumulated = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let (ia, ib, ic) = (
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            );
            let (Some(a), Some(b), Some(c)) = (
                self.vertices.get(ia),
                self.vertices.get(ib),
                self.vertices.get(ic),
            ) else {
                continue;
            };

            let face_normal = (b - a).cross(&(c - a));
            accumulated[ia] += face_normal;
            accumulated[ib] += face_normal;
            accumulated[ic] += face_normal;
        }

        accumulated
            .into_iter()
            .map(|normal| normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z))
            .collect()
    }
}
