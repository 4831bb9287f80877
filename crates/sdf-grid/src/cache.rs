//! Derived-data cache of built grids.
//!
//! Voxelizing a large mesh is expensive; the cache lets a rebuild with
//! unchanged inputs skip the whole pipeline. Entries are keyed by the source
//! mesh identity plus every parameter that affects the output, and stored in
//! serialized form so that a cache hit also validates that the grid survives
//! a round trip through the on-disk format.

use std::sync::{Arc, Mutex, MutexGuard};

use hashbrown::HashMap;
use tracing::warn;

use crate::grid::SdfGrid;
use crate::settings::VoxelizationSettings;

/// Cache key for one voxelization run.
///
/// Two runs share a key exactly when they would produce the same grid: same
/// source mesh and same build parameters. The parameter block is hex-encoded
/// so the key stays printable for logs and on-disk cache layouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from the mesh identity and build parameters.
    ///
    /// `mesh_id` must change whenever the mesh geometry changes (a content
    /// hash or a revision GUID both work).
    #[must_use]
    pub fn build(
        mesh_id: &str,
        voxel_size: u32,
        max_smoothness: f32,
        settings: &VoxelizationSettings,
    ) -> Self {
        let mut blob = Vec::with_capacity(12);
        blob.extend_from_slice(&voxel_size.to_le_bytes());
        blob.extend_from_slice(&max_smoothness.to_le_bytes());
        blob.extend_from_slice(&[
            settings.sweep_axis.to_u8(),
            u8::from(settings.reverse_sweep),
            u8::from(settings.watertight),
            u8::from(settings.hide_leaks),
        ]);

        let mut key = String::with_capacity(mesh_id.len() + 1 + blob.len() * 2);
        key.push_str(mesh_id);
        key.push('_');
        for byte in blob {
            key.push_str(&format!("{byte:02x}"));
        }
        Self(key)
    }

    /// The key as a printable string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// In-memory derived-data cache mapping [`CacheKey`]s to serialized grids.
///
/// The cache is safe to share across threads behind an [`Arc`].
#[derive(Debug, Default)]
pub struct GridCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl GridCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map only means a panic elsewhere; the bytes are intact.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Look up a grid. Corrupt or outdated entries are dropped and reported
    /// as a miss.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SdfGrid>> {
        let mut entries = self.lock();
        let bytes = entries.get(key.as_str())?;
        match SdfGrid::from_bytes(bytes) {
            Ok(Some(grid)) => Some(Arc::new(grid)),
            Ok(None) => {
                entries.remove(key.as_str());
                None
            }
            Err(error) => {
                warn!(key = key.as_str(), %error, "dropping corrupt cache entry");
                entries.remove(key.as_str());
                None
            }
        }
    }

    /// Store a grid under the given key, replacing any previous entry.
    pub fn store(&self, key: &CacheKey, grid: &SdfGrid) {
        match grid.to_bytes() {
            Ok(bytes) => {
                self.lock().insert(key.as_str().to_owned(), bytes);
            }
            Err(error) => {
                warn!(key = key.as_str(), %error, "failed to serialize grid for cache");
            }
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total bytes held by cached entries.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.lock().values().map(Vec::capacity).sum()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::octahedral::Octahedron;
    use crate::size::GridSize;
    use nalgebra::{Point3, Vector3};

    fn test_grid(distance: f32) -> SdfGrid {
        SdfGrid::new(
            Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            10,
            0.0,
            VoxelizationSettings::default(),
            Vector3::zeros(),
            GridSize::new(1, 1, 1),
            vec![distance],
            vec![Octahedron::encode(Vector3::z())],
        )
        .unwrap()
    }

    #[test]
    fn key_depends_on_every_parameter() {
        let settings = VoxelizationSettings::default();
        let base = CacheKey::build("mesh-a", 10, 0.2, &settings);
        assert_ne!(base, CacheKey::build("mesh-b", 10, 0.2, &settings));
        assert_ne!(base, CacheKey::build("mesh-a", 20, 0.2, &settings));
        assert_ne!(base, CacheKey::build("mesh-a", 10, 0.3, &settings));

        let open = VoxelizationSettings {
            watertight: false,
            ..settings
        };
        assert_ne!(base, CacheKey::build("mesh-a", 10, 0.2, &open));
    }

    #[test]
    fn key_is_stable() {
        let settings = VoxelizationSettings::default();
        assert_eq!(
            CacheKey::build("mesh-a", 10, 0.2, &settings),
            CacheKey::build("mesh-a", 10, 0.2, &settings),
        );
    }

    #[test]
    fn store_and_get() {
        let cache = GridCache::new();
        let key = CacheKey::build("mesh", 10, 0.2, &VoxelizationSettings::default());
        assert!(cache.get(&key).is_none());

        let grid = test_grid(1.5);
        cache.store(&key, &grid);
        assert_eq!(cache.len(), 1);

        let hit = cache.get(&key).unwrap();
        assert_eq!(*hit, grid);
    }

    #[test]
    fn store_replaces() {
        let cache = GridCache::new();
        let key = CacheKey::build("mesh", 10, 0.2, &VoxelizationSettings::default());
        cache.store(&key, &test_grid(1.0));
        cache.store(&key, &test_grid(2.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().distance(0, 0, 0), 2.0);
    }

    #[test]
    fn clear_empties_cache() {
        let cache = GridCache::new();
        let key = CacheKey::build("mesh", 10, 0.2, &VoxelizationSettings::default());
        cache.store(&key, &test_grid(1.0));
        cache.clear();
        assert!(cache.is_empty());
    }
}
