//! Cooperative cancellation for long-running voxelization jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag checked between pipeline phases.
///
/// Cloning produces a handle to the same flag, so a caller can keep one
/// clone and hand another to the worker running the pipeline.
///
/// # Example
///
/// ```
/// use mesh_voxelize::CancelToken;
///
/// let token = CancelToken::new();
/// let worker_handle = token.clone();
/// assert!(!worker_handle.is_cancelled());
/// token.cancel();
/// assert!(worker_handle.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Irreversible for this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`CancelToken::cancel`] has been called on any
    /// clone of this token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
