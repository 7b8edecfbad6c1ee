//! Shim module to abstract over std and loom primitives.
//!
//! This module provides a unified interface for the counters and the shared
//! handle allocation, switching between `std` (production) and `loom`
//! (model checking) with the `loom` feature.

#[cfg(not(feature = "loom"))]
pub mod atomic {
    pub use std::sync::atomic::{AtomicU64, Ordering};
}

#[cfg(feature = "loom")]
pub mod atomic {
    pub use loom::sync::atomic::{AtomicU64, Ordering};
}

#[cfg(not(feature = "loom"))]
pub mod sync {
    pub use std::sync::Arc;

    /// Returns the inner value if `arc` is the only strong reference.
    #[inline]
    pub fn into_inner<T>(arc: Arc<T>) -> Option<T> {
        Arc::into_inner(arc)
    }
}

#[cfg(feature = "loom")]
pub mod sync {
    pub use loom::sync::Arc;

    /// Returns the inner value if `arc` is the only strong reference.
    #[inline]
    pub fn into_inner<T>(arc: Arc<T>) -> Option<T> {
        Arc::try_unwrap(arc).ok()
    }
}
