//! Error types for configuration and bucket-array growth.

use std::collections::TryReserveError;

/// Rejected construction parameters.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The table needs at least one bucket to address entries.
    #[error("bucket count must be at least 1")]
    ZeroBuckets,

    /// The growth threshold must be a finite, positive ratio.
    #[error("max load factor must be finite and positive, got {0}")]
    InvalidLoadFactor(f32),
}

/// Failure to grow the bucket array during a rehash.
///
/// When this is returned the table still holds every entry in its previous
/// bucket array; only the growth step was abandoned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GrowError {
    /// Doubling the bucket count would overflow `usize`.
    #[error("bucket count overflow when doubling {buckets} buckets")]
    CapacityOverflow {
        /// Bucket count before the attempted growth.
        buckets: usize,
    },

    /// The allocator could not provide the new bucket array.
    #[error("failed to allocate {buckets} buckets")]
    Alloc {
        /// Bucket count that was requested.
        buckets: usize,
        /// Underlying reservation failure.
        #[source]
        source: TryReserveError,
    },
}
