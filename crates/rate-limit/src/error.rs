//! Error types for the bucket store.

/// Errors that can occur in bucket store operations.
///
/// Rate limiting itself is not an error: an empty bucket is reported through
/// [`TokenUse::allowed`](crate::TokenUse) as an ordinary negative outcome.
#[derive(Debug, thiserror::Error)]
pub enum BucketStoreError {
    /// No bucket is registered under the given identifier.
    #[error("no bucket registered for key {key}")]
    NotFound {
        /// The identifier that was looked up.
        key: String,
    },

    /// A bucket is already registered under the given identifier.
    ///
    /// The registering caller must request a fresh identifier.
    #[error("a bucket is already registered for key {key}")]
    DuplicateKey {
        /// The identifier that collided.
        key: String,
    },

    /// Internal store failure.
    #[error("bucket store error: {0}")]
    Internal(String),
}
