//! Trace hooks for bucket transitions.
//!
//! The store narrates every registration, refill and token decision through
//! a [`BucketObserver`]. The default [`LogObserver`] forwards the narration
//! to the `log` facade at debug level; [`NoopObserver`] silences it. Tests
//! can install a recording implementation to assert on transition order.

use crate::Bucket;

/// Observes bucket transitions inside the store.
///
/// Hooks are invoked while the store lock is held, so implementations must
/// be fast and must not call back into the store.
pub trait BucketObserver: Send + Sync {
    /// A new bucket was registered under `key`.
    fn bucket_registered(&self, key: &str, bucket: &Bucket);

    /// A bucket was credited tokens for elapsed time.
    fn bucket_refilled(&self, key: &str, before: &Bucket, after: &Bucket);

    /// A token was taken from the bucket.
    fn token_consumed(&self, key: &str, remaining: u32);

    /// A token request found the bucket empty.
    fn bucket_empty(&self, key: &str);
}

/// Observer that narrates transitions through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl BucketObserver for LogObserver {
    fn bucket_registered(&self, key: &str, bucket: &Bucket) {
        log::debug!(
            "Registered bucket for key '{key}' with {} tokens, which is the maximum",
            bucket.value()
        );
    }

    fn bucket_refilled(&self, key: &str, before: &Bucket, after: &Bucket) {
        log::debug!(
            "Refilled bucket for key '{key}' from {} to {} tokens",
            before.value(),
            after.value()
        );
    }

    fn token_consumed(&self, key: &str, remaining: u32) {
        log::debug!("Consumed a token for key '{key}', {remaining} left");
    }

    fn bucket_empty(&self, key: &str) {
        log::debug!("Bucket for key '{key}' is empty, request refused");
    }
}

/// Observer that discards all narration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BucketObserver for NoopObserver {
    fn bucket_registered(&self, _key: &str, _bucket: &Bucket) {}

    fn bucket_refilled(&self, _key: &str, _before: &Bucket, _after: &Bucket) {}

    fn token_consumed(&self, _key: &str, _remaining: u32) {}

    fn bucket_empty(&self, _key: &str) {}
}
