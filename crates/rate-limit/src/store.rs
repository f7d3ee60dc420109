//! Serialized registry of client buckets.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::Bucket;
use crate::error::BucketStoreError;
use crate::observer::{BucketObserver, LogObserver};

/// Outcome of a token-use request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUse {
    /// Whether a token was consumed.
    pub allowed: bool,
    /// Tokens left in the bucket after the request.
    pub remaining: u32,
}

/// Registry mapping client identifiers to their buckets.
///
/// Every lookup-compute-write-back sequence runs under a single mutex, so
/// concurrent requests never interleave and no update is lost, regardless of
/// how many distinct identifiers are involved. Lock hold time is bounded:
/// the bucket arithmetic is pure and allocation-free, and observers are
/// required to be fast.
///
/// The store owns all buckets for the lifetime of the process; callers only
/// ever receive copies.
pub struct BucketStore {
    buckets: Mutex<HashMap<String, Bucket>>,
    observer: Box<dyn BucketObserver>,
}

impl BucketStore {
    /// Creates an empty store narrating transitions through [`LogObserver`].
    pub fn new() -> Self {
        Self::with_observer(Box::new(LogObserver))
    }

    /// Creates an empty store with a custom transition observer.
    pub fn with_observer(observer: Box<dyn BucketObserver>) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            observer,
        }
    }

    /// Registers a full bucket under `key`, accounted as of `now`.
    ///
    /// Fails with [`BucketStoreError::DuplicateKey`] when the key is already
    /// registered: silently overwriting on an identifier collision would
    /// destroy the existing client's accounting, so the caller is asked to
    /// request a fresh identifier instead.
    ///
    /// Returns a copy of the inserted bucket.
    pub fn register(&self, key: &str, now: SystemTime) -> Result<Bucket, BucketStoreError> {
        let mut buckets = self.lock()?;

        if buckets.contains_key(key) {
            return Err(BucketStoreError::DuplicateKey { key: key.to_owned() });
        }

        let bucket = Bucket::new(now);
        buckets.insert(key.to_owned(), bucket);
        self.observer.bucket_registered(key, &bucket);

        Ok(bucket)
    }

    /// Atomically applies refill-then-consume-one to the bucket under `key`.
    ///
    /// The updated bucket is written back even when the request is refused,
    /// so refill bookkeeping survives refusals. Fails with
    /// [`BucketStoreError::NotFound`] when the key is absent, leaving the
    /// store unchanged.
    pub fn consume_token(&self, key: &str, now: SystemTime) -> Result<TokenUse, BucketStoreError> {
        let mut buckets = self.lock()?;

        let Some(slot) = buckets.get_mut(key) else {
            return Err(BucketStoreError::NotFound { key: key.to_owned() });
        };

        let current = *slot;

        // Refill separately first so observers see the credit; the refill
        // inside reduce is then a no-op by idempotence.
        let refilled = current.refill(now);
        if refilled != current {
            self.observer.bucket_refilled(key, &current, &refilled);
        }

        let (next, allowed) = refilled.reduce(now);
        *slot = next;

        if allowed {
            self.observer.token_consumed(key, next.value());
        } else {
            self.observer.bucket_empty(key);
        }

        Ok(TokenUse {
            allowed,
            remaining: next.value(),
        })
    }

    /// Number of registered buckets.
    pub fn len(&self) -> usize {
        self.lock().map(|buckets| buckets.len()).unwrap_or(0)
    }

    /// Whether the store has no registered buckets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Bucket>>, BucketStoreError> {
        self.buckets
            .lock()
            .map_err(|_| BucketStoreError::Internal("bucket store lock poisoned".to_owned()))
    }
}

impl Default for BucketStore {
    fn default() -> Self {
        Self::new()
    }
}
