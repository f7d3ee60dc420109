//! Token bucket rate limiting for Tollgate.
//!
//! This crate holds the core of the service:
//!
//! - [`Bucket`], the per-client token state and the pure refill/consume
//!   arithmetic that advances it
//! - [`BucketStore`], the mutex-guarded registry mapping client identifiers
//!   to buckets
//! - [`BucketObserver`], optional trace hooks invoked around each transition
//!
//! Bucket parameters are fixed constants; there is no per-client
//! configuration surface.

#![deny(missing_docs)]

mod bucket;
mod error;
mod observer;
mod store;

pub use bucket::{Bucket, MAX_AMOUNT, REFILL_AMOUNT, REFILL_INTERVAL};
pub use error::BucketStoreError;
pub use observer::{BucketObserver, LogObserver, NoopObserver};
pub use store::{BucketStore, TokenUse};
