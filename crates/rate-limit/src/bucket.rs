//! The token bucket state machine.

use std::time::{Duration, SystemTime};

/// Maximum number of tokens a bucket can hold.
pub const MAX_AMOUNT: u32 = 5;

/// Time that must elapse to grant one refill.
pub const REFILL_INTERVAL: Duration = Duration::from_secs(5);

/// Tokens credited per elapsed refill interval.
pub const REFILL_AMOUNT: u32 = 1;

/// Token state for a single registered client.
///
/// Transitions are pure: [`refill`](Bucket::refill) and
/// [`reduce`](Bucket::reduce) take the bucket by value together with a
/// caller-supplied `now` and return the updated state, so the arithmetic is
/// testable with synthetic clocks. All shared mutation happens in
/// [`BucketStore`](crate::BucketStore), which persists the returned value
/// under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    value: u32,
    last_update: SystemTime,
}

impl Bucket {
    /// Creates a full bucket accounted as of `now`.
    pub fn new(now: SystemTime) -> Self {
        Self {
            value: MAX_AMOUNT,
            last_update: now,
        }
    }

    /// The current token count.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// The instant as of which the token count is accurate.
    pub fn last_update(&self) -> SystemTime {
        self.last_update
    }

    /// Credits one refill for every whole interval elapsed since the last
    /// update, saturating at [`MAX_AMOUNT`].
    ///
    /// `last_update` advances in whole multiples of [`REFILL_INTERVAL`], so a
    /// fractional remainder keeps counting toward the next refill. Calling
    /// again before a full interval has elapsed changes nothing. A `now`
    /// earlier than `last_update` (backward clock step) credits nothing and
    /// leaves the bucket untouched.
    #[must_use]
    pub fn refill(self, now: SystemTime) -> Self {
        let elapsed = now.duration_since(self.last_update).unwrap_or(Duration::ZERO);
        let refill_count = (elapsed.as_nanos() / REFILL_INTERVAL.as_nanos()) as u64;

        if refill_count == 0 {
            return self;
        }

        let credited = refill_count.saturating_mul(u64::from(REFILL_AMOUNT));
        let value = u64::from(self.value)
            .saturating_add(credited)
            .min(u64::from(MAX_AMOUNT)) as u32;

        // Advance by whole intervals only; the clamp to `now` can bite only
        // on clock anomalies, since refill_count * interval <= elapsed.
        let advance = Duration::from_secs(refill_count.saturating_mul(REFILL_INTERVAL.as_secs()));
        let last_update = self.last_update.checked_add(advance).map_or(now, |t| t.min(now));

        Self { value, last_update }
    }

    /// Refills the bucket, then tries to take one token.
    ///
    /// Returns the updated bucket and whether a token was consumed. An empty
    /// bucket refuses the request but keeps the refill bookkeeping, so the
    /// caller must persist the returned bucket either way.
    #[must_use]
    pub fn reduce(self, now: SystemTime) -> (Self, bool) {
        let bucket = self.refill(now);

        if bucket.value == 0 {
            return (bucket, false);
        }

        (
            Self {
                value: bucket.value - 1,
                ..bucket
            },
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch() -> SystemTime {
        SystemTime::UNIX_EPOCH
    }

    fn drained(now: SystemTime) -> Bucket {
        let mut bucket = Bucket::new(now);
        for _ in 0..MAX_AMOUNT {
            let (next, allowed) = bucket.reduce(now);
            assert!(allowed);
            bucket = next;
        }
        assert_eq!(bucket.value(), 0);
        bucket
    }

    #[test]
    fn new_bucket_is_full() {
        let bucket = Bucket::new(epoch());
        assert_eq!(bucket.value(), MAX_AMOUNT);
        assert_eq!(bucket.last_update(), epoch());
    }

    #[test]
    fn refill_is_noop_under_one_interval() {
        let bucket = drained(epoch());
        let refilled = bucket.refill(epoch() + Duration::from_secs(4));

        assert_eq!(refilled, bucket);
    }

    #[test]
    fn refill_twice_with_same_now_is_idempotent() {
        let bucket = drained(epoch());
        let now = epoch() + Duration::from_secs(12);

        let once = bucket.refill(now);
        let twice = once.refill(now);

        assert_eq!(once, twice);
    }

    #[test]
    fn refill_credits_whole_intervals_and_carries_the_remainder() {
        let bucket = drained(epoch());

        // 12s elapsed = two whole intervals, 2s left over.
        let refilled = bucket.refill(epoch() + Duration::from_secs(12));
        assert_eq!(refilled.value(), 2);
        assert_eq!(refilled.last_update(), epoch() + Duration::from_secs(10));

        // The carried 2s plus 3s more completes the third interval.
        let refilled = refilled.refill(epoch() + Duration::from_secs(15));
        assert_eq!(refilled.value(), 3);
        assert_eq!(refilled.last_update(), epoch() + Duration::from_secs(15));
    }

    #[test]
    fn refill_saturates_at_max_amount() {
        let now = epoch() + Duration::from_secs(100);
        let refilled = Bucket::new(epoch()).refill(now);

        assert_eq!(refilled.value(), MAX_AMOUNT);
        assert!(refilled.last_update() <= now);
    }

    #[test]
    fn refill_ignores_backward_clock_steps() {
        let start = epoch() + Duration::from_secs(60);
        let bucket = drained(start);

        let refilled = bucket.refill(epoch());
        assert_eq!(refilled, bucket);

        let (after, allowed) = bucket.reduce(epoch());
        assert!(!allowed);
        assert_eq!(after, bucket);
    }

    #[test]
    fn reduce_drains_to_zero_then_refuses() {
        let mut bucket = Bucket::new(epoch());

        for expected in (0..MAX_AMOUNT).rev() {
            let (next, allowed) = bucket.reduce(epoch());
            assert!(allowed);
            assert_eq!(next.value(), expected);
            bucket = next;
        }

        let (next, allowed) = bucket.reduce(epoch());
        assert!(!allowed);
        assert_eq!(next.value(), 0);
    }

    #[test]
    fn reduce_persists_refill_bookkeeping_when_refused() {
        let bucket = drained(epoch());

        // Not enough time for a refill: the refusal leaves the bucket as-is.
        let (next, allowed) = bucket.reduce(epoch() + Duration::from_secs(3));
        assert!(!allowed);
        assert_eq!(next, bucket);
    }

    #[test]
    fn reduce_after_twelve_seconds_grants_two_tokens_and_takes_one() {
        let bucket = drained(epoch());

        let (next, allowed) = bucket.reduce(epoch() + Duration::from_secs(12));
        assert!(allowed);
        assert_eq!(next.value(), 1);
        assert_eq!(next.last_update(), epoch() + Duration::from_secs(10));
    }

    #[test]
    fn reduce_on_a_long_idle_full_bucket_clamps_then_consumes() {
        let bucket = Bucket::new(epoch());

        let (next, allowed) = bucket.reduce(epoch() + Duration::from_secs(100));
        assert!(allowed);
        assert_eq!(next.value(), MAX_AMOUNT - 1);
    }

    #[test]
    fn value_stays_in_bounds_over_arbitrary_sequences() {
        let mut bucket = Bucket::new(epoch());
        let offsets = [0u64, 1, 3, 7, 7, 12, 13, 30, 31, 31, 45, 100, 101, 3600];

        for secs in offsets {
            let now = epoch() + Duration::from_secs(secs);
            let (next, _) = bucket.reduce(now);
            assert!(next.value() <= MAX_AMOUNT);
            assert!(next.last_update() <= now);
            bucket = next;
        }
    }
}
