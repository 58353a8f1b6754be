//! Per-client token bucket rate limiting.
//!
//! Each client gets a continuous token bucket: tokens refill in proportion to
//! wall-clock time since the bucket was last observed, capped at capacity, and
//! every admitted request spends one token. Refill is computed lazily on access,
//! so idle clients cost nothing.
//!
//! The bucket table is sharded by client identifier (`DashMap`); the shard lock
//! guards both bucket creation and the read-modify-write of a bucket. Buckets
//! are never evicted, so the table grows with the number of distinct clients
//! seen over the process lifetime.

use std::time::Instant;

use dashmap::DashMap;

use crate::config::RateLimitConfig;

/// Per-client rate state.
#[derive(Debug, Clone, Copy)]
pub struct ClientBucket {
    tokens: f64,
    last_refill: Instant,
}

impl ClientBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();

        // Refill tokens; the timestamp moves even when the request is denied.
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently available, as of the last observation.
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// When the bucket was last observed.
    pub fn last_refill(&self) -> Instant {
        self.last_refill
    }
}

/// Process-scoped table of client buckets.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: DashMap<String, ClientBucket>,
    capacity: f64,
    refill_per_second: f64,
}

impl RateLimiter {
    pub fn new(capacity: f64, refill_per_second: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_per_second,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_per_second)
    }

    /// Spend one token for `client` if available.
    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    /// [`allow`](Self::allow) with an explicit observation time.
    pub fn allow_at(&self, client: &str, now: Instant) -> bool {
        if let Some(mut bucket) = self.buckets.get_mut(client) {
            return bucket.try_acquire(self.capacity, self.refill_per_second, now);
        }

        // First sight: `entry` holds the shard lock across insert and acquire,
        // so a racing first request for the same client sees one bucket.
        let mut bucket = self
            .buckets
            .entry(client.to_owned())
            .or_insert_with(|| ClientBucket::new(self.capacity, now));
        bucket.try_acquire(self.capacity, self.refill_per_second, now)
    }

    /// Snapshot of a client's bucket, if it has been seen.
    pub fn bucket(&self, client: &str) -> Option<ClientBucket> {
        self.buckets.get(client).map(|b| *b)
    }

    /// Number of distinct clients tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
