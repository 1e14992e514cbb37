//! Per-client token bucket rate limiting

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::config::RateLimitConfig;
use crate::core::errors::{Result, ServiceError};

/// Bucket table size above which fully refilled buckets are dropped
const PRUNE_THRESHOLD: usize = 10_000;

/// Source of monotonic time for refill computations
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when advanced explicitly
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

/// Token bucket limiter keyed by client address
#[derive(Clone)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    clock: Arc<dyn Clock>,
    buckets: Arc<Mutex<HashMap<IpAddr, Bucket>>>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("capacity", &self.capacity)
            .field("refill_per_sec", &self.refill_per_sec)
            .finish()
    }
}

impl RateLimiter {
    /// Create a limiter allowing `capacity` requests per `period`
    pub fn new(capacity: u32, period: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = f64::from(capacity.max(1));
        let period = period.as_secs_f64().max(f64::EPSILON);
        Self {
            capacity,
            refill_per_sec: capacity / period,
            clock,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create from configuration using the system clock
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.capacity,
            Duration::from_secs(config.period_secs),
            Arc::new(SystemClock),
        )
    }

    /// Take one token for `client`, failing with `RateLimited` when the bucket is empty
    pub async fn check(&self, client: IpAddr) -> Result<()> {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().await;

        if buckets.len() > PRUNE_THRESHOLD {
            self.prune(&mut buckets, now);
        }

        let bucket = buckets.entry(client).or_insert(Bucket {
            tokens: self.capacity,
            updated: now,
        });
        self.refill(bucket, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            debug!("Rate limit: {} has {:.2} tokens left", client, bucket.tokens);
            Ok(())
        } else {
            warn!("Rate limit exceeded for {}", client);
            Err(ServiceError::RateLimited)
        }
    }

    /// Tokens currently available to `client`
    pub async fn remaining(&self, client: IpAddr) -> f64 {
        let now = self.clock.now();
        let buckets = self.buckets.lock().await;
        match buckets.get(&client) {
            Some(bucket) => {
                let mut bucket = *bucket;
                self.refill(&mut bucket, now);
                bucket.tokens
            }
            None => self.capacity,
        }
    }

    /// Number of clients with a bucket
    pub async fn tracked_clients(&self) -> usize {
        self.buckets.lock().await.len()
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        let elapsed = now.saturating_duration_since(bucket.updated).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.updated = now;
    }

    fn prune(&self, buckets: &mut HashMap<IpAddr, Bucket>, now: Instant) {
        let before = buckets.len();
        buckets.retain(|_, bucket| {
            let elapsed = now.saturating_duration_since(bucket.updated).as_secs_f64();
            bucket.tokens + elapsed * self.refill_per_sec < self.capacity
        });
        debug!("Pruned {} idle rate limit buckets", before - buckets.len());
    }
}
