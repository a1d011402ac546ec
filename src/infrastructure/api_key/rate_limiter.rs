//! Rate limiter implementation
//!
//! Provides sliding window daily quotas keyed by API key and endpoint.
//! Counts live in process memory and are not shared between replicas. The
//! number of buckets is capped; once full, the least recently used bucket is
//! evicted and its count is forgotten.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

const DAY: Duration = Duration::from_secs(86400);

/// Default cap on tracked buckets
pub const DEFAULT_MAX_BUCKETS: usize = 100_000;

/// Fixed number of requests allowed per window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyQuota {
    pub requests_per_day: u32,
}

impl DailyQuota {
    pub fn new(requests_per_day: u32) -> Self {
        Self { requests_per_day }
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Total limit for the window
    pub limit: u32,
    /// Time until the oldest request leaves the window (in seconds)
    pub reset_in_seconds: u64,
}

/// Rate limiter for API keys
#[derive(Debug)]
pub struct RateLimiter {
    /// Per-bucket request timestamps
    records: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    /// Window length
    window: Duration,
    /// Maximum number of tracked buckets
    max_buckets: usize,
    /// Cleanup interval
    cleanup_interval: Duration,
    /// Last cleanup time
    last_cleanup: Arc<RwLock<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with a 24 hour window
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            window: DAY,
            max_buckets: DEFAULT_MAX_BUCKETS,
            cleanup_interval: Duration::from_secs(300), // 5 minutes
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    /// Override the bucket cap
    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = max_buckets.max(1);
        self
    }

    /// Bucket name for an endpoint and API key
    pub fn bucket(endpoint: &str, key: &str) -> String {
        format!("{}:{}", endpoint, key)
    }

    /// Check and record in one operation
    pub async fn check_and_record(&self, bucket: &str, quota: &DailyQuota) -> RateLimitResult {
        self.maybe_cleanup().await;

        let now = Instant::now();
        let mut records = self.records.write().await;

        let result = self.calculate(records.get(bucket), quota, now);

        if result.allowed {
            if !records.contains_key(bucket) && records.len() >= self.max_buckets {
                self.make_room(&mut records, now);
            }
            records.entry(bucket.to_string()).or_default().push(now);
        }

        result
    }

    #[cfg(test)]
    pub(crate) async fn bucket_count(&self) -> usize {
        self.records.read().await.len()
    }

    fn make_room(&self, records: &mut HashMap<String, Vec<Instant>>, now: Instant) {
        let cutoff = now.checked_sub(self.window).unwrap_or(now);
        records.retain(|_, v| v.iter().any(|t| *t > cutoff));

        while records.len() >= self.max_buckets {
            let oldest = records
                .iter()
                .min_by_key(|(_, v)| v.last().copied())
                .map(|(k, _)| k.clone());

            match oldest {
                Some(bucket) => {
                    records.remove(&bucket);
                }
                None => break,
            }
        }
    }

    fn calculate(
        &self,
        records: Option<&Vec<Instant>>,
        quota: &DailyQuota,
        now: Instant,
    ) -> RateLimitResult {
        let window_secs = self.window.as_secs().max(1);
        let window_start = now.checked_sub(self.window).unwrap_or(now);

        let in_window: Vec<Instant> = records
            .map(|r| r.iter().copied().filter(|t| *t > window_start).collect())
            .unwrap_or_default();

        let count = in_window.len() as u32;

        if count >= quota.requests_per_day {
            let reset_in = in_window
                .iter()
                .min()
                .map(|t| window_secs.saturating_sub(now.duration_since(*t).as_secs()))
                .unwrap_or(window_secs);

            return RateLimitResult {
                allowed: false,
                remaining: 0,
                limit: quota.requests_per_day,
                reset_in_seconds: reset_in,
            };
        }

        RateLimitResult {
            allowed: true,
            remaining: quota.requests_per_day.saturating_sub(count + 1),
            limit: quota.requests_per_day,
            reset_in_seconds: window_secs,
        }
    }

    async fn maybe_cleanup(&self) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= self.cleanup_interval
        };

        if should_cleanup {
            let mut last = self.last_cleanup.write().await;
            *last = Instant::now();

            let now = Instant::now();
            let cutoff = now.checked_sub(self.window).unwrap_or(now);

            let mut records = self.records.write().await;

            for bucket in records.values_mut() {
                bucket.retain(|t| *t > cutoff);
            }

            records.retain(|_, v| !v.is_empty());
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
