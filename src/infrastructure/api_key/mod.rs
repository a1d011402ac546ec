//! API key infrastructure
//!
//! Key and token generation, plus per-key daily rate limiting.

mod generator;
mod rate_limiter;

pub use generator::{constant_time_compare, key_prefix, KeyGenerator};
pub use rate_limiter::{DailyQuota, RateLimitResult, RateLimiter, DEFAULT_MAX_BUCKETS};
