//! Per-key daily quotas for the sending endpoints

use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::api_key::{key_prefix, DailyQuota, RateLimiter};

/// Count a request against `endpoint`'s quota for `key`
///
/// Requests without a key are not counted; the authorizer rejects them.
pub async fn enforce_quota(
    state: &AppState,
    endpoint: &str,
    key: Option<&str>,
    quota: &DailyQuota,
) -> Result<(), ApiError> {
    let key = match key.map(str::trim) {
        Some(key) if !key.is_empty() => key,
        _ => return Ok(()),
    };

    let bucket = RateLimiter::bucket(endpoint, key);
    let result = state.rate_limiter.check_and_record(&bucket, quota).await;

    if !result.allowed {
        warn!(
            endpoint = %endpoint,
            key_prefix = %key_prefix(key),
            limit = result.limit,
            reset_in_seconds = result.reset_in_seconds,
            "Rate limit exceeded"
        );

        return Err(ApiError::rate_limited(format!(
            "rate limit exceeded: {} per 1 day",
            result.limit
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::test_state;
    use crate::api::state::RelaySettings;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_quota_is_per_endpoint_and_key() {
        let (state, _) = test_state();
        let quota = DailyQuota::new(2);

        assert!(enforce_quota(&state, "send", Some("k1"), &quota).await.is_ok());
        assert!(enforce_quota(&state, "send", Some("k1"), &quota).await.is_ok());

        let err = enforce_quota(&state, "send", Some("k1"), &quota)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.message(), "rate limit exceeded: 2 per 1 day");

        assert!(enforce_quota(&state, "send", Some("k2"), &quota).await.is_ok());
        assert!(enforce_quota(&state, "verify", Some("k1"), &quota).await.is_ok());
    }

    #[tokio::test]
    async fn test_random_keys_do_not_grow_past_bucket_cap() {
        let (state, gateway) = test_state();
        let state = AppState::new(
            RelaySettings::new("mail.example.com").with_max_buckets(4),
            state.user_service.clone(),
            state.verification_service.clone(),
            gateway,
        );
        let quota = DailyQuota::new(1);

        for i in 0..50 {
            let key = format!("mk_unknown{}", i);
            assert!(enforce_quota(&state, "send", Some(&key), &quota).await.is_ok());
        }

        assert_eq!(state.rate_limiter.bucket_count().await, 4);
    }

    #[tokio::test]
    async fn test_missing_key_is_not_counted() {
        let (state, _) = test_state();
        let quota = DailyQuota::new(1);

        for _ in 0..3 {
            assert!(enforce_quota(&state, "send", None, &quota).await.is_ok());
            assert!(enforce_quota(&state, "send", Some(" "), &quota).await.is_ok());
        }
    }
}
