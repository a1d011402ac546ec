//! Request authorization by API key
//!
//! The key travels in the JSON body, so authorization runs inside the
//! handlers once the body is parsed rather than as a header extractor.

use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;
use crate::domain::DomainError;
use crate::infrastructure::api_key::key_prefix;
use crate::infrastructure::user::NO_KEY;

/// Resolve the caller's key to a user
///
/// Missing and unknown keys are both `401 no key`. A store failure is a 500,
/// never reported as an authentication failure.
pub async fn authorize(state: &AppState, key: Option<&str>) -> Result<User, ApiError> {
    match state.user_service.authenticate(key).await {
        Ok(user) => Ok(user),
        Err(DomainError::Unauthenticated { .. }) => {
            warn!(
                key_prefix = %key.map(key_prefix).unwrap_or_default(),
                "Rejected request without a valid key"
            );
            Err(ApiError::unauthorized(NO_KEY))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::test_state;
    use crate::api::state::UserServiceTrait;
    use crate::domain::user::FailingUserRepository;
    use crate::infrastructure::user::UserService;
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_authorize_known_key() {
        let (state, _) = test_state();
        let (alice, _) = state.user_service.get_or_create("alice").await.unwrap();

        let user = authorize(&state, Some(alice.api_key())).await.unwrap();

        assert_eq!(user.username(), "alice");
    }

    #[tokio::test]
    async fn test_missing_and_unknown_keys_look_the_same() {
        let (state, _) = test_state();

        let missing = authorize(&state, None).await.unwrap_err();
        let empty = authorize(&state, Some("")).await.unwrap_err();
        let unknown = authorize(&state, Some("mk_nobody")).await.unwrap_err();

        for err in [missing, empty, unknown] {
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
            assert_eq!(err.message(), NO_KEY);
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let (mut state, _) = test_state();
        let failing: Arc<dyn UserServiceTrait> =
            Arc::new(UserService::new(Arc::new(FailingUserRepository)));
        state.user_service = failing;

        let err = authorize(&state, Some("mk_anything")).await.unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "internal error");
    }
}
