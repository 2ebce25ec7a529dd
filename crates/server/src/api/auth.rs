//! Bearer-session checks for user-scoped routes.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;

use storefront_core::credentials::token_digest;
use storefront_core::domain::session::Session;
use storefront_core::domain::user::UserId;
use storefront_core::errors::DomainError;

use super::errors::ApiError;
use super::AppState;

/// Token from `Authorization: Bearer <token>`. A bare token without the scheme is accepted too.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim_start().strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| DomainError::Unauthorized("authorization header required".to_string()))?;

    let session = state
        .sessions
        .find(&token_digest(token))
        .await?
        .ok_or_else(|| DomainError::Unauthorized("invalid or expired token".to_string()))?;

    if session.is_expired(Utc::now()) {
        state.sessions.delete(&session.token_digest).await?;
        return Err(DomainError::Unauthorized("invalid or expired token".to_string()).into());
    }

    Ok(session)
}

/// A valid session that belongs to `user_id`.
pub async fn authorize_user(
    state: &AppState,
    headers: &HeaderMap,
    user_id: &UserId,
) -> Result<Session, ApiError> {
    let session = current_session(state, headers).await?;
    if &session.user_id != user_id {
        return Err(DomainError::Forbidden(format!(
            "token does not grant access to user `{user_id}`"
        ))
        .into());
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode};
    use chrono::{Duration, Utc};
    use secrecy::ExposeSecret;

    use storefront_core::credentials::issue_token;
    use storefront_core::domain::session::Session;
    use storefront_core::domain::user::UserId;

    use super::{authorize_user, bearer_token};
    use crate::api::test_support::memory_state;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn session_must_match_path_user() {
        let state = memory_state();
        let issued = issue_token();
        let now = Utc::now();
        state
            .sessions
            .create(Session {
                token_digest: issued.digest.clone(),
                user_id: UserId::from("u-1"),
                created_at: now,
                expires_at: now + Duration::hours(1),
            })
            .await
            .expect("create session");
        let headers = headers(&format!("Bearer {}", issued.token.expose_secret()));

        assert!(authorize_user(&state, &headers, &UserId::from("u-1")).await.is_ok());
        let denied = authorize_user(&state, &headers, &UserId::from("u-2"))
            .await
            .expect_err("other user");
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected_and_removed() {
        let state = memory_state();
        let issued = issue_token();
        let now = Utc::now();
        state
            .sessions
            .create(Session {
                token_digest: issued.digest.clone(),
                user_id: UserId::from("u-1"),
                created_at: now - Duration::hours(2),
                expires_at: now - Duration::hours(1),
            })
            .await
            .expect("create session");
        let headers = headers(&format!("Bearer {}", issued.token.expose_secret()));

        let error =
            authorize_user(&state, &headers, &UserId::from("u-1")).await.expect_err("expired");
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
        assert!(state.sessions.find(&issued.digest).await.expect("find").is_none());
    }
}
