//! Registration, login/logout, password reset and profile endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront_core::credentials::{hash_password, issue_token, token_digest, verify_password};
use storefront_core::domain::session::{PasswordReset, Session};
use storefront_core::domain::user::{
    validate_email, validate_password, validate_username, User, UserId, UserProfile,
};
use storefront_core::errors::DomainError;

use super::auth::{authorize_user, bearer_token};
use super::errors::ApiError;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    pub username_or_email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// The reset token is returned directly instead of being mailed.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

fn invalid_credentials() -> ApiError {
    DomainError::Unauthorized("invalid credentials".to_string()).into()
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let username = body.username.trim().to_string();
    let email = body.email.trim().to_string();
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&body.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(DomainError::Conflict("email already exists".to_string()).into());
    }
    if state.users.find_by_username(&username).await?.is_some() {
        return Err(DomainError::Conflict("username already exists".to_string()).into());
    }

    let password = SecretString::from(body.password);
    let user = User {
        id: UserId::generate(),
        username,
        email,
        password_hash: hash_password(&password)?,
        created_at: Utc::now(),
    };
    state.users.insert(user.clone()).await?;

    info!(event_name = "users.registered", user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.profile())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identifier = body.username_or_email.trim();
    let user = if identifier.contains('@') {
        state.users.find_by_email(identifier).await?
    } else {
        state.users.find_by_username(identifier).await?
    };
    let Some(user) = user else {
        return Err(invalid_credentials());
    };

    let password = SecretString::from(body.password);
    if !verify_password(&password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let now = Utc::now();
    let purged = state.sessions.purge_expired(now).await?;

    let issued = issue_token();
    let expires_at = state.session_policy.session_expiry(now, body.remember_me);
    state
        .sessions
        .create(Session {
            token_digest: issued.digest,
            user_id: user.id.clone(),
            created_at: now,
            expires_at,
        })
        .await?;

    info!(
        event_name = "users.login.succeeded",
        user_id = %user.id,
        remember_me = body.remember_me,
        purged_sessions = purged,
        "session issued"
    );

    Ok(Json(LoginResponse {
        token: issued.token.expose_secret().to_string(),
        token_type: "bearer".to_string(),
        expires_at,
        expires_in: state.session_policy.session_ttl(body.remember_me).num_seconds(),
        user: user.profile(),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| DomainError::Unauthorized("authorization header required".to_string()))?;
    state.sessions.delete(&token_digest(token)).await?;

    Ok(Json(MessageResponse { message: "Logged out successfully".to_string() }))
}

/// Unknown emails get the same message and no token.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let message = "If the email is registered, a reset token has been issued.".to_string();

    let Some(user) = state.users.find_by_email(body.email.trim()).await? else {
        return Ok(Json(ForgotPasswordResponse { message, reset_token: None, expires_at: None }));
    };

    let issued = issue_token();
    let expires_at = state.session_policy.reset_expiry(Utc::now());
    state
        .sessions
        .create_reset(PasswordReset {
            token_digest: issued.digest,
            user_id: user.id.clone(),
            expires_at,
        })
        .await?;

    info!(event_name = "users.password_reset.issued", user_id = %user.id, "reset token issued");
    Ok(Json(ForgotPasswordResponse {
        message,
        reset_token: Some(issued.token.expose_secret().to_string()),
        expires_at: Some(expires_at),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&body.new_password)?;
    let invalid_token = || DomainError::Validation("invalid or expired reset token".to_string());

    let grant = state.sessions.take_reset(&token_digest(body.token.trim())).await?;
    let grant = grant.filter(|grant| !grant.is_expired(Utc::now())).ok_or_else(invalid_token)?;

    let mut user = state.users.find_by_id(&grant.user_id).await?.ok_or_else(invalid_token)?;
    user.password_hash = hash_password(&SecretString::from(body.new_password))?;
    state.users.update(user.clone()).await?;
    let revoked = state.sessions.delete_for_user(&user.id).await?;

    info!(
        event_name = "users.password_reset.completed",
        user_id = %user.id,
        revoked_sessions = revoked,
        "password reset"
    );
    Ok(Json(MessageResponse { message: "Password has been reset".to_string() }))
}

pub async fn get_profile(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = UserId(user_id);
    authorize_user(&state, &headers, &user_id).await?;

    let user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("user", user_id.as_str()))?;
    Ok(Json(user.profile()))
}

pub async fn update_profile(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = UserId(user_id);
    authorize_user(&state, &headers, &user_id).await?;

    let mut user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("user", user_id.as_str()))?;

    if let Some(username) = body.username {
        let username = username.trim().to_string();
        validate_username(&username)?;
        user.username = username;
    }
    if let Some(email) = body.email {
        let email = email.trim().to_string();
        validate_email(&email)?;
        user.email = email;
    }

    state.users.update(user.clone()).await?;
    Ok(Json(user.profile()))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
        Json,
    };

    use super::{
        forgot_password, get_profile, login, logout, register, reset_password, update_profile,
        ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
        UpdateProfileRequest,
    };
    use crate::api::test_support::memory_state;
    use crate::api::AppState;

    async fn register_alice(state: &AppState) -> String {
        let (status, Json(profile)) = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "correct horse".to_string(),
            }),
        )
        .await
        .expect("register");
        assert_eq!(status, StatusCode::CREATED);
        profile.user_id.0
    }

    async fn login_as(state: &AppState, who: &str, password: &str) -> Result<String, StatusCode> {
        login(
            State(state.clone()),
            Json(LoginRequest {
                username_or_email: who.to_string(),
                password: password.to_string(),
                remember_me: false,
            }),
        )
        .await
        .map(|Json(response)| response.token)
        .map_err(|error| error.status())
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );
        headers
    }

    #[tokio::test]
    async fn duplicate_email_or_username_conflicts() {
        let state = memory_state();
        register_alice(&state).await;

        let clash = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "alice2".to_string(),
                email: "ALICE@example.com".to_string(),
                password: "another secret".to_string(),
            }),
        )
        .await
        .expect_err("email clash");
        assert_eq!(clash.status(), StatusCode::CONFLICT);

        let clash = register(
            State(state),
            Json(RegisterRequest {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password: "another secret".to_string(),
            }),
        )
        .await
        .expect_err("username clash");
        assert_eq!(clash.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let error = register(
            State(memory_state()),
            Json(RegisterRequest {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "short".to_string(),
            }),
        )
        .await
        .expect_err("short password");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_by_email_or_username_and_logout() {
        let state = memory_state();
        let user_id = register_alice(&state).await;

        let wrong = login_as(&state, "alice", "wrong password").await;
        assert_eq!(wrong, Err(StatusCode::UNAUTHORIZED));
        let unknown = login_as(&state, "nobody", "correct horse").await;
        assert_eq!(unknown, Err(StatusCode::UNAUTHORIZED));

        let token = login_as(&state, "Alice@Example.com", "correct horse").await.expect("login");
        let Json(profile) =
            get_profile(Path(user_id.clone()), State(state.clone()), bearer(&token))
                .await
                .expect("profile");
        assert_eq!(profile.username, "alice");

        let _message = logout(State(state.clone()), bearer(&token)).await.expect("logout");
        let after = get_profile(Path(user_id), State(state), bearer(&token))
            .await
            .expect_err("logged out");
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_without_token_is_unauthorized() {
        let error = logout(State(memory_state()), HeaderMap::new()).await.expect_err("no token");
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reset_token_is_single_use_and_revokes_sessions() {
        let state = memory_state();
        let user_id = register_alice(&state).await;
        let old_token = login_as(&state, "alice", "correct horse").await.expect("login");

        let Json(issued) = forgot_password(
            State(state.clone()),
            Json(ForgotPasswordRequest { email: "alice@example.com".to_string() }),
        )
        .await
        .expect("forgot");
        let reset_token = issued.reset_token.expect("reset token");

        let _message = reset_password(
            State(state.clone()),
            Json(ResetPasswordRequest {
                token: reset_token.clone(),
                new_password: "battery staple".to_string(),
            }),
        )
        .await
        .expect("reset");

        let reused = reset_password(
            State(state.clone()),
            Json(ResetPasswordRequest {
                token: reset_token,
                new_password: "third password".to_string(),
            }),
        )
        .await
        .expect_err("reuse");
        assert_eq!(reused.status(), StatusCode::BAD_REQUEST);

        let revoked = get_profile(Path(user_id), State(state.clone()), bearer(&old_token))
            .await
            .expect_err("old session revoked");
        assert_eq!(revoked.status(), StatusCode::UNAUTHORIZED);

        let stale = login_as(&state, "alice", "correct horse").await;
        assert_eq!(stale, Err(StatusCode::UNAUTHORIZED));
        assert!(login_as(&state, "alice", "battery staple").await.is_ok());
    }

    #[tokio::test]
    async fn forgot_password_for_unknown_email_reveals_nothing() {
        let Json(response) = forgot_password(
            State(memory_state()),
            Json(ForgotPasswordRequest { email: "ghost@example.com".to_string() }),
        )
        .await
        .expect("forgot");
        assert!(response.reset_token.is_none());
    }

    #[tokio::test]
    async fn profile_updates_enforce_uniqueness_and_ownership() {
        let state = memory_state();
        let user_id = register_alice(&state).await;
        let (status, _bob) = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "bobs password".to_string(),
            }),
        )
        .await
        .expect("register bob");
        assert_eq!(status, StatusCode::CREATED);
        let token = login_as(&state, "alice", "correct horse").await.expect("login");

        let Json(updated) = update_profile(
            Path(user_id.clone()),
            State(state.clone()),
            bearer(&token),
            Json(UpdateProfileRequest { username: Some("alice.w".to_string()), email: None }),
        )
        .await
        .expect("update");
        assert_eq!(updated.username, "alice.w");

        let clash = update_profile(
            Path(user_id),
            State(state.clone()),
            bearer(&token),
            Json(UpdateProfileRequest {
                username: None,
                email: Some("bob@example.com".to_string()),
            }),
        )
        .await
        .expect_err("email taken");
        assert_eq!(clash.status(), StatusCode::CONFLICT);

        let bob = state.users.find_by_username("bob").await.expect("find").expect("bob");
        let foreign = get_profile(Path(bob.id.0), State(state), bearer(&token))
            .await
            .expect_err("other user's profile");
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
    }
}
