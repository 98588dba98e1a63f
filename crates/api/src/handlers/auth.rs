//! Handlers for the `/auth` resource: registration, login, token refresh,
//! logout, the current user, and the password reset flow.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use closet_core::error::CoreError;
use closet_core::roles::ROLE_CUSTOMER;
use closet_core::validation::validate_request;
use closet_core::types::DbId;
use closet_db::models::password_reset::CreatePasswordReset;
use closet_db::models::session::CreateSession;
use closet_db::models::user::{CreateUser, User, UserResponse};
use closet_db::repositories::{PasswordResetRepo, SessionRepo, UserRepo};
use closet_db::DbPool;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::reset::{generate_reset_token, hash_reset_token, RESET_TOKEN_TTL_MINS};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 32, message = "is not a valid reset token"))]
    pub token: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// Same answer whether or not the email belongs to an account.
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_request(&input)?;
    let email = normalize_email(&input.email);

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email,
            password_hash,
            role: ROLE_CUSTOMER.to_string(),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    let response = create_auth_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = user.id, "Failed login attempt");
        return Err(invalid());
    }

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a live refresh token for a new pair. The old session is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// `{"user": {...}}` for a valid token, `{"user": null}` otherwise.
pub async fn me(
    State(state): State<AppState>,
    MaybeAuthUser(auth_user): MaybeAuthUser,
) -> AppResult<Json<Value>> {
    let user = match auth_user {
        Some(auth) => UserRepo::find_by_id(&state.pool, auth.user_id).await?,
        None => None,
    };
    Ok(Json(json!({ "user": user.as_ref().map(UserResponse::from) })))
}

/// POST /api/v1/auth/forgot-password
///
/// Issues a one-hour reset token for a known email. Mail delivery is out of
/// process, so the link is written to the log. The response never reveals
/// whether the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(input): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<Value>> {
    validate_request(&input)?;
    let email = normalize_email(&input.email);

    match UserRepo::find_by_email(&state.pool, &email).await? {
        Some(user) => {
            let token = issue_password_reset(&state.pool, user.id).await?;
            tracing::info!(
                user_id = user.id,
                reset_link = %state.config.password_reset_url(&token),
                "Password reset link issued"
            );
        }
        None => tracing::info!("Password reset requested for unknown email"),
    }

    Ok(Json(json!({ "message": FORGOT_PASSWORD_MESSAGE })))
}

/// POST /api/v1/auth/reset-password
///
/// Redeems a reset token, sets the new password and signs the user out of
/// every existing session.
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(input): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<Value>> {
    validate_request(&input)?;
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let reset = PasswordResetRepo::redeem(&mut tx, &hash_reset_token(&input.token))
        .await?
        .ok_or_else(|| CoreError::Validation("Invalid or expired reset token".into()))?;
    UserRepo::update_password(&mut tx, reset.user_id, &password_hash).await?;
    tx.commit().await?;

    let revoked = SessionRepo::revoke_all_for_user(&state.pool, reset.user_id).await?;
    tracing::info!(user_id = reset.user_id, revoked, "Password reset");

    Ok(Json(json!({ "message": "Password reset successful" })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Store a fresh reset token for `user_id` and return its plaintext.
///
/// Any token still open for the user stops working.
pub async fn issue_password_reset(pool: &DbPool, user_id: DbId) -> AppResult<String> {
    let (token, token_hash) = generate_reset_token();
    let expires_at = Utc::now() + chrono::Duration::minutes(RESET_TOKEN_TTL_MINS);

    let mut tx = pool.begin().await?;
    PasswordResetRepo::replace(
        &mut tx,
        &CreatePasswordReset {
            user_id,
            token_hash,
            expires_at,
        },
    )
    .await?;
    tx.commit().await?;
    Ok(token)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issue tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(user),
    })
}
