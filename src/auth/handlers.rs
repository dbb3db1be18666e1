use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, SetPasswordRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    limits,
    state::AppState,
    users::{dto::UserProfile, repo::User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/set_password", post(set_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn token_pair(state: &AppState, user: &User) -> Result<(String, String), ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access = keys.sign_access(user.id)?;
    let refresh = keys.sign_refresh(user.id)?;
    Ok((access, refresh))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    if payload.username.is_empty() || payload.username.len() > limits::MAX_LEN_USER_FIELD {
        warn!("invalid username");
        return Err(ApiError::Validation("invalid username".into()));
    }
    if payload.password.len() < limits::MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation("password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::AlreadyExists("user with this email"));
    }

    let hash = hash_password(&payload.password)?;
    // Unique constraints catch a register race on email/username; the sqlx
    // conversion reports it as AlreadyExists.
    let user = User::create(
        &state.db,
        &payload.email,
        &payload.username,
        &payload.first_name,
        &payload.last_name,
        &hash,
    )
    .await?;

    let (access_token, refresh_token) = token_pair(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: UserProfile::from_user(user, false),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Validation("invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Validation("invalid credentials".into()));
    }

    let (access_token, refresh_token) = token_pair(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: UserProfile::from_user(user, false),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::Validation("invalid refresh token".into()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let (access_token, refresh_token) = token_pair(&state, &user)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: UserProfile::from_user(user, false),
    }))
}

#[instrument(skip(state, payload))]
pub async fn set_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "set_password wrong current password");
        return Err(ApiError::Validation("wrong current password".into()));
    }
    if payload.new_password.len() < limits::MIN_PASSWORD_LEN {
        return Err(ApiError::Validation("password too short".into()));
    }

    let hash = hash_password(&payload.new_password)?;
    User::set_password_hash(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format_check() {
        assert!(is_valid_email("chef@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
