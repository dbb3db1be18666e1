use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use super::claims::{Claims, TokenKind};
use crate::state::AppState;

/// Extracts and validates JWT, returning the user ID.
pub struct AuthUser(pub Uuid);

/// Like [`AuthUser`] but never rejects: anonymous requests resolve to `None`.
/// Used by public read endpoints whose projections carry per-viewer flags.
pub struct OptionalAuthUser(pub Option<Uuid>);

fn decode_bearer(parts: &Parts, state: &AppState) -> Result<Claims, &'static str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or("missing Authorization header")?;

    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or("invalid auth scheme")?;

    let cfg = &state.config.jwt;
    let mut validation = Validation::default();
    validation.set_audience(std::slice::from_ref(&cfg.audience));
    validation.set_issuer(std::slice::from_ref(&cfg.issuer));
    let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

    let data = decode::<Claims>(token, &decoding, &validation)
        .map_err(|_| "invalid or expired token")?;

    if data.claims.kind != TokenKind::Access {
        return Err("access token required");
    }
    Ok(data.claims)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = decode_bearer(parts, state)
            .map_err(|msg| (StatusCode::UNAUTHORIZED, msg.to_string()))?;
        Ok(AuthUser(claims.sub))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(
            decode_bearer(parts, state).ok().map(|c| c.sub),
        ))
    }
}
