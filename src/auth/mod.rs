use crate::state::AppState;
use axum::Router;

pub(crate) mod claims;
mod dto;
pub mod handlers;
pub(crate) mod extractors;
pub(crate) mod jwt;
pub(crate) mod password;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
