use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::{AuthUser, OptionalAuthUser},
    error::ApiError,
    recipes,
    relations::{self, RelationKind},
    state::AppState,
    users::{
        dto::{Pagination, SubscriptionEntry, UserProfile},
        repo::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/subscriptions", get(subscriptions))
        .route("/users/:id", get(get_user))
        .route(
            "/users/:id/subscribe",
            post(subscribe).delete(unsubscribe),
        )
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).delete(delete_me))
}

async fn profile_for_viewer(
    state: &AppState,
    user: User,
    viewer: Option<Uuid>,
) -> Result<UserProfile, ApiError> {
    let is_subscribed = match viewer {
        Some(viewer_id) if viewer_id != user.id => {
            relations::exists(&state.db, RelationKind::Subscribe, viewer_id, user.id).await?
        }
        _ => false,
    };
    Ok(UserProfile::from_user(user, is_subscribed))
}

async fn subscription_entry(state: &AppState, author: User) -> Result<SubscriptionEntry, ApiError> {
    let recipes = recipes::repo::short_by_author(&state.db, author.id).await?;
    let recipes_count = recipes.len() as i64;
    Ok(SubscriptionEntry {
        author: UserProfile::from_user(author, true),
        recipes,
        recipes_count,
    })
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = User::list(&state.db, p.limit, p.offset).await?;
    let mut profiles = Vec::with_capacity(users.len());
    for user in users {
        profiles.push(profile_for_viewer(&state, user, viewer).await?);
    }
    Ok(Json(profiles))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(profile_for_viewer(&state, user, viewer).await?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(UserProfile::from_user(user, false)))
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, ApiError> {
    User::delete(&state.db, user_id).await?;
    info!(%user_id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubscriptionEntry>), ApiError> {
    let author = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    relations::add(&state.db, RelationKind::Subscribe, user_id, author.id).await?;

    info!(%user_id, author_id = %author.id, "subscribed");
    Ok((
        StatusCode::CREATED,
        Json(subscription_entry(&state, author).await?),
    ))
}

#[instrument(skip(state))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let author = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    relations::remove(&state.db, RelationKind::Subscribe, user_id, author.id).await?;

    info!(%user_id, author_id = %author.id, "unsubscribed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn subscriptions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<SubscriptionEntry>>, ApiError> {
    let authors = User::subscribed_authors(&state.db, user_id, p.limit, p.offset).await?;
    let mut entries = Vec::with_capacity(authors.len());
    for author in authors {
        entries.push(subscription_entry(&state, author).await?);
    }
    Ok(Json(entries))
}
