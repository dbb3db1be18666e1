use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::{AuthUser, OptionalAuthUser},
    error::ApiError,
    recipes::{
        dto::{RecipeDetails, RecipeInput, RecipeListQuery, ShortRecipe},
        repo::{self, Recipe},
        services::{recipe_details, validate_recipe_input},
    },
    relations::{self, RelationKind},
    shopping,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", axum::routing::post(create_recipe))
        .route(
            "/recipes/:id",
            axum::routing::patch(update_recipe).delete(delete_recipe),
        )
        .route(
            "/recipes/:id/favorite",
            axum::routing::post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/:id/shopping_cart",
            axum::routing::post(add_to_cart).delete(remove_from_cart),
        )
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(q): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeDetails>>, ApiError> {
    let recipes = repo::list(
        &state.db,
        q.author,
        q.tag_slugs(),
        q.wants_favorited(),
        q.wants_in_shopping_cart(),
        viewer,
        q.limit,
        q.offset,
    )
    .await?;

    let mut details = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        details.push(recipe_details(&state, recipe, viewer).await?);
    }
    Ok(Json(details))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    Ok(Json(recipe_details(&state, recipe, viewer).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RecipeInput>,
) -> Result<(StatusCode, Json<RecipeDetails>), ApiError> {
    validate_recipe_input(&payload)?;

    let recipe = repo::create(
        &state.db,
        user_id,
        payload.name.trim(),
        &payload.text,
        payload.cooking_time,
        payload.image.as_deref(),
        &payload.ingredients,
        &payload.tags,
    )
    .await?;

    info!(recipe_id = %recipe.id, author_id = %user_id, "recipe created");
    let details = recipe_details(&state, recipe, Some(user_id)).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeInput>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    if !recipe.is_owner(user_id) {
        warn!(recipe_id = %id, %user_id, "update by non-owner rejected");
        return Err(ApiError::Forbidden);
    }

    validate_recipe_input(&payload)?;

    let updated = repo::update(
        &state.db,
        id,
        payload.name.trim(),
        &payload.text,
        payload.cooking_time,
        payload.image.as_deref(),
        &payload.ingredients,
        &payload.tags,
    )
    .await?;

    info!(recipe_id = %id, "recipe updated");
    Ok(Json(recipe_details(&state, updated, Some(user_id)).await?))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    if !recipe.is_owner(user_id) {
        warn!(recipe_id = %id, %user_id, "delete by non-owner rejected");
        return Err(ApiError::Forbidden);
    }

    repo::delete(&state.db, id).await?;
    info!(recipe_id = %id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_on(
    state: &AppState,
    kind: RelationKind,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<(StatusCode, Json<ShortRecipe>), ApiError> {
    let recipe = Recipe::find_by_id(&state.db, recipe_id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    relations::add(&state.db, kind, user_id, recipe.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ShortRecipe {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }),
    ))
}

async fn toggle_off(
    state: &AppState,
    kind: RelationKind,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<StatusCode, ApiError> {
    let recipe = Recipe::find_by_id(&state.db, recipe_id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    relations::remove(&state.db, kind, user_id, recipe.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ShortRecipe>), ApiError> {
    toggle_on(&state, RelationKind::Favorite, user_id, id).await
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    toggle_off(&state, RelationKind::Favorite, user_id, id).await
}

#[instrument(skip(state))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ShortRecipe>), ApiError> {
    toggle_on(&state, RelationKind::ShoppingCart, user_id, id).await
}

#[instrument(skip(state))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    toggle_off(&state, RelationKind::ShoppingCart, user_id, id).await
}

/// Serves the aggregated shopping list as a plain-text download.
#[instrument(skip(state))]
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<(HeaderMap, String), ApiError> {
    let text = shopping::build_shopping_list(&state.db, user_id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "text/plain; charset=utf-8".parse().expect("static header"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!(
            "attachment; filename={}",
            shopping::SHOPPING_LIST_FILENAME
        )
        .parse()
        .expect("static header"),
    );
    Ok((headers, text))
}
