use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{error::ApiError, ingredients::repo::Ingredient, state::AppState};

pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients))
        .route("/ingredients/:id", get(get_ingredient))
}

#[derive(Debug, Deserialize)]
pub struct IngredientFilter {
    pub name: Option<String>,
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(filter): Query<IngredientFilter>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let rows = Ingredient::list(&state.db, filter.name.as_deref()).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ingredient>, ApiError> {
    let ingredient = Ingredient::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("ingredient"))?;
    Ok(Json(ingredient))
}
