use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::recipes::dto::{IngredientEntry, RecipeIngredientView, ShortRecipe};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

const RECIPE_COLUMNS: &str = "id, author_id, name, text, cooking_time, image, created_at";

impl Recipe {
    /// Ownership hook: only the author may mutate a recipe.
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Recipe>, ApiError> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(recipe)
    }
}

/// Recipe listing with optional filters. A NULL bind skips its clause; the
/// favorited/in-cart flags compare against the viewer, so an anonymous viewer
/// with a flag set matches no rows.
pub async fn list(
    db: &PgPool,
    author: Option<Uuid>,
    tag_slugs: Option<Vec<String>>,
    only_favorited: bool,
    only_in_cart: bool,
    viewer: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Recipe>, ApiError> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT r.id, r.author_id, r.name, r.text, r.cooking_time, r.image, r.created_at
        FROM recipes r
        WHERE ($1::uuid IS NULL OR r.author_id = $1)
          AND ($2::text[] IS NULL OR EXISTS (
                SELECT 1 FROM recipe_tags rt
                JOIN tags t ON t.id = rt.tag_id
                WHERE rt.recipe_id = r.id AND t.slug = ANY($2)))
          AND (NOT $3 OR EXISTS (
                SELECT 1 FROM favorites f
                WHERE f.recipe_id = r.id AND f.user_id = $4))
          AND (NOT $5 OR EXISTS (
                SELECT 1 FROM shopping_carts sc
                WHERE sc.recipe_id = r.id AND sc.user_id = $4))
        ORDER BY r.created_at DESC
        LIMIT $6 OFFSET $7
        "#,
    )
    .bind(author)
    .bind(tag_slugs)
    .bind(only_favorited)
    .bind(viewer)
    .bind(only_in_cart)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Creates the recipe row together with its ingredient list and tag set in
/// one transaction; nothing is observable unless all three commit.
pub async fn create(
    db: &PgPool,
    author_id: Uuid,
    name: &str,
    text: &str,
    cooking_time: i32,
    image: Option<&str>,
    ingredients: &[IngredientEntry],
    tags: &[Uuid],
) -> Result<Recipe, ApiError> {
    let mut tx = db.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        r#"
        INSERT INTO recipes (author_id, name, text, cooking_time, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {RECIPE_COLUMNS}
        "#
    ))
    .bind(author_id)
    .bind(name)
    .bind(text)
    .bind(cooking_time)
    .bind(image)
    .fetch_one(&mut *tx)
    .await?;

    insert_ingredients(&mut tx, recipe.id, ingredients).await?;
    insert_tags(&mut tx, recipe.id, tags).await?;

    tx.commit().await?;
    Ok(recipe)
}

/// Updates the recipe row and replaces the entire ingredient list and tag set
/// wholesale, in one transaction. Replace-all is the documented policy: no
/// incremental patching of ingredient rows.
pub async fn update(
    db: &PgPool,
    recipe_id: Uuid,
    name: &str,
    text: &str,
    cooking_time: i32,
    image: Option<&str>,
    ingredients: &[IngredientEntry],
    tags: &[Uuid],
) -> Result<Recipe, ApiError> {
    let mut tx = db.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        r#"
        UPDATE recipes
        SET name = $2, text = $3, cooking_time = $4, image = $5
        WHERE id = $1
        RETURNING {RECIPE_COLUMNS}
        "#
    ))
    .bind(recipe_id)
    .bind(name)
    .bind(text)
    .bind(cooking_time)
    .bind(image)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("recipe"))?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

    insert_ingredients(&mut tx, recipe_id, ingredients).await?;
    insert_tags(&mut tx, recipe_id, tags).await?;

    tx.commit().await?;
    Ok(recipe)
}

pub async fn delete(db: &PgPool, recipe_id: Uuid) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("recipe"));
    }
    Ok(())
}

pub async fn short_by_author(db: &PgPool, author_id: Uuid) -> Result<Vec<ShortRecipe>, ApiError> {
    let rows = sqlx::query_as::<_, ShortRecipe>(
        r#"
        SELECT id, name, image, cooking_time
        FROM recipes
        WHERE author_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(author_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn ingredient_views(
    db: &PgPool,
    recipe_id: Uuid,
) -> Result<Vec<RecipeIngredientView>, ApiError> {
    let rows = sqlx::query_as::<_, RecipeIngredientView>(
        r#"
        SELECT ri.ingredient_id AS id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY i.name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Bulk-inserts the ingredient lines. Unknown ingredient ids fail validation
/// before anything is written; duplicate lines are legal and inserted as-is.
async fn insert_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    entries: &[IngredientEntry],
) -> Result<(), ApiError> {
    let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
    let amounts: Vec<i32> = entries.iter().map(|e| e.amount).collect();

    let distinct: HashSet<Uuid> = ids.iter().copied().collect();
    let known: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT id) FROM ingredients WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_one(&mut **tx)
            .await?;
    if known != distinct.len() as i64 {
        return Err(ApiError::Validation("unknown ingredient id".into()));
    }

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, entry.ingredient_id, entry.amount
        FROM UNNEST($2::uuid[], $3::int4[]) AS entry(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(&ids)
    .bind(&amounts)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_tags(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    tags: &[Uuid],
) -> Result<(), ApiError> {
    let distinct: HashSet<Uuid> = tags.iter().copied().collect();
    let known: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT id) FROM tags WHERE id = ANY($1)")
        .bind(tags)
        .fetch_one(&mut **tx)
        .await?;
    if known != distinct.len() as i64 {
        return Err(ApiError::Validation("unknown tag id".into()));
    }

    // a duplicated tag id in the request collapses into one association
    sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, tag_id FROM UNNEST($2::uuid[]) AS entry(tag_id)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(tags)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
