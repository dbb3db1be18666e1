use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::ApiError;

/// Admin-seeded recipe tag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
}

impl Tag {
    pub async fn list(db: &PgPool) -> Result<Vec<Tag>, ApiError> {
        let rows =
            sqlx::query_as::<_, Tag>("SELECT id, name, slug, color FROM tags ORDER BY name")
                .fetch_all(db)
                .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Tag>, ApiError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug, color FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(tag)
    }

    pub async fn for_recipe(db: &PgPool, recipe_id: Uuid) -> Result<Vec<Tag>, ApiError> {
        let rows = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.slug, t.color
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
