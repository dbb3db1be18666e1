use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::ApiError;

/// Catalog ingredient; (name, measurement_unit) pairs are unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    /// List ingredients, optionally narrowed by a name prefix.
    pub async fn list(db: &PgPool, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let rows = match name_prefix {
            Some(prefix) => {
                // escape LIKE metacharacters so the filter stays a literal prefix
                let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                sqlx::query_as::<_, Ingredient>(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE name ILIKE $1
                    ORDER BY name
                    "#,
                )
                .bind(format!("{escaped}%"))
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
                )
                .fetch_all(db)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Ingredient>, ApiError> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(ingredient)
    }
}
