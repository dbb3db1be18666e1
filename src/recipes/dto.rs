use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::tags::repo::Tag;
use crate::users::dto::UserProfile;

/// One (ingredient, amount) line of an authoring request.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientEntry {
    pub id: Uuid,
    pub amount: i32,
}

/// Body for recipe create and update. Updates replace the whole ingredient
/// list and tag set with what is sent here; there is no partial patching.
#[derive(Debug, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    #[serde(default)]
    pub image: Option<String>,
    pub ingredients: Vec<IngredientEntry>,
    pub tags: Vec<Uuid>,
}

/// Ingredient line of a recipe projection, with name and unit resolved.
#[derive(Debug, Serialize, FromRow)]
pub struct RecipeIngredientView {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe projection returned by reads and by create/update, so callers
/// never have to re-fetch.
#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe form used by favorite/cart responses and subscriptions.
#[derive(Debug, Serialize, FromRow)]
pub struct ShortRecipe {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

/// Query-string filters for the recipe listing. `tags` is a comma-separated
/// list of tag slugs. The favorited/in-cart flags only apply to authenticated
/// viewers; anonymous requests with a flag set match nothing.
#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub author: Option<Uuid>,
    pub tags: Option<String>,
    #[serde(default)]
    pub is_favorited: Option<String>,
    #[serde(default)]
    pub is_in_shopping_cart: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl RecipeListQuery {
    pub fn tag_slugs(&self) -> Option<Vec<String>> {
        self.tags.as_ref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    pub fn wants_favorited(&self) -> bool {
        flag_set(self.is_favorited.as_deref())
    }

    pub fn wants_in_shopping_cart(&self) -> bool {
        flag_set(self.is_in_shopping_cart.as_deref())
    }
}

fn flag_set(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("True"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(tags: Option<&str>, fav: Option<&str>) -> RecipeListQuery {
        RecipeListQuery {
            author: None,
            tags: tags.map(str::to_string),
            is_favorited: fav.map(str::to_string),
            is_in_shopping_cart: None,
            limit: 20,
            offset: 0,
        }
    }

    #[test]
    fn tag_slugs_split_and_trim() {
        let q = query(Some("breakfast, dinner ,,lunch"), None);
        assert_eq!(
            q.tag_slugs().unwrap(),
            vec!["breakfast", "dinner", "lunch"]
        );
    }

    #[test]
    fn absent_tags_means_no_filter() {
        assert!(query(None, None).tag_slugs().is_none());
    }

    #[test]
    fn favorited_flag_accepts_one_and_true() {
        assert!(query(None, Some("1")).wants_favorited());
        assert!(query(None, Some("true")).wants_favorited());
        assert!(!query(None, Some("0")).wants_favorited());
        assert!(!query(None, None).wants_favorited());
    }
}
