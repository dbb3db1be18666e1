use uuid::Uuid;

use crate::{
    error::ApiError,
    limits,
    recipes::{
        dto::{RecipeDetails, RecipeInput},
        repo::{self, Recipe},
    },
    relations::{self, RelationKind},
    state::AppState,
    tags::repo::Tag,
    users::{dto::UserProfile, repo::User},
};

/// Validates an authoring request before any write happens. Foreign ids are
/// checked later, inside the transaction.
pub fn validate_recipe_input(input: &RecipeInput) -> Result<(), ApiError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    if name.len() > limits::MAX_LEN_RECIPE_NAME {
        return Err(ApiError::Validation("name too long".into()));
    }
    if input.text.trim().is_empty() {
        return Err(ApiError::Validation("text must not be empty".into()));
    }
    if !(limits::MIN_COOKING_TIME..=limits::MAX_COOKING_TIME).contains(&input.cooking_time) {
        return Err(ApiError::Validation(format!(
            "cooking_time must be between {} and {}",
            limits::MIN_COOKING_TIME,
            limits::MAX_COOKING_TIME
        )));
    }
    if input.ingredients.is_empty() {
        return Err(ApiError::Validation(
            "ingredients must not be empty".into(),
        ));
    }
    if input.tags.is_empty() {
        return Err(ApiError::Validation("tags must not be empty".into()));
    }
    for entry in &input.ingredients {
        if !(limits::MIN_INGREDIENT_AMOUNT..=limits::MAX_INGREDIENT_AMOUNT).contains(&entry.amount)
        {
            return Err(ApiError::Validation(format!(
                "ingredient amount must be between {} and {}",
                limits::MIN_INGREDIENT_AMOUNT,
                limits::MAX_INGREDIENT_AMOUNT
            )));
        }
    }
    Ok(())
}

/// Assembles the full projection for a recipe: resolved author, tag objects,
/// ingredient lines and the viewer's relation flags.
pub async fn recipe_details(
    state: &AppState,
    recipe: Recipe,
    viewer: Option<Uuid>,
) -> Result<RecipeDetails, ApiError> {
    let author = User::find_by_id(&state.db, recipe.author_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let is_subscribed = match viewer {
        Some(viewer_id) if viewer_id != author.id => {
            relations::exists(&state.db, RelationKind::Subscribe, viewer_id, author.id).await?
        }
        _ => false,
    };

    let tags = Tag::for_recipe(&state.db, recipe.id).await?;
    let ingredients = repo::ingredient_views(&state.db, recipe.id).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => (
            relations::exists(&state.db, RelationKind::Favorite, viewer_id, recipe.id).await?,
            relations::exists(&state.db, RelationKind::ShoppingCart, viewer_id, recipe.id)
                .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeDetails {
        id: recipe.id,
        tags,
        author: UserProfile::from_user(author, is_subscribed),
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::dto::IngredientEntry;

    fn input(amount: i32, cooking_time: i32) -> RecipeInput {
        RecipeInput {
            name: "soup".into(),
            text: "boil water, add the rest".into(),
            cooking_time,
            image: None,
            ingredients: vec![IngredientEntry {
                id: Uuid::new_v4(),
                amount,
            }],
            tags: vec![Uuid::new_v4()],
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate_recipe_input(&input(1, 30)).is_ok());
    }

    #[test]
    fn amount_below_minimum_fails() {
        let err = validate_recipe_input(&input(0, 30)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn amount_of_one_is_the_minimum() {
        assert!(validate_recipe_input(&input(1, 30)).is_ok());
        assert!(validate_recipe_input(&input(32000, 30)).is_ok());
        assert!(validate_recipe_input(&input(32001, 30)).is_err());
    }

    #[test]
    fn cooking_time_bounds() {
        assert!(validate_recipe_input(&input(1, 0)).is_err());
        assert!(validate_recipe_input(&input(1, 1)).is_ok());
        assert!(validate_recipe_input(&input(1, 32000)).is_ok());
        assert!(validate_recipe_input(&input(1, 32001)).is_err());
    }

    #[test]
    fn empty_ingredients_fail() {
        let mut bad = input(1, 30);
        bad.ingredients.clear();
        let err = validate_recipe_input(&bad).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn empty_tags_fail() {
        let mut bad = input(1, 30);
        bad.tags.clear();
        assert!(validate_recipe_input(&bad).is_err());
    }

    #[test]
    fn blank_name_fails() {
        let mut bad = input(1, 30);
        bad.name = "   ".into();
        assert!(validate_recipe_input(&bad).is_err());
    }

    #[test]
    fn overlong_name_fails() {
        let mut bad = input(1, 30);
        bad.name = "x".repeat(limits::MAX_LEN_RECIPE_NAME + 1);
        assert!(validate_recipe_input(&bad).is_err());
    }
}
