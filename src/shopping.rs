//! Consolidated shopping list for everything in a user's cart.

use std::collections::BTreeMap;

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::ApiError;

pub const SHOPPING_LIST_HEADER: &str = "Shopping list:";
pub const SHOPPING_LIST_FILENAME: &str = "shopping-list.txt";

/// One RecipeIngredient row from a cart recipe, with the ingredient resolved.
#[derive(Debug, Clone, FromRow)]
pub struct CartEntry {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

async fn cart_entries(db: &PgPool, user_id: Uuid) -> Result<Vec<CartEntry>, ApiError> {
    let rows = sqlx::query_as::<_, CartEntry>(
        r#"
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_carts sc
        JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Sums amounts grouped by (name, measurement_unit). The same ingredient in
/// several cart recipes, or listed twice within one recipe, collapses into a
/// single total. BTreeMap keys keep the output ordered by name, then unit.
pub fn sum_cart(entries: &[CartEntry]) -> BTreeMap<(String, String), i64> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals
            .entry((entry.name.clone(), entry.measurement_unit.clone()))
            .or_insert(0i64) += entry.amount as i64;
    }
    totals
}

pub fn render_shopping_list(totals: &BTreeMap<(String, String), i64>) -> String {
    let mut out = String::from(SHOPPING_LIST_HEADER);
    out.push('\n');
    for ((name, unit), amount) in totals {
        out.push_str(&format!("{} - {} {}\n", name, amount, unit));
    }
    out
}

/// Read-only aggregation; repeated calls observe the same cart state.
pub async fn build_shopping_list(db: &PgPool, user_id: Uuid) -> Result<String, ApiError> {
    let entries = cart_entries(db, user_id).await?;
    Ok(render_shopping_list(&sum_cart(&entries)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, unit: &str, amount: i32) -> CartEntry {
        CartEntry {
            name: name.into(),
            measurement_unit: unit.into(),
            amount,
        }
    }

    #[test]
    fn sums_the_same_ingredient_across_recipes() {
        // Salt from two different cart recipes
        let entries = vec![entry("Salt", "g", 100), entry("Salt", "g", 50)];
        let totals = sum_cart(&entries);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&("Salt".to_string(), "g".to_string())], 150);
    }

    #[test]
    fn duplicate_lines_within_one_recipe_also_sum() {
        let entries = vec![
            entry("Flour", "g", 200),
            entry("Flour", "g", 300),
            entry("Flour", "g", 500),
        ];
        let totals = sum_cart(&entries);
        assert_eq!(totals[&("Flour".to_string(), "g".to_string())], 1000);
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let entries = vec![entry("Milk", "ml", 250), entry("Milk", "l", 1)];
        let totals = sum_cart(&entries);
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn rendering_is_ordered_by_name() {
        let entries = vec![
            entry("Sugar", "g", 20),
            entry("Butter", "g", 50),
            entry("Salt", "g", 5),
        ];
        let text = render_shopping_list(&sum_cart(&entries));
        assert_eq!(
            text,
            "Shopping list:\nButter - 50 g\nSalt - 5 g\nSugar - 20 g\n"
        );
    }

    #[test]
    fn expected_line_format() {
        let entries = vec![entry("Salt", "g", 100), entry("Salt", "g", 50)];
        let text = render_shopping_list(&sum_cart(&entries));
        assert!(text.contains("Salt - 150 g"));
        // one line, not two
        assert_eq!(text.matches("Salt").count(), 1);
    }

    #[test]
    fn empty_cart_renders_header_only() {
        let text = render_shopping_list(&sum_cart(&[]));
        assert_eq!(text, "Shopping list:\n");
    }

    #[test]
    fn totals_do_not_overflow_i32() {
        let entries = vec![entry("Rice", "g", 32000), entry("Rice", "g", 32000)];
        let totals = sum_cart(&entries);
        assert_eq!(totals[&("Rice".to_string(), "g".to_string())], 64000);
    }
}
