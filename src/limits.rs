//! Field bounds shared by validation and the schema CHECK constraints.

pub const MAX_LEN_USER_FIELD: usize = 150;

pub const MAX_LEN_RECIPE_NAME: usize = 200;

pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
pub const MAX_INGREDIENT_AMOUNT: i32 = 32000;

pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 32000;

pub const MIN_PASSWORD_LEN: usize = 8;
