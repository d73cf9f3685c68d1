//! Recipes, meal plans and everything derived from them

pub mod food_group;
pub mod grocery;
pub mod nutrition;
pub mod plan;
pub mod recipe;

pub use food_group::{FoodGroup, FoodGroupTables};
pub use grocery::{aggregate, group_by_food_group, GroceryItem};
pub use nutrition::{recipe_nutrition, MacroRatios, Nutrition};
pub use plan::{DailyMealPlan, Meal, WeeklyMealPlan};
pub use recipe::{FoodId, Recipe, RecipeBook, TrackedIngredient, UntrackedIngredient};
