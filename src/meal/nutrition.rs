//! Macro-nutrient totals

use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use super::recipe::Recipe;
use crate::error::Result;
use crate::usda::FoodIndex;

/// Total nutrition, in grams except calories (kcal)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Nutrition {
    pub calories: i64,
    pub protein: i64,
    pub carbohydrates: i64,
    pub fat: i64,
}

/// Share of calories coming from each macro
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
}

impl Nutrition {
    pub fn new(calories: i64, protein: i64, carbohydrates: i64, fat: i64) -> Self {
        Self {
            calories,
            protein,
            carbohydrates,
            fat,
        }
    }

    /// Macro ratios, or None when there are no calories to divide by
    pub fn ratios(&self) -> Option<MacroRatios> {
        if self.calories == 0 {
            return None;
        }
        let calories = self.calories as f64;
        Some(MacroRatios {
            protein: self.protein as f64 * 4.0 / calories,
            carbohydrates: self.carbohydrates as f64 * 4.0 / calories,
            fat: self.fat as f64 * 9.0 / calories,
        })
    }
}

impl Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbohydrates: self.carbohydrates + other.carbohydrates,
            fat: self.fat + other.fat,
        }
    }
}

impl AddAssign for Nutrition {
    fn add_assign(&mut self, other: Nutrition) {
        *self = *self + other;
    }
}

impl Sum for Nutrition {
    fn sum<I: Iterator<Item = Nutrition>>(iter: I) -> Nutrition {
        iter.fold(Nutrition::default(), Add::add)
    }
}

/// Amount of a per-100g nutrient in `grams` of food
pub fn scale_per_100g(amount_per_100g: f64, grams: f64) -> f64 {
    amount_per_100g * grams / 100.0
}

/// Nutrition of one serving of a recipe, rounded to whole units (ties to even)
///
/// Returns `Ok(None)` when any tracked food is missing one of the four
/// macros: the total is unknown, not zero.
pub fn recipe_nutrition(recipe: &Recipe, foods: &FoodIndex) -> Result<Option<Nutrition>> {
    let (mut calories, mut protein, mut carbohydrates, mut fat) = (0.0, 0.0, 0.0, 0.0);

    for ingredient in recipe.tracked_ingredients() {
        let food = foods.get(ingredient.food_id)?;
        let Some(macros) = food.macros() else {
            tracing::debug!(
                recipe = recipe.name(),
                food = %food.id,
                "Food is missing macro nutrients"
            );
            return Ok(None);
        };
        calories += scale_per_100g(macros.calories, ingredient.grams);
        protein += scale_per_100g(macros.protein, ingredient.grams);
        carbohydrates += scale_per_100g(macros.carbohydrates, ingredient.grams);
        fat += scale_per_100g(macros.fat, ingredient.grams);
    }

    Ok(Some(Nutrition {
        calories: calories.round_ties_even() as i64,
        protein: protein.round_ties_even() as i64,
        carbohydrates: carbohydrates.round_ties_even() as i64,
        fat: fat.round_ties_even() as i64,
    }))
}
