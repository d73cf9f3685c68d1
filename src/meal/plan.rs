//! Weekly meal plan
//!
//! The plan file maps each day to its meal slots, and each slot to the
//! recipes eaten together:
//!
//! ```yaml
//! monday:
//!   breakfast: [overnight oats]
//!   lunch: [chicken salad, pita]
//!   dinner: [eat out]
//! ```

use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::nutrition::{recipe_nutrition, Nutrition};
use super::recipe::{yaml_key, FoodId, Recipe, RecipeBook};
use crate::error::{Error, Result};
use crate::usda::FoodIndex;

pub const DAYS_PER_WEEK: usize = 7;

/// Placeholder recipe name for meals that are not cooked at home
pub const EAT_OUT: &str = "eat out";

/// Recipes eaten together
#[derive(Debug, Clone)]
pub struct Meal {
    slot: String,
    recipes: Vec<Arc<Recipe>>,
}

impl Meal {
    pub fn new(slot: impl Into<String>, recipes: Vec<Arc<Recipe>>) -> Self {
        Self {
            slot: slot.into(),
            recipes,
        }
    }

    /// Slot label from the plan file ("breakfast", "lunch", ...)
    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn recipes(&self) -> &[Arc<Recipe>] {
        &self.recipes
    }

    /// True for a meal eaten out: nothing to cook or buy
    pub fn is_eating_out(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DailyMealPlan {
    day: String,
    meals: Vec<Meal>,
}

impl DailyMealPlan {
    pub fn new(day: impl Into<String>, meals: Vec<Meal>) -> Self {
        Self {
            day: day.into(),
            meals,
        }
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn recipes(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.meals.iter().flat_map(|m| m.recipes.iter())
    }

    /// Sum of every recipe eaten this day; None if any recipe is indeterminate
    pub fn nutrition(&self, foods: &FoodIndex) -> Result<Option<Nutrition>> {
        let per_recipe = self
            .recipes()
            .map(|r| recipe_nutrition(r, foods))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_recipe.into_iter().sum())
    }
}

/// Seven days of meals. Immutable after construction.
#[derive(Debug, Clone)]
pub struct WeeklyMealPlan {
    days: Vec<DailyMealPlan>,
}

impl WeeklyMealPlan {
    pub fn new(days: Vec<DailyMealPlan>) -> Result<Self> {
        if days.len() != DAYS_PER_WEEK {
            return Err(Error::InvalidMealPlan(format!(
                "expected {} days, found {}",
                DAYS_PER_WEEK,
                days.len()
            )));
        }
        Ok(Self { days })
    }

    /// Read the plan file, resolving recipe names against `book`
    pub fn from_yaml_file<P: AsRef<Path>>(path: P, book: &RecipeBook) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content, book)
    }

    pub fn from_yaml_str(content: &str, book: &RecipeBook) -> Result<Self> {
        let raw: Option<Mapping> = serde_yaml::from_str(content)?;
        let mut days = Vec::new();

        for (day_key, slots) in raw.unwrap_or_default() {
            let day = yaml_key(&day_key).ok_or_else(|| {
                Error::InvalidMealPlan(format!("day {:?} is not a plain name", day_key))
            })?;
            let meals = match slots {
                Value::Null => Vec::new(),
                Value::Mapping(slots) => build_meals(&day, slots, book)?,
                other => {
                    return Err(Error::InvalidMealPlan(format!(
                        "{}: expected meal slots, found {:?}",
                        day, other
                    )))
                }
            };
            days.push(DailyMealPlan::new(day, meals));
        }

        Self::new(days)
    }

    pub fn days(&self) -> &[DailyMealPlan] {
        &self.days
    }

    pub fn recipes(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.days.iter().flat_map(|d| d.recipes())
    }

    /// Every distinct tracked food id in the plan, in order of first use
    pub fn food_ids(&self) -> Vec<FoodId> {
        let mut seen = HashSet::new();
        self.recipes()
            .flat_map(|r| r.food_ids())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Sum of the daily totals for the whole week
    pub fn nutrition(&self, foods: &FoodIndex) -> Result<Option<Nutrition>> {
        let per_day = self
            .days
            .iter()
            .map(|d| d.nutrition(foods))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_day.into_iter().sum())
    }
}

fn build_meals(day: &str, slots: Mapping, book: &RecipeBook) -> Result<Vec<Meal>> {
    let mut meals = Vec::new();

    for (slot_key, names) in slots {
        let slot = yaml_key(&slot_key).ok_or_else(|| {
            Error::InvalidMealPlan(format!("{}: slot {:?} is not a plain name", day, slot_key))
        })?;

        let names: Vec<String> = match names {
            Value::Null => continue,
            Value::String(name) => vec![name],
            Value::Sequence(items) => items
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        Error::InvalidMealPlan(format!(
                            "{} {}: recipe {:?} is not a name",
                            day, slot, v
                        ))
                    })
                })
                .collect::<Result<_>>()?,
            other => {
                return Err(Error::InvalidMealPlan(format!(
                    "{} {}: expected a list of recipes, found {:?}",
                    day, slot, other
                )))
            }
        };

        if names.is_empty() {
            continue;
        }

        let mut recipes = Vec::new();
        for name in &names {
            if name == EAT_OUT {
                continue;
            }
            let recipe = book
                .get(name)
                .ok_or_else(|| Error::UnknownRecipe(name.clone()))?;
            recipes.push(Arc::clone(recipe));
        }
        meals.push(Meal::new(slot, recipes));
    }

    Ok(meals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meal::recipe::TrackedIngredient;
    use crate::usda::food::{Food, Nutrient};

    const RECIPES: &str = r#"
oats:
  ingredients:
    main:
      1: 100
toast:
  ingredients:
    main:
      2: 50
      1: 20
"#;

    fn book() -> RecipeBook {
        RecipeBook::from_yaml_str(RECIPES).unwrap()
    }

    fn week(body: &str) -> String {
        let mut yaml = String::from(body);
        for day in ["tue", "wed", "thu", "fri", "sat", "sun"] {
            yaml.push_str(&format!("{}:\n  breakfast: [oats]\n", day));
        }
        yaml
    }

    fn food(id: u64, calories: f64) -> Food {
        Food::new(
            FoodId(id),
            format!("food {}", id),
            None,
            vec![
                Nutrient::new("Energy", Some(calories), "kcal"),
                Nutrient::new("Protein", Some(10.0), "g"),
                Nutrient::new("Carbohydrate, by difference", Some(20.0), "g"),
                Nutrient::new("Total lipid (fat)", Some(5.0), "g"),
            ],
        )
    }

    #[test]
    fn test_build_plan_in_file_order() {
        let yaml = week("mon:\n  breakfast: [oats, toast]\n  lunch: [toast]\n");
        let plan = WeeklyMealPlan::from_yaml_str(&yaml, &book()).unwrap();

        assert_eq!(plan.days().len(), 7);
        let monday = &plan.days()[0];
        assert_eq!(monday.day(), "mon");
        assert_eq!(monday.meals().len(), 2);
        assert_eq!(monday.meals()[0].slot(), "breakfast");
        let names: Vec<_> = monday.meals()[0].recipes().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["oats", "toast"]);
        assert_eq!(plan.days()[6].day(), "sun");
    }

    #[test]
    fn test_empty_slots_and_eating_out() {
        let yaml = week("mon:\n  breakfast:\n  lunch: []\n  dinner: [eat out]\n");
        let plan = WeeklyMealPlan::from_yaml_str(&yaml, &book()).unwrap();

        let monday = &plan.days()[0];
        assert_eq!(monday.meals().len(), 1);
        assert_eq!(monday.meals()[0].slot(), "dinner");
        assert!(monday.meals()[0].is_eating_out());
    }

    #[test]
    fn test_unknown_recipe_is_named() {
        let yaml = week("mon:\n  lunch: [lychee sorbet]\n");
        let err = WeeklyMealPlan::from_yaml_str(&yaml, &book()).unwrap_err();
        assert!(matches!(&err, Error::UnknownRecipe(name) if name == "lychee sorbet"));
    }

    #[test]
    fn test_plan_needs_seven_days() {
        let err = WeeklyMealPlan::from_yaml_str("mon:\n  lunch: [oats]\n", &book()).unwrap_err();
        assert!(err.to_string().contains("expected 7 days, found 1"));
    }

    #[test]
    fn test_food_ids_are_distinct_in_first_use_order() {
        let yaml = week("mon:\n  breakfast: [toast]\n");
        let plan = WeeklyMealPlan::from_yaml_str(&yaml, &book()).unwrap();
        assert_eq!(plan.food_ids(), vec![FoodId(2), FoodId(1)]);
    }

    #[test]
    fn test_weekly_nutrition_equals_sum_of_recipes() {
        let yaml = week("mon:\n  breakfast: [oats, toast]\n  lunch: [toast]\n");
        let plan = WeeklyMealPlan::from_yaml_str(&yaml, &book()).unwrap();
        let foods = FoodIndex::from_foods(vec![food(1, 100.0), food(2, 300.0)]);

        let weekly = plan.nutrition(&foods).unwrap().unwrap();
        let by_recipe: Nutrition = plan
            .recipes()
            .map(|r| recipe_nutrition(r, &foods).unwrap().unwrap())
            .sum();
        let by_day: Nutrition = plan
            .days()
            .iter()
            .rev()
            .map(|d| d.nutrition(&foods).unwrap().unwrap())
            .sum();

        assert_eq!(weekly, by_recipe);
        assert_eq!(weekly, by_day);
        // 7 oats (100) + 2 toasts (150 + 20)
        assert_eq!(weekly.calories, 7 * 100 + 2 * 170);
    }

    #[test]
    fn test_zero_calorie_day_does_not_break_rollup() {
        let mut days = vec![DailyMealPlan::new("mon", vec![])];
        let oats = Arc::new(Recipe::new(
            "oats",
            vec![TrackedIngredient {
                food_id: FoodId(1),
                grams: 100.0,
            }],
            vec![],
        ));
        for day in ["tue", "wed", "thu", "fri", "sat", "sun"] {
            days.push(DailyMealPlan::new(
                day,
                vec![Meal::new("breakfast", vec![Arc::clone(&oats)])],
            ));
        }
        let plan = WeeklyMealPlan::new(days).unwrap();
        let foods = FoodIndex::from_foods(vec![food(1, 100.0)]);

        let monday = plan.days()[0].nutrition(&foods).unwrap().unwrap();
        assert_eq!(monday, Nutrition::default());
        assert!(monday.ratios().is_none());
        assert_eq!(plan.nutrition(&foods).unwrap().unwrap().calories, 600);
    }

    #[test]
    fn test_demo_plan_loads() {
        let book = RecipeBook::from_yaml_str(include_str!("../../demos/recipes.yaml")).unwrap();
        let plan =
            WeeklyMealPlan::from_yaml_str(include_str!("../../demos/meal_plan.yaml"), &book)
                .unwrap();

        assert_eq!(plan.days()[0].day(), "monday");
        assert!(plan.days()[2].meals()[2].is_eating_out());
        assert_eq!(plan.days()[5].meals().len(), 1);
        assert_eq!(plan.food_ids()[0], FoodId(173904));
    }
}
