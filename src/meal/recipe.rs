//! Recipe definitions and the recipes file loader
//!
//! The recipes file is a YAML mapping keyed by recipe name:
//!
//! ```yaml
//! overnight oats:
//!   ingredients:
//!     main:            # tracked: food id -> grams
//!       173904: 80
//!     for_taste:       # untracked: name -> "<amount> <unit>"
//!       salt: 2 g
//! ```

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Identifier of a food in the external nutrient database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(pub u64);

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ingredient whose nutrition is counted
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedIngredient {
    pub food_id: FoodId,
    pub grams: f64,
}

/// A flavor ingredient with negligible nutrition, identified by name only
#[derive(Debug, Clone, PartialEq)]
pub struct UntrackedIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

impl UntrackedIngredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }

    /// Re-express a tracked ingredient under its display name, in grams
    pub fn from_tracked(tracked: &TrackedIngredient, name: &str) -> Self {
        Self::new(name, tracked.grams, "g")
    }
}

/// A named recipe. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    name: String,
    tracked: Vec<TrackedIngredient>,
    untracked: Vec<UntrackedIngredient>,
}

impl Recipe {
    pub fn new(
        name: impl Into<String>,
        tracked: Vec<TrackedIngredient>,
        untracked: Vec<UntrackedIngredient>,
    ) -> Self {
        Self {
            name: name.into(),
            tracked,
            untracked,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracked_ingredients(&self) -> &[TrackedIngredient] {
        &self.tracked
    }

    pub fn untracked_ingredients(&self) -> &[UntrackedIngredient] {
        &self.untracked
    }

    /// Food ids of the tracked ingredients, in recipe order
    pub fn food_ids(&self) -> impl Iterator<Item = FoodId> + '_ {
        self.tracked.iter().map(|t| t.food_id)
    }
}

/// All recipes from the recipes file, in file order
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: Vec<Arc<Recipe>>,
    by_name: HashMap<String, usize>,
}

impl RecipeBook {
    pub fn new(recipes: Vec<Recipe>) -> Result<Self> {
        let mut book = Self::default();
        for recipe in recipes {
            if book.by_name.contains_key(recipe.name()) {
                return Err(Error::InvalidRecipe {
                    recipe: recipe.name().to_string(),
                    reason: "defined more than once".to_string(),
                });
            }
            book.by_name.insert(recipe.name().to_string(), book.recipes.len());
            book.recipes.push(Arc::new(recipe));
        }
        Ok(book)
    }

    /// Read recipes from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: Option<Mapping> = serde_yaml::from_str(content)?;
        let mut recipes = Vec::new();

        for (key, value) in raw.unwrap_or_default() {
            let name = yaml_key(&key).ok_or_else(|| Error::InvalidRecipe {
                recipe: format!("{:?}", key),
                reason: "recipe name must be a string".to_string(),
            })?;
            let raw_recipe: RawRecipe =
                serde_yaml::from_value(value).map_err(|e| Error::InvalidRecipe {
                    recipe: name.clone(),
                    reason: e.to_string(),
                })?;
            recipes.push(raw_recipe.into_recipe(name)?);
        }

        Self::new(recipes)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Recipe>> {
        self.by_name.get(name).map(|&i| &self.recipes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    ingredients: RawIngredients,
}

#[derive(Debug, Deserialize)]
struct RawIngredients {
    #[serde(default)]
    main: Option<Mapping>,
    #[serde(default)]
    for_taste: Option<Mapping>,
}

impl RawRecipe {
    fn into_recipe(self, name: String) -> Result<Recipe> {
        let invalid = |reason: String| Error::InvalidRecipe {
            recipe: name.clone(),
            reason,
        };

        let mut tracked = Vec::new();
        for (key, value) in self.ingredients.main.unwrap_or_default() {
            let food_id = match &key {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
            .ok_or_else(|| invalid(format!("tracked ingredient key {:?} is not a food id", key)))?;
            let grams = value
                .as_f64()
                .filter(|g| g.is_finite() && *g >= 0.0)
                .ok_or_else(|| invalid(format!("food {} needs a gram amount", food_id)))?;
            tracked.push(TrackedIngredient {
                food_id: FoodId(food_id),
                grams,
            });
        }

        let mut untracked = Vec::new();
        for (key, value) in self.ingredients.for_taste.unwrap_or_default() {
            let ingredient = yaml_key(&key)
                .ok_or_else(|| invalid(format!("ingredient name {:?} is not a string", key)))?;
            let quantity = value.as_str().ok_or_else(|| {
                invalid(format!("{} must be written as \"<amount> <unit>\"", ingredient))
            })?;
            let (amount, unit) = parse_quantity(quantity).ok_or_else(|| {
                invalid(format!(
                    "{}: cannot read quantity \"{}\" (expected \"<amount> <unit>\")",
                    ingredient, quantity
                ))
            })?;
            untracked.push(UntrackedIngredient::new(ingredient, amount, unit));
        }

        Ok(Recipe::new(name, tracked, untracked))
    }
}

/// Split "2 g" or "0.5 cup" into amount and unit; negative amounts are rejected
fn parse_quantity(s: &str) -> Option<(f64, String)> {
    let mut parts = s.split_whitespace();
    let amount: f64 = parts.next()?.parse().ok()?;
    let unit = parts.collect::<Vec<_>>().join(" ");
    if unit.is_empty() || !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Some((amount, unit))
}

/// Mapping keys may be written as plain scalars of any type
pub(crate) fn yaml_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPES: &str = r#"
overnight oats:
  ingredients:
    main:
      173904: 80
      171287: 150
    for_taste:
      salt: 2 g
      cinnamon: 0.5 tsp
chicken salad:
  ingredients:
    main:
      "2099245": 200
    for_taste:
"#;

    #[test]
    fn test_load_recipes_in_file_order() {
        let book = RecipeBook::from_yaml_str(RECIPES).unwrap();
        let names: Vec<_> = book.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["overnight oats", "chicken salad"]);
    }

    #[test]
    fn test_tracked_and_untracked_ingredients() {
        let book = RecipeBook::from_yaml_str(RECIPES).unwrap();
        let oats = book.get("overnight oats").unwrap();

        assert_eq!(
            oats.tracked_ingredients(),
            &[
                TrackedIngredient {
                    food_id: FoodId(173904),
                    grams: 80.0
                },
                TrackedIngredient {
                    food_id: FoodId(171287),
                    grams: 150.0
                },
            ]
        );
        assert_eq!(
            oats.untracked_ingredients(),
            &[
                UntrackedIngredient::new("salt", 2.0, "g"),
                UntrackedIngredient::new("cinnamon", 0.5, "tsp"),
            ]
        );
    }

    #[test]
    fn test_null_for_taste_and_string_food_id() {
        let book = RecipeBook::from_yaml_str(RECIPES).unwrap();
        let salad = book.get("chicken salad").unwrap();
        assert!(salad.untracked_ingredients().is_empty());
        assert_eq!(salad.food_ids().collect::<Vec<_>>(), vec![FoodId(2099245)]);
    }

    #[test]
    fn test_quantity_without_unit_is_rejected() {
        let yaml = r#"
toast:
  ingredients:
    for_taste:
      butter: "5"
"#;
        let err = RecipeBook::from_yaml_str(yaml).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("toast"));
        assert!(message.contains("butter"));
    }

    #[test]
    fn test_duplicate_recipe_names_rejected() {
        let recipe = || Recipe::new("toast", vec![], vec![]);
        let err = RecipeBook::new(vec![recipe(), recipe()]).unwrap_err();
        assert!(matches!(err, Error::InvalidRecipe { .. }));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("2 g"), Some((2.0, "g".to_string())));
        assert_eq!(
            parse_quantity("1 large clove"),
            Some((1.0, "large clove".to_string()))
        );
        assert_eq!(parse_quantity("a pinch"), None);
        assert_eq!(parse_quantity("3"), None);
        assert_eq!(parse_quantity("-2 g"), None);
        assert_eq!(parse_quantity("0 g"), Some((0.0, "g".to_string())));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let untracked = "soup:\n  ingredients:\n    for_taste:\n      salt: -2 g\n";
        let err = RecipeBook::from_yaml_str(untracked).unwrap_err();
        assert!(err.to_string().contains("salt"));

        let tracked = "soup:\n  ingredients:\n    main:\n      173904: -80\n";
        assert!(RecipeBook::from_yaml_str(tracked).is_err());
    }

    #[test]
    fn test_from_tracked_uses_grams() {
        let tracked = TrackedIngredient {
            food_id: FoodId(123),
            grams: 100.0,
        };
        let untracked = UntrackedIngredient::from_tracked(&tracked, "Milk");
        assert_eq!(untracked, UntrackedIngredient::new("Milk", 100.0, "g"));
    }
}
