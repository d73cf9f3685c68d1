//! Grocery list aggregation
//!
//! Walks every recipe of the week, puts each ingredient into a food group,
//! and merges repeated ingredients into a single line with the summed amount.

use std::collections::HashMap;

use super::food_group::{FoodGroup, FoodGroupTables};
use super::plan::WeeklyMealPlan;
use super::recipe::UntrackedIngredient;
use crate::error::{Error, Result, UnclassifiedIngredient, UnclassifiedReason, UnitConflict};
use crate::usda::{Food, FoodIndex};

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq)]
pub struct GroceryItem {
    pub ingredient: UntrackedIngredient,
    pub group: FoodGroup,
}

/// Build the deduplicated grocery list for a week
///
/// Every tracked food id in the plan must be present in `foods`. Items come
/// back in order of first appearance, one per distinct ingredient name.
/// Fails without partial output if any ingredient has no food group, or if
/// one name is used with more than one unit.
pub fn aggregate(
    plan: &WeeklyMealPlan,
    foods: &FoodIndex,
    tables: &FoodGroupTables,
) -> Result<Vec<GroceryItem>> {
    let mut items = Vec::new();
    let mut unclassified = Vec::new();

    for recipe in plan.recipes() {
        for ingredient in recipe.untracked_ingredients() {
            match tables.by_override(&ingredient.name) {
                Some(group) => items.push(GroceryItem {
                    ingredient: ingredient.clone(),
                    group,
                }),
                None => note_unclassified(
                    &mut unclassified,
                    UnclassifiedIngredient::missing_override(&ingredient.name, &ingredient.name),
                ),
            }
        }

        for tracked in recipe.tracked_ingredients() {
            let food = foods.get(tracked.food_id)?;
            match classify_food(food, tables) {
                Ok(group) => items.push(GroceryItem {
                    ingredient: UntrackedIngredient::from_tracked(tracked, &food.name),
                    group,
                }),
                Err(missing) => note_unclassified(&mut unclassified, missing),
            }
        }
    }

    if !unclassified.is_empty() {
        return Err(Error::Unclassified(unclassified));
    }

    merge(items)
}

/// Food group of a tracked food: its database category first, else the
/// override table keyed by its id
pub fn classify_food(
    food: &Food,
    tables: &FoodGroupTables,
) -> std::result::Result<FoodGroup, UnclassifiedIngredient> {
    match food.category() {
        Some(category) => tables.by_category(category).ok_or_else(|| UnclassifiedIngredient {
            key: category.to_string(),
            name: food.name.clone(),
            reason: UnclassifiedReason::UnknownCategory(category.to_string()),
        }),
        None => {
            let key = food.id.to_string();
            tables
                .by_override(&key)
                .ok_or_else(|| UnclassifiedIngredient::missing_override(&key, &food.name))
        }
    }
}

/// Foods sharing one unmapped category are each kept, so every name is reported
fn note_unclassified(seen: &mut Vec<UnclassifiedIngredient>, missing: UnclassifiedIngredient) {
    if !seen.iter().any(|s| s.key == missing.key && s.name == missing.name) {
        seen.push(missing);
    }
}

/// Sum amounts per ingredient name, keeping unit and group of the first
/// occurrence
fn merge(items: Vec<GroceryItem>) -> Result<Vec<GroceryItem>> {
    let mut merged: Vec<GroceryItem> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut conflicts: Vec<UnitConflict> = Vec::new();

    for item in items {
        let Some(&index) = position.get(&item.ingredient.name) else {
            position.insert(item.ingredient.name.clone(), merged.len());
            merged.push(item);
            continue;
        };

        let first = &mut merged[index];
        if first.ingredient.unit == item.ingredient.unit {
            first.ingredient.amount += item.ingredient.amount;
            continue;
        }

        match conflicts.iter_mut().find(|c| c.name == item.ingredient.name) {
            Some(conflict) => {
                if !conflict.units.contains(&item.ingredient.unit) {
                    conflict.units.push(item.ingredient.unit);
                }
            }
            None => conflicts.push(UnitConflict {
                name: item.ingredient.name,
                units: vec![first.ingredient.unit.clone(), item.ingredient.unit],
            }),
        }
    }

    if !conflicts.is_empty() {
        return Err(Error::UnitMismatch(conflicts));
    }

    Ok(merged)
}

/// Items bucketed by food group, groups in order of first appearance
pub fn group_by_food_group(items: &[GroceryItem]) -> Vec<(FoodGroup, Vec<&GroceryItem>)> {
    let mut groups: Vec<(FoodGroup, Vec<&GroceryItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(group, _)| *group == item.group) {
            Some((_, members)) => members.push(item),
            None => groups.push((item.group, vec![item])),
        }
    }
    groups
}
