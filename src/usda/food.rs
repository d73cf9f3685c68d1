//! Food records as returned by FoodData Central
//!
//! Every nutrient amount is per 100g of the food. Example: 13g protein per
//! 100g of oats.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::meal::recipe::FoodId;

const ENERGY_NAMES: [&str; 2] = ["Energy", "Energy (Atwater General Factors)"];
const PROTEIN: &str = "Protein";
const CARBOHYDRATE: &str = "Carbohydrate, by difference";
const FAT: &str = "Total lipid (fat)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    /// Absent when the database lists the nutrient without a value
    pub amount: Option<f64>,
    pub unit: String,
}

impl Nutrient {
    pub fn new(name: impl Into<String>, amount: Option<f64>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    /// Display name used on the grocery list
    pub name: String,
    /// The database's own food category, if it has one
    pub category: Option<String>,
    pub nutrients: Vec<Nutrient>,
}

/// The four macros per 100g
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
}

impl Food {
    pub fn new(
        id: FoodId,
        name: impl Into<String>,
        category: Option<&str>,
        nutrients: Vec<Nutrient>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.map(str::to_string),
            nutrients,
        }
    }

    /// Category, treating an empty string as no category
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// kcal per 100g
    pub fn calories(&self) -> Option<f64> {
        self.find(|n| ENERGY_NAMES.contains(&n.name.as_str()) && n.unit == "kcal")
    }

    pub fn protein(&self) -> Option<f64> {
        self.find(|n| n.name == PROTEIN)
    }

    pub fn carbohydrates(&self) -> Option<f64> {
        self.find(|n| n.name == CARBOHYDRATE)
    }

    pub fn fat(&self) -> Option<f64> {
        self.find(|n| n.name == FAT)
    }

    /// All four macros, or None if any is missing
    pub fn macros(&self) -> Option<Macros> {
        Some(Macros {
            calories: self.calories()?,
            protein: self.protein()?,
            carbohydrates: self.carbohydrates()?,
            fat: self.fat()?,
        })
    }

    fn find(&self, pred: impl Fn(&Nutrient) -> bool) -> Option<f64> {
        self.nutrients
            .iter()
            .filter(|n| pred(n))
            .find_map(|n| n.amount)
    }
}

/// Resolved foods for one run, keyed by id
#[derive(Debug, Clone, Default)]
pub struct FoodIndex {
    foods: HashMap<FoodId, Food>,
}

impl FoodIndex {
    pub fn from_foods(foods: impl IntoIterator<Item = Food>) -> Self {
        Self {
            foods: foods.into_iter().map(|f| (f.id, f)).collect(),
        }
    }

    pub fn insert(&mut self, food: Food) {
        self.foods.insert(food.id, food);
    }

    pub fn get(&self, id: FoodId) -> Result<&Food> {
        self.foods.get(&id).ok_or(Error::UnknownFood(id))
    }

    pub fn contains(&self, id: FoodId) -> bool {
        self.foods.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}
