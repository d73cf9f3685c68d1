//! Shopping categories and the tables that map ingredients onto them

use serde::Deserialize;
use serde_yaml::Mapping;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use super::recipe::yaml_key;
use crate::error::{Error, Result};

/// Food groups used to organize the grocery list by store section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodGroup {
    Bread,
    Pantry,
    Dairy,
    Frozen,
    Produce,
    Meat,
    /// Bought at an Indian grocery
    Indian,
    /// Bought at an Asian grocery
    Asian,
}

impl FoodGroup {
    pub const ALL: [FoodGroup; 8] = [
        FoodGroup::Bread,
        FoodGroup::Pantry,
        FoodGroup::Dairy,
        FoodGroup::Frozen,
        FoodGroup::Produce,
        FoodGroup::Meat,
        FoodGroup::Indian,
        FoodGroup::Asian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodGroup::Bread => "bread",
            FoodGroup::Pantry => "pantry",
            FoodGroup::Dairy => "dairy",
            FoodGroup::Frozen => "frozen",
            FoodGroup::Produce => "produce",
            FoodGroup::Meat => "meat",
            FoodGroup::Indian => "indian",
            FoodGroup::Asian => "asian",
        }
    }

    /// Header used on the shopping list
    pub fn label(&self) -> &'static str {
        match self {
            FoodGroup::Bread => "Bread",
            FoodGroup::Pantry => "Pantry",
            FoodGroup::Dairy => "Dairy",
            FoodGroup::Frozen => "Frozen",
            FoodGroup::Produce => "Produce",
            FoodGroup::Meat => "Meat",
            FoodGroup::Indian => "Indian",
            FoodGroup::Asian => "Asian",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for FoodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BUNDLED_TABLES: &str = include_str!("../../data/food_groups.yaml");

/// Classification tables, loaded once at startup
///
/// `categories` maps the nutrient database's own category strings, matched
/// exactly. `overrides` is keyed by normalized ingredient name or by the
/// stringified food id, for foods the database leaves uncategorized.
#[derive(Debug, Clone, Default)]
pub struct FoodGroupTables {
    categories: HashMap<String, FoodGroup>,
    overrides: HashMap<String, FoodGroup>,
}

impl FoodGroupTables {
    pub fn new<C, O, K1, K2>(categories: C, overrides: O) -> Self
    where
        C: IntoIterator<Item = (K1, FoodGroup)>,
        O: IntoIterator<Item = (K2, FoodGroup)>,
        K1: Into<String>,
        K2: AsRef<str>,
    {
        Self {
            categories: categories
                .into_iter()
                .map(|(k, g)| (k.into(), g))
                .collect(),
            overrides: overrides
                .into_iter()
                .map(|(k, g)| (Self::normalize_key(k.as_ref()), g))
                .collect(),
        }
    }

    /// Read tables from a YAML file with `categories` and `overrides` mappings
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: RawTables = serde_yaml::from_str(content)?;
        let categories = read_table(raw.categories.unwrap_or_default(), "categories")?;
        let overrides = read_table(raw.overrides.unwrap_or_default(), "overrides")?;
        Ok(Self::new(categories, overrides))
    }

    /// The tables shipped with the program
    pub fn bundled() -> Result<Self> {
        Self::from_yaml_str(BUNDLED_TABLES)
    }

    /// Override keys are compared trimmed and lower-cased
    pub fn normalize_key(key: &str) -> String {
        key.trim().to_lowercase()
    }

    /// Group for a nutrient database category
    pub fn by_category(&self, category: &str) -> Option<FoodGroup> {
        self.categories.get(category).copied()
    }

    /// Group for an ingredient name or food id from the override table
    pub fn by_override(&self, key: &str) -> Option<FoodGroup> {
        self.overrides.get(&Self::normalize_key(key)).copied()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

#[derive(Debug, Deserialize)]
struct RawTables {
    #[serde(default)]
    categories: Option<Mapping>,
    #[serde(default)]
    overrides: Option<Mapping>,
}

fn read_table(mapping: Mapping, table: &str) -> Result<Vec<(String, FoodGroup)>> {
    mapping
        .into_iter()
        .map(|(key, value)| {
            let key = yaml_key(&key).ok_or_else(|| {
                Error::InvalidFoodGroups(format!("{}: key {:?} is not a scalar", table, key))
            })?;
            let group = value.as_str().and_then(FoodGroup::parse).ok_or_else(|| {
                Error::InvalidFoodGroups(format!(
                    "{}: \"{}\" maps to {:?}, expected one of {}",
                    table,
                    key,
                    value,
                    FoodGroup::ALL.map(|g| g.as_str()).join(", ")
                ))
            })?;
            Ok((key, group))
        })
        .collect()
}
