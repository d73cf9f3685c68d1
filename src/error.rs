//! Error types
//!
//! Configuration problems (bad classification tables, mixed units, unknown
//! recipes) are fatal: the data has to be fixed by hand. External service
//! failures are surfaced as-is and never retried here.

use std::fmt;

use thiserror::Error;

use crate::meal::food_group::FoodGroupTables;
use crate::meal::recipe::FoodId;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// One or more ingredients could not be mapped to a food group
    #[error("Unclassified ingredients: {}", join(.0))]
    Unclassified(Vec<UnclassifiedIngredient>),

    /// The same ingredient name appears with different units
    #[error("Ingredients with mixed units: {}", join(.0))]
    UnitMismatch(Vec<UnitConflict>),

    /// Meal plan references a recipe that is not defined
    #[error("Unknown recipe: {0}")]
    UnknownRecipe(String),

    /// A tracked food was not part of the resolved food set
    #[error("No food record for id {0}")]
    UnknownFood(FoodId),

    /// Malformed recipe definition
    #[error("Invalid recipe {recipe}: {reason}")]
    InvalidRecipe { recipe: String, reason: String },

    /// Malformed meal plan definition
    #[error("Invalid meal plan: {0}")]
    InvalidMealPlan(String),

    /// Malformed food group tables
    #[error("Invalid food group tables: {0}")]
    InvalidFoodGroups(String),

    /// A named remote resource (calendar, task list) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API answered with a non-success status
    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Food response cache failure
    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the local data files need fixing
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Unclassified(_)
                | Error::UnitMismatch(_)
                | Error::UnknownRecipe(_)
                | Error::InvalidRecipe { .. }
                | Error::InvalidMealPlan(_)
                | Error::InvalidFoodGroups(_)
        )
    }
}

/// Why an ingredient has no food group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnclassifiedReason {
    /// Not present in the override table
    MissingOverride,
    /// The nutrient database category has no mapping
    UnknownCategory(String),
}

/// An ingredient the classification tables do not cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclassifiedIngredient {
    /// Lookup key: the normalized name, the food id, or the external category
    pub key: String,
    /// Name shown on the grocery list
    pub name: String,
    pub reason: UnclassifiedReason,
}

impl fmt::Display for UnclassifiedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            UnclassifiedReason::MissingOverride if self.key == self.name => {
                write!(f, "{}", self.name)
            }
            UnclassifiedReason::MissingOverride => write!(f, "{} ({})", self.name, self.key),
            UnclassifiedReason::UnknownCategory(category) => {
                write!(f, "{} (category \"{}\")", self.name, category)
            }
        }
    }
}

/// An ingredient name used with more than one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitConflict {
    pub name: String,
    /// Distinct units in order of first appearance
    pub units: Vec<String>,
}

impl fmt::Display for UnitConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.units.join(", "))
    }
}

impl UnclassifiedIngredient {
    pub(crate) fn missing_override(key: &str, name: &str) -> Self {
        Self {
            key: FoodGroupTables::normalize_key(key),
            name: name.to_string(),
            reason: UnclassifiedReason::MissingOverride,
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
