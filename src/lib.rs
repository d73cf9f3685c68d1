//! eating-helper library
//!
//! Weekly meal planning from hand-written recipe and plan files: nutrition
//! totals from USDA FoodData Central, a deduplicated grocery list grouped by
//! store section, and publishing to Google Tasks and Google Calendar.

pub mod config;
pub mod error;
pub mod google;
pub mod meal;
pub mod text;
pub mod usda;

pub use error::{Error, Result};
