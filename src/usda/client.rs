//! Blocking FoodData Central client
//!
//! The `foods` batch endpoint only returns abridged records without the food
//! category, so each food is fetched individually from `food/{id}`.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::food::{Food, Nutrient};
use super::FoodSource;
use crate::error::{Error, Result};
use crate::meal::recipe::FoodId;
use crate::text::sentence_case;

pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1/";

const SERVICE: &str = "FoodData Central";

pub struct UsdaClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl UsdaClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends in '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("eating-helper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn food_url(&self, id: FoodId) -> Result<Url> {
        let mut url = self.base_url.join(&format!("food/{}", id))?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }
}

impl FoodSource for UsdaClient {
    fn fetch_food(&self, id: FoodId) -> Result<Food> {
        let url = self.food_url(id)?;
        tracing::debug!(food = %id, "GET food/{}", id);

        let response = self.http.get(url).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::Api {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        parse_food(id, &body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodResponse {
    description: String,
    #[serde(default)]
    food_category: Option<FoodCategory>,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrientEntry>,
}

#[derive(Debug, Deserialize)]
struct FoodCategory {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrientEntry {
    nutrient: NutrientInfo,
    #[serde(default)]
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NutrientInfo {
    name: String,
    unit_name: String,
}

/// Convert a `food/{id}` response body into a [`Food`]
pub fn parse_food(id: FoodId, body: &str) -> Result<Food> {
    let response: FoodResponse = serde_json::from_str(body)?;

    let nutrients = response
        .food_nutrients
        .into_iter()
        .map(|entry| Nutrient::new(entry.nutrient.name, entry.amount, entry.nutrient.unit_name))
        .collect();

    Ok(Food {
        id,
        name: sentence_case(&response.description),
        category: response.food_category.and_then(|c| c.description),
        nutrients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MILK: &str = r#"{
        "fdcId": 746782,
        "description": "MILK, WHOLE, 3.25% MILKFAT",
        "foodCategory": { "id": 1, "code": "0100", "description": "Dairy and Egg Products" },
        "foodNutrients": [
            { "nutrient": { "id": 1003, "name": "Protein", "unitName": "g" }, "amount": 3.27 },
            { "nutrient": { "id": 1008, "name": "Energy", "unitName": "kcal" }, "amount": 61 },
            { "nutrient": { "id": 1004, "name": "Total lipid (fat)", "unitName": "g" } }
        ]
    }"#;

    #[test]
    fn test_parse_food() {
        let food = parse_food(FoodId(746782), MILK).unwrap();
        assert_eq!(food.name, "Milk, whole, 3.25% milkfat");
        assert_eq!(food.category(), Some("Dairy and Egg Products"));
        assert_eq!(food.protein(), Some(3.27));
        assert_eq!(food.calories(), Some(61.0));
        assert_eq!(food.fat(), None);
    }

    #[test]
    fn test_parse_food_without_category() {
        let body = r#"{ "description": "Sambal oelek", "foodNutrients": [] }"#;
        let food = parse_food(FoodId(2345725), body).unwrap();
        assert_eq!(food.category, None);
        assert!(food.nutrients.is_empty());
    }

    #[test]
    fn test_food_url() {
        let client = UsdaClient::new("https://api.nal.usda.gov/fdc/v1", "DEMO_KEY").unwrap();
        let url = client.food_url(FoodId(123)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.nal.usda.gov/fdc/v1/food/123?api_key=DEMO_KEY"
        );
    }
}
