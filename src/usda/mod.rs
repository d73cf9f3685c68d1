//! Nutrient lookups against USDA FoodData Central

pub mod cache;
pub mod client;
pub mod food;

pub use cache::{CachedSource, FoodCache};
pub use client::UsdaClient;
pub use food::{Food, FoodIndex, Nutrient};

use std::collections::HashMap;

use crate::error::Result;
use crate::meal::recipe::FoodId;

/// Anything that can produce the food record for an id
pub trait FoodSource {
    fn fetch_food(&self, id: FoodId) -> Result<Food>;
}

impl<S: FoodSource + ?Sized> FoodSource for &S {
    fn fetch_food(&self, id: FoodId) -> Result<Food> {
        (**self).fetch_food(id)
    }
}

/// Memoizing front for a [`FoodSource`]
///
/// Owned by the caller and scoped to one run, so nothing leaks between runs
/// unless the caller wires in a persistent [`FoodCache`].
pub struct NutrientResolver<S> {
    source: S,
    memo: HashMap<FoodId, Food>,
}

impl<S: FoodSource> NutrientResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            memo: HashMap::new(),
        }
    }

    /// Fetch a single food, hitting the source at most once per id
    pub fn food(&mut self, id: FoodId) -> Result<&Food> {
        if !self.memo.contains_key(&id) {
            tracing::debug!(food = %id, "Fetching food");
            let food = self.source.fetch_food(id)?;
            self.memo.insert(id, food);
        }
        Ok(&self.memo[&id])
    }

    /// Resolve every id into an index, failing on the first lookup error
    pub fn resolve<I>(&mut self, ids: I) -> Result<FoodIndex>
    where
        I: IntoIterator<Item = FoodId>,
    {
        let mut index = FoodIndex::default();
        for id in ids {
            if index.contains(id) {
                continue;
            }
            let food = self.food(id)?.clone();
            index.insert(food);
        }
        Ok(index)
    }

    /// Number of distinct foods fetched so far
    pub fn fetched(&self) -> usize {
        self.memo.len()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeFoods;
    use super::*;

    fn foods() -> FakeFoods {
        FakeFoods::new(vec![
            Food::new(FoodId(1), "Oats", Some("Cereal Grains and Pasta"), vec![]),
            Food::new(FoodId(2), "Milk", Some("Dairy and Egg Products"), vec![]),
        ])
    }

    #[test]
    fn test_resolver_fetches_each_id_once() {
        let source = foods();
        let mut resolver = NutrientResolver::new(&source);

        let index = resolver
            .resolve([FoodId(1), FoodId(2), FoodId(1)])
            .unwrap();
        assert_eq!(index.len(), 2);

        resolver.resolve([FoodId(2)]).unwrap();
        assert_eq!(resolver.fetched(), 2);
        assert_eq!(*source.lookups.borrow(), vec![FoodId(1), FoodId(2)]);
    }

    #[test]
    fn test_resolver_surfaces_source_errors() {
        let mut resolver = NutrientResolver::new(foods());
        let err = resolver.resolve([FoodId(1), FoodId(42)]).unwrap_err();
        assert!(err.to_string().contains("no food 42"));
    }
}
