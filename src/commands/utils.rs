//! Shared utilities for commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::{self, Write};

use eating_helper::config::Settings;
use eating_helper::error::{Error, UnclassifiedIngredient, UnclassifiedReason};
use eating_helper::meal::{FoodGroupTables, MacroRatios, Nutrition, RecipeBook, WeeklyMealPlan};
use eating_helper::usda::{
    CachedSource, FoodCache, FoodIndex, FoodSource, NutrientResolver, UsdaClient,
};

/// Load the recipes file and the meal plan built from it
pub fn load_plan(settings: &Settings) -> Result<(RecipeBook, WeeklyMealPlan)> {
    let recipes_path = settings.recipes_path();
    let book = RecipeBook::from_yaml_file(&recipes_path)
        .with_context(|| format!("Failed to load recipes: {}", recipes_path.display()))?;

    let plan_path = settings.meal_plan_path();
    let plan = WeeklyMealPlan::from_yaml_file(&plan_path, &book)
        .with_context(|| format!("Failed to load meal plan: {}", plan_path.display()))?;

    tracing::info!(recipes = book.len(), "Loaded meal plan");
    Ok((book, plan))
}

/// Configured food group tables, or the bundled ones
pub fn load_food_groups(settings: &Settings) -> Result<FoodGroupTables> {
    match settings.food_groups_path() {
        Some(path) => FoodGroupTables::from_yaml_file(&path)
            .with_context(|| format!("Failed to load food groups: {}", path.display())),
        None => FoodGroupTables::bundled().context("Bundled food group tables are invalid"),
    }
}

/// Look up every food the plan uses
pub fn resolve_foods(settings: &Settings, plan: &WeeklyMealPlan) -> Result<FoodIndex> {
    let client = UsdaClient::new(&settings.usda.base_url, settings.usda_api_key()?)?;

    let source: Box<dyn FoodSource> = match settings.usda_cache_path() {
        Some(path) => {
            let cache = FoodCache::open(&path)
                .with_context(|| format!("Failed to open food cache: {}", path.display()))?;
            Box::new(CachedSource::new(client, cache))
        }
        None => Box::new(client),
    };

    let mut resolver = NutrientResolver::new(source.as_ref());
    let foods = resolver
        .resolve(plan.food_ids())
        .context("Failed to look up foods")?;
    tracing::info!(foods = resolver.fetched(), "Resolved foods");
    Ok(foods)
}

/// Ask a yes/no question, defaulting to no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/N) ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Point at the data files when they are what needs fixing
pub fn print_hints(err: &anyhow::Error) {
    let Some(error) = err.downcast_ref::<Error>() else {
        return;
    };
    let Error::Unclassified(missing) = error else {
        if error.is_configuration() {
            eprintln!(
                "{}",
                "Fix the recipes, meal plan or food group files and run again.".yellow()
            );
        }
        return;
    };

    eprintln!("{}", "Add these to your food group tables:".yellow());
    for (table, lines) in classification_stubs(missing) {
        eprintln!("{}:", table);
        for line in lines {
            eprintln!("{}", line);
        }
    }
}

/// YAML lines for each food group table, one per lookup key
pub fn classification_stubs(
    missing: &[UnclassifiedIngredient],
) -> Vec<(&'static str, Vec<String>)> {
    let mut entries: Vec<(&'static str, &str, Vec<&str>)> = Vec::new();
    for m in missing {
        let table = if matches!(m.reason, UnclassifiedReason::UnknownCategory(_)) {
            "categories"
        } else {
            "overrides"
        };
        match entries
            .iter_mut()
            .find(|(t, key, _)| *t == table && *key == m.key.as_str())
        {
            Some((_, _, names)) => names.push(m.name.as_str()),
            None => entries.push((table, m.key.as_str(), vec![m.name.as_str()])),
        }
    }

    ["categories", "overrides"]
        .into_iter()
        .map(|table| {
            let lines: Vec<String> = entries
                .iter()
                .filter(|(t, _, _)| *t == table)
                .map(|(_, key, names)| stub_line(key, names))
                .collect();
            (table, lines)
        })
        .filter(|(_, lines)| !lines.is_empty())
        .collect()
}

fn stub_line(key: &str, names: &[&str]) -> String {
    if names.len() == 1 && names[0] == key {
        format!("  \"{}\": ", key)
    } else {
        format!("  \"{}\":   # {}", key, names.join(", "))
    }
}

/// "1850 kcal  P 120g  C 180g  F 60g"
pub fn format_nutrition(nutrition: &Nutrition) -> String {
    format!(
        "{} kcal  P {}g  C {}g  F {}g",
        nutrition.calories, nutrition.protein, nutrition.carbohydrates, nutrition.fat
    )
}

/// "30/45/25" as protein/carbohydrate/fat percentages
pub fn format_ratios(ratios: Option<MacroRatios>) -> String {
    match ratios {
        Some(r) => format!(
            "{:.0}/{:.0}/{:.0}",
            r.protein * 100.0,
            r.carbohydrates * 100.0,
            r.fat * 100.0
        ),
        None => "-".to_string(),
    }
}
