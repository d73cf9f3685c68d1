//! Stats command - Show nutrition for the week's recipes and days

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::collections::HashSet;

use super::utils;
use eating_helper::config::Settings;
use eating_helper::meal::{recipe_nutrition, MacroRatios, Nutrition, WeeklyMealPlan};
use eating_helper::usda::FoodIndex;

/// Nutrition per recipe, per day and for the week
///
/// `None` marks a total that cannot be computed because a food is missing
/// nutrient data.
#[derive(Debug, Default)]
pub struct NutritionReport {
    pub recipes: Vec<(String, Option<Nutrition>)>,
    pub days: Vec<(String, Option<Nutrition>)>,
    pub week: Option<Nutrition>,
}

/// One named total with its macro ratios, as written to JSON
#[derive(Debug, Serialize)]
struct NutritionRow<'a> {
    name: &'a str,
    nutrition: Option<Nutrition>,
    ratios: Option<MacroRatios>,
}

impl<'a> NutritionRow<'a> {
    fn new(name: &'a str, nutrition: Option<Nutrition>) -> Self {
        Self {
            name,
            nutrition,
            ratios: nutrition.and_then(|n| n.ratios()),
        }
    }
}

/// Execute the stats command
pub fn execute(settings: &Settings, json: bool) -> Result<()> {
    let (_, plan) = utils::load_plan(settings)?;
    let foods = utils::resolve_foods(settings, &plan)?;

    let report = build_report(&plan, &foods)?;
    if json {
        println!("{}", format_json(&report)?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}

/// Compute nutrition for every distinct recipe in the plan, in order of first use
pub fn build_report(plan: &WeeklyMealPlan, foods: &FoodIndex) -> Result<NutritionReport> {
    let mut seen = HashSet::new();
    let mut recipes = Vec::new();
    for recipe in plan.recipes() {
        if seen.insert(recipe.name()) {
            recipes.push((recipe.name().to_string(), recipe_nutrition(recipe, foods)?));
        }
    }

    let days = plan
        .days()
        .iter()
        .map(|d| Ok((d.day().to_string(), d.nutrition(foods)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(NutritionReport {
        recipes,
        days,
        week: plan.nutrition(foods)?,
    })
}

/// Format the report as tables
pub fn format_report(report: &NutritionReport) -> String {
    let mut output = String::new();

    output.push_str(&nutrition_table("Recipe", &report.recipes).to_string());
    output.push_str("\n\n");
    output.push_str(&nutrition_table("Day", &report.days).to_string());
    output.push_str("\n\n");

    match &report.week {
        Some(week) => output.push_str(&format!(
            "Weekly total: {} ({} P/C/F %)",
            utils::format_nutrition(week),
            utils::format_ratios(week.ratios())
        )),
        None => output.push_str("Weekly total: unknown (some foods lack nutrient data)"),
    }

    let unknown: Vec<_> = report
        .recipes
        .iter()
        .filter(|(_, n)| n.is_none())
        .map(|(name, _)| name.as_str())
        .collect();
    if !unknown.is_empty() {
        output.push_str(&format!("\nMissing nutrient data: {}", unknown.join(", ")));
    }

    output
}

/// The report as JSON; unknown totals are `null`
pub fn format_json(report: &NutritionReport) -> Result<String> {
    let value = serde_json::json!({
        "recipes": rows(&report.recipes),
        "days": rows(&report.days),
        "week": {
            "nutrition": report.week,
            "ratios": report.week.and_then(|w| w.ratios()),
        },
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn rows(entries: &[(String, Option<Nutrition>)]) -> Vec<NutritionRow<'_>> {
    entries
        .iter()
        .map(|(name, nutrition)| NutritionRow::new(name, *nutrition))
        .collect()
}

fn nutrition_table(label: &str, rows: &[(String, Option<Nutrition>)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new(label),
        Cell::new("kcal"),
        Cell::new("Protein"),
        Cell::new("Carbs"),
        Cell::new("Fat"),
        Cell::new("P/C/F %"),
    ]);

    for (name, nutrition) in rows {
        let row = match nutrition {
            Some(n) => vec![
                Cell::new(name),
                Cell::new(n.calories),
                Cell::new(format!("{}g", n.protein)),
                Cell::new(format!("{}g", n.carbohydrates)),
                Cell::new(format!("{}g", n.fat)),
                Cell::new(utils::format_ratios(n.ratios())),
            ],
            None => vec![
                Cell::new(name),
                Cell::new("?"),
                Cell::new("?"),
                Cell::new("?"),
                Cell::new("?"),
                Cell::new("-"),
            ],
        };
        table.add_row(row);
    }

    table
}
