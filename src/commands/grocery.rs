//! Grocery command - Build the week's shopping list and push it to Google Tasks

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils;
use eating_helper::config::Settings;
use eating_helper::google::tasks::{grocery_tasks, publish_grocery_list, TaskGroup};
use eating_helper::google::{GoogleApi, GoogleTasks};
use eating_helper::meal::aggregate;

/// Execute the grocery command
pub fn execute(settings: &Settings, dry_run: bool) -> Result<()> {
    let (_, plan) = utils::load_plan(settings)?;
    let foods = utils::resolve_foods(settings, &plan)?;
    let tables = utils::load_food_groups(settings)?;

    let items = aggregate(&plan, &foods, &tables).context("Failed to build grocery list")?;
    let groups = grocery_tasks(&items);

    println!("{}", format_grocery_list(&groups));

    if dry_run {
        println!("\n{}", "(DRY-RUN) Nothing was sent to Google Tasks.".blue());
        return Ok(());
    }

    let list = settings.google.shopping_list()?;
    let api = GoogleApi::from_token_file(&settings.google_token_path())
        .context("Failed to set up Google API access")?;
    let tasks = GoogleTasks::open(&api, &list).context("Failed to open shopping list")?;

    let created = publish_grocery_list(&tasks, &groups).context("Failed to publish grocery list")?;
    println!(
        "\n{} {} tasks on the shopping list",
        "Created".green(),
        created
    );
    Ok(())
}

/// Groups with their items indented underneath
pub fn format_grocery_list(groups: &[TaskGroup]) -> String {
    let mut lines = vec![];
    for group in groups {
        lines.push(group.heading.title.bold().to_string());
        for item in &group.items {
            lines.push(format!("    {}", item.title));
        }
    }
    if lines.is_empty() {
        lines.push("Nothing to buy this week.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use eating_helper::google::NewTask;

    #[test]
    fn test_format_grocery_list() {
        let groups = vec![TaskGroup {
            heading: NewTask::new("Pantry"),
            items: vec![NewTask::new("4 g | Salt"), NewTask::new("1 cup | Rice")],
        }];
        let output = format_grocery_list(&groups);
        assert!(output.contains("Pantry"));
        assert!(output.contains("\n    4 g | Salt\n    1 cup | Rice"));
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(format_grocery_list(&[]), "Nothing to buy this week.");
    }
}
