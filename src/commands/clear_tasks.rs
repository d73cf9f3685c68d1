//! Clear-tasks command - Empty the shopping list before a new week

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils;
use eating_helper::config::Settings;
use eating_helper::google::{GoogleApi, GoogleTasks, TaskListRef};

/// Execute the clear-tasks command
pub fn execute(settings: &Settings, yes: bool) -> Result<()> {
    let list = settings.google.shopping_list()?;

    if !yes && !utils::confirm(&format!("Delete every task on {}?", describe(&list)))? {
        println!("Aborted.");
        return Ok(());
    }

    let api = GoogleApi::from_token_file(&settings.google_token_path())
        .context("Failed to set up Google API access")?;
    let tasks = GoogleTasks::open(&api, &list).context("Failed to open shopping list")?;

    let deleted = tasks.clear().context("Failed to clear shopping list")?;
    println!("{} {} task(s)", "Deleted".green(), deleted);
    Ok(())
}

fn describe(list: &TaskListRef) -> String {
    match list {
        TaskListRef::Id(id) => format!("task list {}", id),
        TaskListRef::Title(title) => format!("\"{}\"", title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&TaskListRef::Title("Groceries".to_string())), "\"Groceries\"");
        assert_eq!(describe(&TaskListRef::Id("MTIz".to_string())), "task list MTIz");
    }
}
