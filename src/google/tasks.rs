//! Grocery list publishing to a task list

use serde::{Deserialize, Serialize};

use super::GoogleApi;
use crate::error::{Error, Result};
use crate::meal::grocery::{group_by_food_group, GroceryItem};
use crate::text::{capitalize, format_amount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: None,
        }
    }
}

/// Somewhere tasks can be written to
pub trait TaskSink {
    /// Insert a task, optionally under `parent`, returning the new task's id
    fn insert_task(&self, task: &NewTask, parent: Option<&str>) -> Result<String>;
}

/// A heading task with its subtasks
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGroup {
    pub heading: NewTask,
    pub items: Vec<NewTask>,
}

/// "4 g | Salt"
pub fn item_title(item: &GroceryItem) -> String {
    format!(
        "{} {} | {}",
        format_amount(item.ingredient.amount),
        item.ingredient.unit,
        capitalize(&item.ingredient.name)
    )
}

/// One task group per food group, in order of first appearance
pub fn grocery_tasks(items: &[GroceryItem]) -> Vec<TaskGroup> {
    group_by_food_group(items)
        .into_iter()
        .map(|(group, members)| TaskGroup {
            heading: NewTask::new(group.label()),
            items: members.into_iter().map(|i| NewTask::new(item_title(i))).collect(),
        })
        .collect()
}

/// Write every group as a parent task with its items as subtasks
///
/// Not idempotent: running twice duplicates the list. Returns the number of
/// tasks created.
pub fn publish_grocery_list<S: TaskSink + ?Sized>(sink: &S, groups: &[TaskGroup]) -> Result<usize> {
    let mut created = 0;
    for group in groups {
        let parent = sink.insert_task(&group.heading, None)?;
        created += 1;
        for task in &group.items {
            sink.insert_task(task, Some(&parent))?;
            created += 1;
        }
        tracing::info!(group = %group.heading.title, items = group.items.len(), "Published group");
    }
    Ok(created)
}

/// How the target task list is configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListRef {
    Id(String),
    Title(String),
}

#[derive(Debug, Deserialize)]
struct TaskList {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct Task {
    id: String,
}

/// A Google Tasks list
pub struct GoogleTasks<'a> {
    api: &'a GoogleApi,
    list_id: String,
}

impl<'a> GoogleTasks<'a> {
    /// Open the configured list, looking it up by title if needed
    pub fn open(api: &'a GoogleApi, list: &TaskListRef) -> Result<Self> {
        let list_id = match list {
            TaskListRef::Id(id) => id.clone(),
            TaskListRef::Title(title) => {
                let lists: Vec<TaskList> =
                    api.list_all(&["tasks", "v1", "users", "@me", "lists"], &[])?;
                find_list(&lists, title)?
            }
        };
        Ok(Self { api, list_id })
    }

    /// Delete every task on the list, returning how many were deleted
    pub fn clear(&self) -> Result<usize> {
        let tasks: Vec<Task> = self.api.list_all(
            &["tasks", "v1", "lists", self.list_id.as_str(), "tasks"],
            &[("maxResults", "100"), ("showHidden", "true")],
        )?;
        for task in &tasks {
            tracing::debug!(task = %task.id, "Deleting task");
            self.api.delete(&[
                "tasks",
                "v1",
                "lists",
                self.list_id.as_str(),
                "tasks",
                task.id.as_str(),
            ])?;
        }
        Ok(tasks.len())
    }
}

impl TaskSink for GoogleTasks<'_> {
    fn insert_task(&self, task: &NewTask, parent: Option<&str>) -> Result<String> {
        let query: Vec<(&str, &str)> = parent.map(|p| ("parent", p)).into_iter().collect();
        let created: Task = self
            .api
            .post(&["tasks", "v1", "lists", self.list_id.as_str(), "tasks"], &query, task)?;
        Ok(created.id)
    }
}

fn find_list(lists: &[TaskList], title: &str) -> Result<String> {
    lists
        .iter()
        .find(|l| l.title == title)
        .map(|l| l.id.clone())
        .ok_or_else(|| Error::NotFound(format!("task list \"{}\"", title)))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records inserted tasks as (id, title, parent)
    #[derive(Default)]
    pub struct RecordingTasks {
        pub inserted: RefCell<Vec<(String, String, Option<String>)>>,
    }

    impl TaskSink for RecordingTasks {
        fn insert_task(&self, task: &NewTask, parent: Option<&str>) -> Result<String> {
            let mut inserted = self.inserted.borrow_mut();
            let id = format!("t{}", inserted.len());
            inserted.push((id.clone(), task.title.clone(), parent.map(str::to_string)));
            Ok(id)
        }
    }
}
