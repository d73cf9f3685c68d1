//! CLI commands

pub mod calendar;
pub mod clear_tasks;
pub mod grocery;
pub mod stats;
pub mod utils;
