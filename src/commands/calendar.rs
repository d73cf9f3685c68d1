//! Calendar command - Schedule the week's meals on Google Calendar

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;

use super::utils;
use eating_helper::config::Settings;
use eating_helper::google::calendar::{meal_schedule, publish_meal_schedule};
use eating_helper::google::{GoogleApi, GoogleCalendar, MealEvent};

/// Execute the calendar command
///
/// The plan's first day is scheduled `days_from_now` days after today.
pub fn execute(settings: &Settings, dry_run: bool, days_from_now: u32) -> Result<()> {
    let (_, plan) = utils::load_plan(settings)?;
    let times = settings.schedule.meal_times()?;

    let first_day = first_day(Local::now().date_naive(), days_from_now);
    let events = meal_schedule(&plan, first_day, &times);

    println!("{}", format_events(&events));

    if dry_run {
        println!("\n{}", "(DRY-RUN) Nothing was sent to Google Calendar.".blue());
        return Ok(());
    }

    let api = GoogleApi::from_token_file(&settings.google_token_path())
        .context("Failed to set up Google API access")?;
    let calendar = GoogleCalendar::open(
        &api,
        &settings.google.meal_plan_calendar,
        settings.schedule.reminder_minutes,
    )
    .context("Failed to open meal plan calendar")?;

    let created = publish_meal_schedule(&calendar, &events).context("Failed to add meals")?;
    println!(
        "\n{} {} events on \"{}\"",
        "Created".green(),
        created,
        settings.google.meal_plan_calendar
    );
    Ok(())
}

fn first_day(today: NaiveDate, days_from_now: u32) -> NaiveDate {
    today + Duration::days(days_from_now.into())
}

pub fn format_events(events: &[MealEvent]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Day"), Cell::new("Time"), Cell::new("Meal")]);

    for event in events {
        table.add_row(vec![
            Cell::new(event.start.format("%a %Y-%m-%d")),
            Cell::new(format!(
                "{}-{}",
                event.start.format("%H:%M"),
                event.end.format("%H:%M")
            )),
            Cell::new(&event.title),
        ]);
    }

    table.to_string()
}
