//! Meal schedule publishing to a calendar

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Deserialize;
use serde_json::json;

use super::GoogleApi;
use crate::error::{Error, Result};
use crate::meal::plan::WeeklyMealPlan;
use crate::text::title_case;

/// Calendar title for a meal with nothing to cook
pub const EATING_OUT_TITLE: &str = "Eat Out";

/// When meals happen during a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealTimes {
    pub first_meal: NaiveTime,
    /// Gap between the starts of consecutive meals
    pub interval: Duration,
    /// Time blocked for cooking and eating
    pub duration: Duration,
}

impl Default for MealTimes {
    fn default() -> Self {
        Self {
            first_meal: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            interval: Duration::hours(3),
            duration: Duration::minutes(60),
        }
    }
}

/// A calendar entry for one meal, in local time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

pub trait CalendarSink {
    fn insert_event(&self, event: &MealEvent) -> Result<()>;
}

/// One event per meal, the plan's first day falling on `first_day`
pub fn meal_schedule(
    plan: &WeeklyMealPlan,
    first_day: NaiveDate,
    times: &MealTimes,
) -> Vec<MealEvent> {
    let mut events = Vec::new();

    for (offset, day) in plan.days().iter().enumerate() {
        let day_start = (first_day + Duration::days(offset as i64)).and_time(times.first_meal);

        for (i, meal) in day.meals().iter().enumerate() {
            let start = day_start + times.interval * i as i32;
            let title = if meal.is_eating_out() {
                EATING_OUT_TITLE.to_string()
            } else {
                meal.recipes()
                    .iter()
                    .map(|r| title_case(r.name()))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            events.push(MealEvent {
                title,
                start,
                end: start + times.duration,
            });
        }
    }

    events
}

/// Insert every event, returning how many were created. Not idempotent.
pub fn publish_meal_schedule<S: CalendarSink + ?Sized>(
    sink: &S,
    events: &[MealEvent],
) -> Result<usize> {
    for event in events {
        sink.insert_event(event)?;
        tracing::debug!(title = %event.title, start = %event.start, "Added meal event");
    }
    Ok(events.len())
}

#[derive(Debug, Deserialize)]
struct CalendarListEntry {
    id: String,
    #[serde(default)]
    summary: String,
}

/// A Google calendar, looked up by its display name
pub struct GoogleCalendar<'a> {
    api: &'a GoogleApi,
    calendar_id: String,
    reminder_minutes: u32,
}

impl<'a> GoogleCalendar<'a> {
    pub fn open(api: &'a GoogleApi, summary: &str, reminder_minutes: u32) -> Result<Self> {
        let calendars: Vec<CalendarListEntry> = api.list_all(
            &["calendar", "v3", "users", "me", "calendarList"],
            &[("minAccessRole", "writer")],
        )?;
        let calendar_id = find_calendar(&calendars, summary)?;
        Ok(Self {
            api,
            calendar_id,
            reminder_minutes,
        })
    }
}

impl CalendarSink for GoogleCalendar<'_> {
    fn insert_event(&self, event: &MealEvent) -> Result<()> {
        let body = event_body(event, self.reminder_minutes)?;
        let _: serde_json::Value = self.api.post(
            &["calendar", "v3", "calendars", self.calendar_id.as_str(), "events"],
            &[],
            &body,
        )?;
        Ok(())
    }
}

fn find_calendar(calendars: &[CalendarListEntry], summary: &str) -> Result<String> {
    calendars
        .iter()
        .find(|c| c.summary == summary)
        .map(|c| c.id.clone())
        .ok_or_else(|| Error::NotFound(format!("calendar \"{}\"", summary)))
}

fn local_rfc3339(time: NaiveDateTime) -> Result<String> {
    Local
        .from_local_datetime(&time)
        .earliest()
        .map(|t| t.to_rfc3339())
        .ok_or_else(|| Error::InvalidMealPlan(format!("{} does not exist in local time", time)))
}

fn event_body(event: &MealEvent, reminder_minutes: u32) -> Result<serde_json::Value> {
    Ok(json!({
        "summary": event.title,
        "start": { "dateTime": local_rfc3339(event.start)? },
        "end": { "dateTime": local_rfc3339(event.end)? },
        "reminders": {
            "useDefault": false,
            "overrides": [{ "method": "popup", "minutes": reminder_minutes }],
        },
    }))
}
