//! Google Tasks and Google Calendar sinks

pub mod auth;
pub mod calendar;
pub mod tasks;

pub use auth::GoogleAuth;
pub use calendar::{CalendarSink, GoogleCalendar, MealEvent, MealTimes};
pub use tasks::{GoogleTasks, NewTask, TaskListRef, TaskSink};

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

pub const API_BASE_URL: &str = "https://www.googleapis.com/";

const SERVICE: &str = "Google API";

/// Authenticated JSON client for the googleapis.com REST endpoints
pub struct GoogleApi {
    http: Client,
    base_url: Url,
    auth: GoogleAuth,
}

impl GoogleApi {
    /// Client authorized by the token file at `token_path`
    pub fn from_token_file(token_path: &std::path::Path) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("eating-helper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let auth = GoogleAuth::from_token_file(token_path, http.clone())?;
        Ok(Self {
            http,
            base_url: Url::parse(API_BASE_URL)?,
            auth,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        api_url(&self.base_url, segments)
    }

    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T> {
        let request = self.http.get(self.url(segments)?).query(query);
        let body = self.send(request)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        let request = self.http.post(self.url(segments)?).query(query).json(body);
        let body = self.send(request)?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) fn delete(&self, segments: &[&str]) -> Result<()> {
        let request = self.http.delete(self.url(segments)?);
        self.send(request)?;
        Ok(())
    }

    fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.bearer_auth(self.auth.access_token()?).send()?;
        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "Google API response");
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::Api {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// URL under `base`; each segment is percent-encoded on its own
fn api_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// One page of a Google list endpoint
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl GoogleApi {
    /// Every item of a paginated list endpoint
    pub(crate) fn list_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = query.to_vec();
            if let Some(token) = &page_token {
                params.push(("pageToken", token.as_str()));
            }
            let page: Page<T> = self.get(segments, &params)?;
            items.extend(page.items);

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Item {
        id: String,
    }

    #[test]
    fn test_api_url_escapes_segments() {
        let base = Url::parse(API_BASE_URL).unwrap();
        let calendar_id = "en.usa#holiday@group.v.calendar.google.com";
        let url = api_url(&base, &["calendar", "v3", "calendars", calendar_id, "events"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/\
             en.usa%23holiday@group.v.calendar.google.com/events"
        );
    }

    #[test]
    fn test_page_without_items() {
        let page: Page<Item> = serde_json::from_str(r#"{"kind": "tasks#tasks"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_page_with_token() {
        let page: Page<Item> =
            serde_json::from_str(r#"{"items": [{"id": "a"}], "nextPageToken": "p2"}"#).unwrap();
        assert_eq!(page.items[0].id, "a");
        assert_eq!(page.next_page_token.as_deref(), Some("p2"));
    }
}
