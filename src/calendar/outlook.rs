// timehaven-service/src/calendar/outlook.rs
use crate::models::{CalendarEvent, ServiceError};
use crate::services::calendar_bridge::day_window;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, error};
use serde::Deserialize;

use super::CalendarFetcher;

const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

// Microsoft Graph calendarView fetcher
pub struct OutlookCalendar {
    client: reqwest::Client,
}

impl OutlookCalendar {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OutlookCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarFetcher for OutlookCalendar {
    async fn fetch_events(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, ServiceError> {
        let (start, end) = day_window(date);
        let url = format!("{}/me/calendarView", GRAPH_API_BASE);

        debug!("📅 Fetching Outlook calendar events for date: {}", date);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("startDateTime", start.to_rfc3339()),
                ("endDateTime", end.to_rfc3339()),
            ])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Outlook calendar request failed: {}", e);
                ServiceError::ProviderUnavailable("Outlook calendar request failed".to_string())
            })?;

        if !response.status().is_success() {
            error!("❌ Outlook calendar returned status: {}", response.status());
            return Err(ServiceError::ProviderUnavailable(format!(
                "Outlook calendar returned status {}",
                response.status()
            )));
        }

        let list: GraphEventList = response.json().await.map_err(|e| {
            error!("❌ Failed to parse Outlook calendar response: {}", e);
            ServiceError::ProviderUnavailable("Invalid Outlook calendar response".to_string())
        })?;

        Ok(list.value.into_iter().filter_map(normalize_event).collect())
    }
}

#[derive(Deserialize)]
struct GraphEventList {
    #[serde(default)]
    value: Vec<GraphEvent>,
}

#[derive(Deserialize)]
struct GraphEvent {
    id: Option<String>,
    subject: Option<String>,
    #[serde(rename = "isCancelled", default)]
    is_cancelled: bool,
    start: Option<GraphDateTime>,
    end: Option<GraphDateTime>,
}

#[derive(Deserialize)]
struct GraphDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
}

// Graph returns fractional-second local strings, UTC unless the request
// asked for another zone via a Prefer header (this fetcher doesn't).
fn parse_graph_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn normalize_event(event: GraphEvent) -> Option<CalendarEvent> {
    if event.is_cancelled {
        return None;
    }

    let start = parse_graph_instant(&event.start?.date_time)?;
    let end = parse_graph_instant(&event.end?.date_time)?;

    Some(CalendarEvent {
        id: event.id,
        title: event.subject,
        start,
        end,
    })
}
