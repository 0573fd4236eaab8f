// timehaven-service/src/calendar/google.rs
use crate::models::{CalendarEvent, ServiceError};
use crate::services::calendar_bridge::day_window;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use log::{debug, error};
use serde::Deserialize;

use super::CalendarFetcher;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

// Google Calendar v3 fetcher for the user's primary calendar
pub struct GoogleCalendar {
    client: reqwest::Client,
}

impl GoogleCalendar {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GoogleCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarFetcher for GoogleCalendar {
    async fn fetch_events(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, ServiceError> {
        let (time_min, time_max) = day_window(date);
        let url = format!("{}/calendars/primary/events", CALENDAR_API_BASE);

        debug!("📅 Fetching Google Calendar events for date: {}", date);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Google Calendar request failed: {}", e);
                ServiceError::ProviderUnavailable("Google Calendar request failed".to_string())
            })?;

        if !response.status().is_success() {
            error!("❌ Google Calendar returned status: {}", response.status());
            return Err(ServiceError::ProviderUnavailable(format!(
                "Google Calendar returned status {}",
                response.status()
            )));
        }

        let list: GoogleEventList = response.json().await.map_err(|e| {
            error!("❌ Failed to parse Google Calendar response: {}", e);
            ServiceError::ProviderUnavailable("Invalid Google Calendar response".to_string())
        })?;

        Ok(list.items.into_iter().filter_map(normalize_event).collect())
    }
}

#[derive(Deserialize)]
struct GoogleEventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Deserialize)]
struct GoogleEvent {
    id: Option<String>,
    summary: Option<String>,
    status: Option<String>,
    start: Option<GoogleEventTime>,
    end: Option<GoogleEventTime>,
}

// Timed events carry `dateTime` (RFC 3339); all-day events carry `date`
#[derive(Deserialize)]
struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<FixedOffset>>,
    date: Option<NaiveDate>,
}

impl GoogleEventTime {
    // All-day dates become midnight UTC; Google's all-day end date is
    // already exclusive, so no further adjustment is needed.
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        if let Some(date_time) = self.date_time {
            return Some(date_time.with_timezone(&Utc));
        }
        self.date
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
    }
}

// Cancelled events and events without usable bounds are dropped here so
// downstream code only ever sees well-formed busy intervals.
fn normalize_event(event: GoogleEvent) -> Option<CalendarEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let start = event.start.as_ref()?.to_instant()?;
    let end = event.end.as_ref()?.to_instant()?;

    Some(CalendarEvent {
        id: event.id,
        title: event.summary,
        start,
        end,
    })
}
