// timehaven-service/src/models/calendar.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// The calendar backends a user can link. Stored on the user document as
// "google" / "outlook", matching what the OAuth callback writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarProvider {
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "outlook")]
    Outlook,
}

// A busy interval fetched from a provider, normalized to UTC instants.
// Transient: fetched per request and only persisted if explicitly bridged
// into an AvailabilityRecord.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
