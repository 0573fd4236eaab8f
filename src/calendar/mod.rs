// timehaven-service/src/calendar/mod.rs
//
// Calendar provider fetchers. The set of providers is closed (Google,
// Outlook); call sites dispatch through the CalendarFetcher capability
// rather than branching on provider strings. Credentials travel with each
// call so no client state is shared across requests.
use crate::models::{CalendarEvent, CalendarProvider, ServiceError};
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod google;
pub mod outlook;

pub use google::GoogleCalendar;
pub use outlook::OutlookCalendar;

// Fetches one day of events for the credential's owner, normalized to
// UTC instants. No retries here; retry policy belongs to the caller.
#[async_trait]
pub trait CalendarFetcher: Send + Sync {
    async fn fetch_events(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, ServiceError>;
}

// Build the fetcher for a linked provider
pub fn fetcher_for(provider: CalendarProvider) -> Box<dyn CalendarFetcher> {
    match provider {
        CalendarProvider::Google => Box::new(GoogleCalendar::new()),
        CalendarProvider::Outlook => Box::new(OutlookCalendar::new()),
    }
}
