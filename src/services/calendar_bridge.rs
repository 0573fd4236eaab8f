// timehaven-service/src/services/calendar_bridge.rs
//
// Converts a day's calendar events into the per-hour availability shape
// used by availability records and the heatmap aggregator. Pure: persisting
// the result is an explicit, separate action by the caller.
use crate::models::CalendarEvent;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::warn;
use std::collections::BTreeMap;

/// Result of bridging one day's events. `malformed` counts events that were
/// rejected (end before start) and excluded from the computation.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeOutcome {
    pub hours: BTreeMap<u8, bool>,
    pub malformed: usize,
}

// The 24-hour UTC window [midnight, next midnight) for a calendar date
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let day_start = date.and_time(NaiveTime::MIN).and_utc();
    (day_start, day_start + Duration::days(1))
}

/// Marks each hour bucket `[day_start + h, day_start + h + 1h)` unavailable
/// when any event overlaps it by a nonzero duration.
///
/// Overlap uses half-open interval semantics (`start < bucket_end && end >
/// bucket_start`), so a meeting ending exactly on the hour leaves that hour
/// free. Zero-duration events never mark an hour busy. An event with end
/// before start is a malformed-event fault: it is excluded and counted, but
/// the rest of the day is still computed.
pub fn bridge_events(
    events: &[CalendarEvent],
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
) -> BridgeOutcome {
    let mut malformed = 0;
    let mut valid = Vec::with_capacity(events.len());

    for event in events {
        if event.end < event.start {
            warn!(
                "⚠️ Malformed event (end before start), skipping: {:?} {} -> {}",
                event.id, event.start, event.end
            );
            malformed += 1;
            continue;
        }
        if event.start == event.end {
            // Zero-duration events occupy no time
            continue;
        }
        // Events entirely outside the day window are ignored
        if event.end <= day_start || event.start >= day_end {
            continue;
        }
        valid.push(event);
    }

    let mut hours = BTreeMap::new();
    for hour in 0u8..24 {
        let bucket_start = day_start + Duration::hours(hour as i64);
        let bucket_end = bucket_start + Duration::hours(1);

        let busy = valid
            .iter()
            .any(|event| event.start < bucket_end && event.end > bucket_start);

        hours.insert(hour, !busy);
    }

    BridgeOutcome { hours, malformed }
}
