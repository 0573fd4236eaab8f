// timehaven-service/src/services/heatmap_service.rs
//
// Reduces per-user hourly availability into the team heatmap. The aggregator
// is a pure function; the live overlay on top of it fans calendar fetches out
// across the team and degrades per member on failure.
use crate::calendar::fetcher_for;
use crate::models::{CalendarEvent, HeatmapEntry, ServiceError, Team};
use crate::services::calendar_bridge::{bridge_events, day_window};
use crate::utils::user_storage;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use log::warn;
use std::collections::{BTreeMap, HashMap};

/// Computes the per-hour heatmap for a team.
///
/// `member_ids` is the membership universe at query time (a set, no
/// duplicates); `per_user` holds whatever availability is known, keyed by
/// user id. A member missing from `per_user`, or an hour missing from a
/// member's map, counts as unavailable. An empty team yields all-zero
/// entries with percentage 0.0 for every hour.
pub fn compute_heatmap(
    member_ids: &[String],
    per_user: &HashMap<String, BTreeMap<u8, bool>>,
) -> BTreeMap<u8, HeatmapEntry> {
    let total = member_ids.len() as u32;
    let mut heatmap = BTreeMap::new();

    for hour in 0u8..24 {
        let available = member_ids
            .iter()
            .filter(|member_id| {
                per_user
                    .get(*member_id)
                    .and_then(|hours| hours.get(&hour))
                    .copied()
                    .unwrap_or(false)
            })
            .count() as u32;

        let percentage = if total > 0 {
            f64::from(available) / f64::from(total)
        } else {
            0.0
        };

        heatmap.insert(hour, HeatmapEntry { available, total, percentage });
    }

    heatmap
}

// Where a member's events come from when building a live heatmap.
// Ok(None) means the member has no calendar connected.
#[async_trait]
pub trait MemberEventsSource: Send + Sync {
    async fn events_for(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<CalendarEvent>>, ServiceError>;
}

// Production source: look up the member's linked provider and fetch
// through it. A member without a user document has no calendar.
pub struct ProviderEventsSource;

#[async_trait]
impl MemberEventsSource for ProviderEventsSource {
    async fn events_for(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<CalendarEvent>>, ServiceError> {
        let user = match user_storage::find_user_by_id(user_id)? {
            Some(user) => user,
            None => return Ok(None),
        };

        let (provider, token) = match user.connected_calendar() {
            Some(connected) => connected,
            None => return Ok(None),
        };

        let fetcher = fetcher_for(provider);
        let events = fetcher.fetch_events(token, date).await?;
        Ok(Some(events))
    }
}

// Heatmap built from live calendar data instead of stored records
pub async fn live_heatmap(
    team: &Team,
    date: NaiveDate,
) -> Result<BTreeMap<u8, HeatmapEntry>, ServiceError> {
    live_heatmap_from(&ProviderEventsSource, team, date).await
}

// Fetches run concurrently across the team; results are keyed by user id
// so arrival order is irrelevant. A member without a linked calendar, or
// whose fetch fails, contributes no data (all hours unavailable) rather
// than aborting the aggregate.
pub async fn live_heatmap_from<S: MemberEventsSource>(
    source: &S,
    team: &Team,
    date: NaiveDate,
) -> Result<BTreeMap<u8, HeatmapEntry>, ServiceError> {
    let (day_start, day_end) = day_window(date);

    let fetches = team.member_ids.iter().map(|member_id| {
        let member_id = member_id.clone();
        async move {
            let result = source.events_for(&member_id, date).await;
            (member_id, result)
        }
    });

    let mut per_user = HashMap::new();
    for (member_id, result) in join_all(fetches).await {
        match result {
            Ok(Some(events)) => {
                let outcome = bridge_events(&events, day_start, day_end);
                if outcome.malformed > 0 {
                    warn!(
                        "⚠️ Skipped {} malformed events for user: {}",
                        outcome.malformed, member_id
                    );
                }
                per_user.insert(member_id, outcome.hours);
            }
            // No linked calendar: the member counts as unavailable
            Ok(None) => {}
            Err(e) => {
                warn!("⚠️ Calendar fetch failed for user: {}: {}", member_id, e);
            }
        }
    }

    Ok(compute_heatmap(&team.member_ids, &per_user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Utc};

    fn hours(entries: &[(u8, bool)]) -> BTreeMap<u8, bool> {
        entries.iter().copied().collect()
    }

    fn team_of(member_ids: &[&str]) -> Team {
        Team {
            id: "team-1".to_string(),
            name: "Test Team".to_string(),
            description: None,
            color: None,
            member_ids: member_ids.iter().map(|id| id.to_string()).collect(),
            team_lead_ids: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn event(start: &str, end: &str) -> CalendarEvent {
        let instant = |raw: &str| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .unwrap()
                .and_utc()
        };
        CalendarEvent {
            id: None,
            title: None,
            start: instant(start),
            end: instant(end),
        }
    }

    // Canned per-member results standing in for the provider fetchers
    struct FixedEventsSource(HashMap<String, Option<Vec<CalendarEvent>>>);

    #[async_trait]
    impl MemberEventsSource for FixedEventsSource {
        async fn events_for(
            &self,
            user_id: &str,
            _date: NaiveDate,
        ) -> Result<Option<Vec<CalendarEvent>>, ServiceError> {
            match self.0.get(user_id) {
                Some(result) => Ok(result.clone()),
                None => Err(ServiceError::ProviderUnavailable(
                    "calendar backend down".to_string(),
                )),
            }
        }
    }

    #[test]
    fn empty_team_has_zero_percentage_for_every_hour() {
        let heatmap = compute_heatmap(&[], &HashMap::new());

        assert_eq!(heatmap.len(), 24);
        for entry in heatmap.values() {
            assert_eq!(entry.available, 0);
            assert_eq!(entry.total, 0);
            assert_eq!(entry.percentage, 0.0);
        }
    }

    #[test]
    fn missing_record_counts_as_unavailable() {
        // Member A stored {9: true, 10: false}, member B has no record
        let members = vec!["a".to_string(), "b".to_string()];
        let mut per_user = HashMap::new();
        per_user.insert("a".to_string(), hours(&[(9, true), (10, false)]));

        let heatmap = compute_heatmap(&members, &per_user);

        assert_eq!(
            heatmap[&9],
            HeatmapEntry { available: 1, total: 2, percentage: 0.5 }
        );
        assert_eq!(
            heatmap[&10],
            HeatmapEntry { available: 0, total: 2, percentage: 0.0 }
        );
        for hour in (0u8..24).filter(|h| *h != 9 && *h != 10) {
            assert_eq!(
                heatmap[&hour],
                HeatmapEntry { available: 0, total: 2, percentage: 0.0 }
            );
        }
    }

    #[test]
    fn available_count_never_exceeds_total() {
        let members = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut per_user = HashMap::new();
        for member in &members {
            per_user.insert(member.clone(), hours(&[(8, true), (9, true)]));
        }
        // Data for someone who is no longer a member must not inflate counts
        per_user.insert("ex-member".to_string(), hours(&[(8, true)]));

        let heatmap = compute_heatmap(&members, &per_user);

        for entry in heatmap.values() {
            assert!(entry.available <= entry.total);
        }
        assert_eq!(heatmap[&8].available, 3);
        assert_eq!(heatmap[&8].total, 3);
        assert_eq!(heatmap[&8].percentage, 1.0);
    }

    #[actix_rt::test]
    async fn live_heatmap_degrades_per_member_instead_of_failing() {
        // a: free all morning except a 09:00-10:00 meeting
        // b: no calendar connected
        // c: provider fetch fails (absent from the source map)
        let team = team_of(&["a", "b", "c"]);
        let mut results = HashMap::new();
        results.insert(
            "a".to_string(),
            Some(vec![event("2024-06-01T09:00:00", "2024-06-01T10:00:00")]),
        );
        results.insert("b".to_string(), None);
        let source = FixedEventsSource(results);

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let heatmap = live_heatmap_from(&source, &team, date).await.unwrap();

        // One failed fetch never aborts the aggregate, and b and c count
        // as unavailable for every hour
        assert_eq!(heatmap[&8], HeatmapEntry { available: 1, total: 3, percentage: 1.0 / 3.0 });
        assert_eq!(heatmap[&9], HeatmapEntry { available: 0, total: 3, percentage: 0.0 });
        assert_eq!(heatmap[&10], HeatmapEntry { available: 1, total: 3, percentage: 1.0 / 3.0 });
    }

    #[actix_rt::test]
    async fn live_heatmap_with_no_connected_calendars_is_all_unavailable() {
        let team = team_of(&["a", "b"]);
        let mut results = HashMap::new();
        results.insert("a".to_string(), None);
        results.insert("b".to_string(), None);
        let source = FixedEventsSource(results);

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let heatmap = live_heatmap_from(&source, &team, date).await.unwrap();

        assert_eq!(heatmap.len(), 24);
        for entry in heatmap.values() {
            assert_eq!(entry.available, 0);
            assert_eq!(entry.total, 2);
            assert_eq!(entry.percentage, 0.0);
        }
    }

    #[test]
    fn aggregation_is_idempotent() {
        let members = vec!["a".to_string(), "b".to_string()];
        let mut per_user = HashMap::new();
        per_user.insert("a".to_string(), hours(&[(7, true), (8, false)]));
        per_user.insert("b".to_string(), hours(&[(7, true), (8, true)]));

        let first = compute_heatmap(&members, &per_user);
        let second = compute_heatmap(&members, &per_user);

        assert_eq!(first, second);
    }
}
