// timehaven-service/src/models/availability.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// One user's per-hour availability for a team and date.
// Keyed by (user_id, team_id, date) and overwritten wholesale on update;
// there are no partial-hour patch semantics.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AvailabilityRecord {
    pub user_id: String,
    pub team_id: String,
    pub date: String, // YYYY-MM-DD
    pub availability: BTreeMap<u8, bool>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

// Request body for the availability update endpoint
#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateAvailabilityRequest {
    pub date: String,
    pub availability: BTreeMap<u8, bool>,
}

// One hour of the team heatmap. Derived on every request, never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HeatmapEntry {
    pub available: u32,
    pub total: u32,
    pub percentage: f64,
}
