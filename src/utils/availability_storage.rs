// timehaven-service/src/utils/availability_storage.rs
//
// Availability records live in a flat key/value collection. The composite
// key (user, team, date) becomes the file name, so a wholesale overwrite of
// one user's record for a date is a single file write.
use crate::models::{AvailabilityRecord, ServiceError};
use log::{error, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

const AVAILABILITY_DIR: &str = "./storage/availability";

// Initialize availability directory
pub fn ensure_availability_dir() -> std::io::Result<()> {
    let dir = Path::new(AVAILABILITY_DIR);
    if !dir.exists() {
        info!("Creating availability directory");
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn record_path(user_id: &str, team_id: &str, date: &str) -> String {
    format!("{}/{}_{}_{}.json", AVAILABILITY_DIR, user_id, team_id, date)
}

// Save an availability record, replacing any previous record for the
// same (user, team, date) key.
pub fn save_record(record: &AvailabilityRecord) -> Result<(), ServiceError> {
    ensure_availability_dir().map_err(|e| {
        error!("Failed to create availability directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let path = record_path(&record.user_id, &record.team_id, &record.date);
    let record_json = serde_json::to_string_pretty(record).map_err(|e| {
        error!("Failed to serialize availability record: {:?}", e);
        ServiceError::InternalServerError
    })?;

    fs::write(&path, record_json).map_err(|e| {
        error!("Failed to save availability record: {:?}", e);
        ServiceError::InternalServerError
    })?;

    info!("✅ Saved availability for user: {} team: {} date: {}",
        record.user_id, record.team_id, record.date);
    Ok(())
}

// Find one user's record for a team and date
pub fn find_record(
    user_id: &str,
    team_id: &str,
    date: &str,
) -> Result<Option<AvailabilityRecord>, ServiceError> {
    let record_path = record_path(user_id, team_id, date);
    let path = Path::new(&record_path);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read availability file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let record: AvailabilityRecord = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse availability JSON: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(Some(record))
}

// Query all availability for a team on a date, keyed by user id.
// Members without a stored record are simply absent from the map.
pub fn get_team_availability(
    team_id: &str,
    date: &str,
) -> Result<HashMap<String, BTreeMap<u8, bool>>, ServiceError> {
    let mut availability = HashMap::new();
    ensure_availability_dir().map_err(|e| {
        error!("Failed to ensure availability directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let dir = Path::new(AVAILABILITY_DIR);

    for entry_result in fs::read_dir(dir).map_err(|e| {
        error!("Failed to read availability directory: {:?}", e);
        ServiceError::InternalServerError
    })? {
        let entry = entry_result.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read availability file: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let record: AvailabilityRecord = match serde_json::from_str(&content) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to parse availability JSON: {:?}", e);
                    continue;
                }
            };

            if record.team_id == team_id && record.date == date {
                availability.insert(record.user_id, record.availability);
            }
        }
    }

    Ok(availability)
}

// Delete one user's record for a team and date
pub fn delete_record(user_id: &str, team_id: &str, date: &str) -> Result<bool, ServiceError> {
    let record_path = record_path(user_id, team_id, date);
    let path = Path::new(&record_path);

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(path).map_err(|e| {
        error!("Failed to delete availability file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(true)
}
