// timehaven-service/src/utils/team_storage.rs
use crate::models::{ServiceError, Team};
use log::{error, info, warn};
use std::fs;
use std::path::Path;

const TEAMS_DIR: &str = "./storage/teams";

// Initialize teams directory
pub fn ensure_teams_dir() -> std::io::Result<()> {
    let dir = Path::new(TEAMS_DIR);
    if !dir.exists() {
        info!("Creating teams directory");
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

// Save team to storage
pub fn save_team(team: &Team) -> Result<(), ServiceError> {
    ensure_teams_dir().map_err(|e| {
        error!("Failed to create teams directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let team_path = format!("{}/{}.json", TEAMS_DIR, team.id);
    let team_json = serde_json::to_string_pretty(team).map_err(|e| {
        error!("Failed to serialize team: {:?}", e);
        ServiceError::InternalServerError
    })?;

    fs::write(&team_path, team_json).map_err(|e| {
        error!("Failed to save team: {:?}", e);
        ServiceError::InternalServerError
    })?;

    info!("✅ Saved team: {}", team.id);
    Ok(())
}

// Find team by ID
pub fn find_team_by_id(team_id: &str) -> Result<Option<Team>, ServiceError> {
    let team_path = format!("{}/{}.json", TEAMS_DIR, team_id);
    let path = Path::new(&team_path);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read team file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let team: Team = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse team JSON: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(Some(team))
}

// Get all active teams the user is a member of; deactivated teams stay
// in storage but drop out of listings
pub fn get_teams_for_user(user_id: &str) -> Result<Vec<Team>, ServiceError> {
    let mut teams = Vec::new();
    ensure_teams_dir().map_err(|e| {
        error!("Failed to ensure teams directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let dir = Path::new(TEAMS_DIR);

    for entry_result in fs::read_dir(dir).map_err(|e| {
        error!("Failed to read teams directory: {:?}", e);
        ServiceError::InternalServerError
    })? {
        let entry = entry_result.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read team file: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let team: Team = match serde_json::from_str(&content) {
                Ok(team) => team,
                Err(e) => {
                    warn!("Failed to parse team JSON: {:?}", e);
                    continue;
                }
            };

            if team.is_active && team.is_member(user_id) {
                teams.push(team);
            }
        }
    }

    Ok(teams)
}

// Delete a team from storage
pub fn delete_team(team_id: &str) -> Result<bool, ServiceError> {
    let team_path = format!("{}/{}.json", TEAMS_DIR, team_id);
    let path = Path::new(&team_path);

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(path).map_err(|e| {
        error!("Failed to delete team file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    info!("✅ Deleted team: {}", team_id);
    Ok(true)
}
