use crate::models::{ServiceError, TeamMemberView};
use crate::utils::{get_user_id_from_request, team_storage, user_storage};
use actix_web::{get, web, HttpRequest, HttpResponse};
use log::{error, info, warn};
use serde_json::json;

// Get all teams for the current user
#[get("/teams")]
async fn get_user_teams(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📋 Fetching teams for user: {}", user_id);

    let teams = team_storage::get_teams_for_user(&user_id)?;

    info!("✅ Found {} teams for user: {}", teams.len(), user_id);

    Ok(HttpResponse::Ok().json(json!({ "success": true, "teams": teams })))
}

// Get a specific team by ID
#[get("/teams/{team_id}")]
async fn get_team(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("🔍 Fetching team: {} for user: {}", team_id, user_id);

    let team = match team_storage::find_team_by_id(&team_id)? {
        Some(team) => team,
        None => {
            error!("❌ Team not found: {}", team_id);
            return Err(ServiceError::NotFound);
        }
    };

    if !team.is_member(&user_id) {
        error!("❌ User: {} doesn't have access to team: {}", user_id, team_id);
        return Err(ServiceError::Forbidden);
    }

    info!("✅ Found team: {}", team_id);

    Ok(HttpResponse::Ok().json(json!({ "success": true, "team": team })))
}

// Get team members with user details
#[get("/teams/{team_id}/members")]
async fn get_team_members(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("📋 Fetching members for team: {}", team_id);

    let team = match team_storage::find_team_by_id(&team_id)? {
        Some(team) => team,
        None => {
            error!("❌ Team not found: {}", team_id);
            return Err(ServiceError::NotFound);
        }
    };

    if !team.is_member(&user_id) {
        error!("❌ User: {} doesn't have access to team: {}", user_id, team_id);
        return Err(ServiceError::Forbidden);
    }

    let mut members = Vec::new();
    for member_id in &team.member_ids {
        match user_storage::find_user_by_id(member_id)? {
            Some(user) => {
                let is_admin = team.is_lead(member_id);
                members.push(TeamMemberView {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    timezone: user.timezone,
                    is_active: user.is_active,
                    profile_image: user.profile_image,
                    is_admin,
                    role: if is_admin { "Admin".to_string() } else { "Member".to_string() },
                });
            }
            None => {
                // Stale membership entry; skip rather than fail the listing
                warn!("⚠️ Team member without user record: {}", member_id);
            }
        }
    }

    info!("✅ Found {} team members", members.len());

    Ok(HttpResponse::Ok().json(json!({ "success": true, "members": members })))
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_user_teams)
        .service(get_team)
        .service(get_team_members);
}
