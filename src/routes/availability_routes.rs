use crate::calendar::fetcher_for;
use crate::models::{AvailabilityRecord, ServiceError, UpdateAvailabilityRequest};
use crate::services::calendar_bridge::{bridge_events, day_window};
use crate::services::heatmap_service::{compute_heatmap, live_heatmap};
use crate::utils::{availability_storage, get_user_id_from_request, team_storage, user_storage};
use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct DateQuery {
    date: String, // YYYY-MM-DD
}

#[derive(Deserialize)]
struct CalendarSyncRequest {
    date: String,
}

fn parse_date(date: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        ServiceError::BadRequest("Invalid date format, expected YYYY-MM-DD".to_string())
    })
}

// Get availability heatmap for a team from stored records
#[get("/availability/heatmap/{team_id}")]
async fn get_heatmap(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("📊 Building heatmap for team: {} date: {} (user: {})",
        team_id, query.date, user_id);

    let team = match team_storage::find_team_by_id(&team_id)? {
        Some(team) => team,
        None => {
            error!("❌ Team not found: {}", team_id);
            return Err(ServiceError::NotFound);
        }
    };

    let per_user = availability_storage::get_team_availability(&team_id, &query.date)?;
    let heatmap = compute_heatmap(&team.member_ids, &per_user);

    info!("✅ Heatmap built for team: {} ({} members)", team_id, team.member_ids.len());

    Ok(HttpResponse::Ok().json(json!({ "success": true, "heatmap": heatmap })))
}

// Get a live heatmap built from every member's calendar instead of
// stored records. Members without a linked calendar, or whose provider
// fetch fails, count as unavailable rather than failing the request.
#[get("/availability/heatmap/{team_id}/live")]
async fn get_live_heatmap(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();
    let date = parse_date(&query.date)?;

    info!("📊 Building live heatmap for team: {} date: {} (user: {})",
        team_id, query.date, user_id);

    let team = match team_storage::find_team_by_id(&team_id)? {
        Some(team) => team,
        None => {
            error!("❌ Team not found: {}", team_id);
            return Err(ServiceError::NotFound);
        }
    };

    let heatmap = live_heatmap(&team, date).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "heatmap": heatmap })))
}

// Update the caller's availability for a team and date (wholesale overwrite)
#[put("/availability/{team_id}")]
async fn update_availability(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateAvailabilityRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("📝 Updating availability for user: {} team: {} date: {}",
        user_id, team_id, body.date);

    if let Some(hour) = body.availability.keys().find(|hour| **hour > 23) {
        return Err(ServiceError::BadRequest(format!(
            "Invalid hour: {}. Hours must be between 0 and 23",
            hour
        )));
    }

    let record = AvailabilityRecord {
        user_id,
        team_id,
        date: body.date.clone(),
        availability: body.availability.clone(),
        updated_at: Utc::now(),
    };

    availability_storage::save_record(&record)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

// Get the caller's calendar events for a date through their linked provider
#[get("/availability/calendar/{team_id}")]
async fn get_calendar_events(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let _team_id = path.into_inner();
    let date = parse_date(&query.date)?;

    info!("📅 Fetching calendar events for user: {} date: {}", user_id, query.date);

    let user = match user_storage::find_user_by_id(&user_id)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", user_id);
            return Err(ServiceError::NotFound);
        }
    };

    let (provider, token) = match user.connected_calendar() {
        Some(connected) => connected,
        None => {
            // No linked calendar is not an error
            return Ok(HttpResponse::Ok().json(json!({ "success": true, "events": [] })));
        }
    };

    // A provider failure degrades to an empty event list; the caller asked
    // for a best-effort view, not a hard dependency on the provider.
    let events = match fetcher_for(provider).fetch_events(token, date).await {
        Ok(events) => events,
        Err(e) => {
            warn!("⚠️ Calendar fetch failed for user: {}: {}", user_id, e);
            Vec::new()
        }
    };

    info!("✅ Fetched {} events for user: {}", events.len(), user_id);

    Ok(HttpResponse::Ok().json(json!({ "success": true, "events": events })))
}

// Bridge the caller's calendar into a stored availability record.
// Persisting is the explicit purpose of this endpoint, so a provider
// failure here surfaces to the caller instead of degrading.
#[post("/availability/{team_id}/calendar-sync")]
async fn sync_calendar_availability(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<CalendarSyncRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();
    let date = parse_date(&body.date)?;

    info!("🔄 Syncing calendar availability for user: {} team: {} date: {}",
        user_id, team_id, body.date);

    let user = match user_storage::find_user_by_id(&user_id)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", user_id);
            return Err(ServiceError::NotFound);
        }
    };

    let (provider, token) = match user.connected_calendar() {
        Some(connected) => connected,
        None => {
            return Err(ServiceError::BadRequest(
                "No calendar provider connected".to_string(),
            ));
        }
    };

    let events = fetcher_for(provider).fetch_events(token, date).await?;

    let (day_start, day_end) = day_window(date);
    let outcome = bridge_events(&events, day_start, day_end);

    if outcome.malformed > 0 {
        warn!("⚠️ Skipped {} malformed events for user: {}", outcome.malformed, user_id);
    }

    let record = AvailabilityRecord {
        user_id: user_id.clone(),
        team_id,
        date: body.date.clone(),
        availability: outcome.hours.clone(),
        updated_at: Utc::now(),
    };

    availability_storage::save_record(&record)?;

    info!("✅ Calendar availability synced for user: {}", user_id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "availability": outcome.hours,
        "malformed_events": outcome.malformed
    })))
}

// Register all availability routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_heatmap)
        .service(get_live_heatmap)
        .service(update_availability)
        .service(get_calendar_events)
        .service(sync_calendar_availability);
}
