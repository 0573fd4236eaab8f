use actix_web::{test, App};
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

use timehaven_service::models::{AvailabilityRecord, Team, User};
use timehaven_service::routes::{availability_routes, team_routes};
use timehaven_service::utils::{availability_storage, jwt, team_storage, user_storage};

// Seed a user document the way the auth service would
fn seed_user(name: &str) -> User {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", Uuid::new_v4()),
        timezone: "UTC".to_string(),
        is_active: true,
        profile_image: None,
        calendar_provider: None,
        google_access_token: None,
        outlook_access_token: None,
        created_at: Utc::now(),
    };
    user_storage::save_user(&user).unwrap();
    user
}

fn seed_team(member_ids: Vec<String>, lead_id: &str) -> Team {
    let team = Team {
        id: Uuid::new_v4().to_string(),
        name: "Test Team".to_string(),
        description: None,
        color: None,
        member_ids,
        team_lead_ids: vec![lead_id.to_string()],
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    team_storage::save_team(&team).unwrap();
    team
}

fn cleanup(team: &Team, date: &str) {
    for member_id in &team.member_ids {
        let _ = availability_storage::delete_record(member_id, &team.id, date);
        let _ = user_storage::delete_user(member_id);
    }
    let _ = team_storage::delete_team(&team.id);
}

#[actix_rt::test]
async fn test_heatmap_counts_stored_availability() {
    let date = "2024-06-01";
    let user_a = seed_user("Alice");
    let user_b = seed_user("Bob");
    let team = seed_team(vec![user_a.id.clone(), user_b.id.clone()], &user_a.id);

    // Alice stored hours, Bob has no record at all
    let mut hours = BTreeMap::new();
    hours.insert(9, true);
    hours.insert(10, false);
    availability_storage::save_record(&AvailabilityRecord {
        user_id: user_a.id.clone(),
        team_id: team.id.clone(),
        date: date.to_string(),
        availability: hours,
        updated_at: Utc::now(),
    })
    .unwrap();

    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let token = jwt::generate_token(&user_a).unwrap();
    let request = test::TestRequest::get()
        .uri(&format!("/availability/heatmap/{}?date={}", team.id, date))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let response: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(response["success"], json!(true));
    let heatmap = &response["heatmap"];
    assert_eq!(heatmap["9"]["available"], json!(1));
    assert_eq!(heatmap["9"]["total"], json!(2));
    assert_eq!(heatmap["9"]["percentage"], json!(0.5));
    assert_eq!(heatmap["10"]["available"], json!(0));
    assert_eq!(heatmap["10"]["percentage"], json!(0.0));
    // A missing record is indistinguishable from fully unavailable
    assert_eq!(heatmap["0"]["available"], json!(0));
    assert_eq!(heatmap["0"]["total"], json!(2));
    assert_eq!(heatmap["23"]["available"], json!(0));

    cleanup(&team, date);
}

#[actix_rt::test]
async fn test_live_heatmap_degrades_members_without_calendars() {
    let date = "2024-06-07";
    let user_a = seed_user("Niaj");
    let user_b = seed_user("Olivia");
    // A third member id with no user document at all
    let ghost_id = Uuid::new_v4().to_string();
    let team = seed_team(
        vec![user_a.id.clone(), user_b.id.clone(), ghost_id],
        &user_a.id,
    );

    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let token = jwt::generate_token(&user_a).unwrap();
    let request = test::TestRequest::get()
        .uri(&format!("/availability/heatmap/{}/live?date={}", team.id, date))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let response: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    // No member has a linked calendar, so everyone degrades to "no data":
    // the request still succeeds and totals reflect the full membership
    assert_eq!(response["success"], json!(true));
    let heatmap = &response["heatmap"];
    for hour in 0..24 {
        let entry = &heatmap[hour.to_string()];
        assert_eq!(entry["available"], json!(0));
        assert_eq!(entry["total"], json!(3));
        assert_eq!(entry["percentage"], json!(0.0));
    }

    cleanup(&team, date);
}

#[actix_rt::test]
async fn test_heatmap_unknown_team_is_not_found() {
    let user = seed_user("Carol");
    let token = jwt::generate_token(&user).unwrap();

    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let request = test::TestRequest::get()
        .uri("/availability/heatmap/no-such-team?date=2024-06-01")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);

    let _ = user_storage::delete_user(&user.id);
}

#[actix_rt::test]
async fn test_update_availability_overwrites_wholesale() {
    let date = "2024-06-02";
    let user = seed_user("Dave");
    let team = seed_team(vec![user.id.clone()], &user.id);
    let token = jwt::generate_token(&user).unwrap();

    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let first = test::TestRequest::put()
        .uri(&format!("/availability/{}", team.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "date": date, "availability": { "9": true } }))
        .to_request();
    let response: serde_json::Value = test::call_and_read_body_json(&app, first).await;
    assert_eq!(response["success"], json!(true));

    // Second write replaces the record; no partial-hour patching
    let second = test::TestRequest::put()
        .uri(&format!("/availability/{}", team.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "date": date, "availability": { "10": true } }))
        .to_request();
    let response: serde_json::Value = test::call_and_read_body_json(&app, second).await;
    assert_eq!(response["success"], json!(true));

    let record = availability_storage::find_record(&user.id, &team.id, date)
        .unwrap()
        .unwrap();
    assert_eq!(record.availability.get(&10), Some(&true));
    assert_eq!(record.availability.get(&9), None);

    cleanup(&team, date);
}

#[actix_rt::test]
async fn test_update_availability_rejects_out_of_range_hour() {
    let user = seed_user("Erin");
    let team = seed_team(vec![user.id.clone()], &user.id);
    let token = jwt::generate_token(&user).unwrap();

    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let request = test::TestRequest::put()
        .uri(&format!("/availability/{}", team.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "date": "2024-06-03", "availability": { "24": true } }))
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);

    cleanup(&team, "2024-06-03");
}

#[actix_rt::test]
async fn test_availability_requires_authentication() {
    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let request = test::TestRequest::get()
        .uri("/availability/heatmap/some-team?date=2024-06-01")
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 401);
}

#[actix_rt::test]
async fn test_calendar_events_without_provider_is_empty() {
    let date = "2024-06-04";
    let user = seed_user("Frank");
    let team = seed_team(vec![user.id.clone()], &user.id);
    let token = jwt::generate_token(&user).unwrap();

    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let request = test::TestRequest::get()
        .uri(&format!("/availability/calendar/{}?date={}", team.id, date))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let response: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["events"], json!([]));

    cleanup(&team, date);
}

#[actix_rt::test]
async fn test_calendar_sync_without_provider_is_bad_request() {
    let user = seed_user("Grace");
    let team = seed_team(vec![user.id.clone()], &user.id);
    let token = jwt::generate_token(&user).unwrap();

    let app = test::init_service(
        App::new().configure(availability_routes::init_routes),
    )
    .await;

    let request = test::TestRequest::post()
        .uri(&format!("/availability/{}/calendar-sync", team.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "date": "2024-06-05" }))
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);

    cleanup(&team, "2024-06-05");
}

#[actix_rt::test]
async fn test_team_members_listing() {
    let date = "2024-06-06";
    let lead = seed_user("Heidi");
    let member = seed_user("Ivan");
    let team = seed_team(vec![lead.id.clone(), member.id.clone()], &lead.id);
    let token = jwt::generate_token(&lead).unwrap();

    let app = test::init_service(App::new().configure(team_routes::init_routes)).await;

    let request = test::TestRequest::get()
        .uri(&format!("/teams/{}/members", team.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let response: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(response["success"], json!(true));

    let members = response["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);

    let lead_view = members
        .iter()
        .find(|m| m["id"] == json!(lead.id))
        .unwrap();
    assert_eq!(lead_view["is_admin"], json!(true));
    assert_eq!(lead_view["role"], json!("Admin"));

    let member_view = members
        .iter()
        .find(|m| m["id"] == json!(member.id))
        .unwrap();
    assert_eq!(member_view["role"], json!("Member"));

    cleanup(&team, date);
}

#[actix_rt::test]
async fn test_team_listing_skips_deactivated_teams() {
    let user = seed_user("Peggy");
    let active_team = seed_team(vec![user.id.clone()], &user.id);
    let mut inactive_team = seed_team(vec![user.id.clone()], &user.id);
    inactive_team.is_active = false;
    team_storage::save_team(&inactive_team).unwrap();

    let app = test::init_service(App::new().configure(team_routes::init_routes)).await;

    let token = jwt::generate_token(&user).unwrap();
    let request = test::TestRequest::get()
        .uri("/teams")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let response: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(response["success"], json!(true));

    let teams = response["teams"].as_array().unwrap();
    assert!(teams.iter().any(|t| t["id"] == json!(active_team.id)));
    assert!(!teams.iter().any(|t| t["id"] == json!(inactive_team.id)));

    let _ = team_storage::delete_team(&inactive_team.id);
    cleanup(&active_team, "");
}

#[actix_rt::test]
async fn test_team_access_denied_for_non_member() {
    let owner = seed_user("Judy");
    let outsider = seed_user("Mallory");
    let team = seed_team(vec![owner.id.clone()], &owner.id);
    let token = jwt::generate_token(&outsider).unwrap();

    let app = test::init_service(App::new().configure(team_routes::init_routes)).await;

    let request = test::TestRequest::get()
        .uri(&format!("/teams/{}", team.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 403);

    let _ = user_storage::delete_user(&outsider.id);
    cleanup(&team, "");
}
