// src/routes/mod.rs
pub mod availability_routes;
pub mod team_routes;

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

// Basic health probe
#[get("/test")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "TimeHaven backend is running!" }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
