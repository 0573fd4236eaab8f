// timehaven-service/src/models/mod.rs
use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use actix_web::{HttpResponse, ResponseError};

// Availability record and heatmap models
pub mod availability;
pub use availability::*;

// Calendar provider models
pub mod calendar;
pub use calendar::*;

// Team models
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    // Membership is a set: a duplicated id in a stored document would
    // double-count that member in every heatmap, so deduplicate on read
    #[serde(deserialize_with = "dedup_ids")]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub team_lead_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }

    // Team leads are the admins of a team
    pub fn is_lead(&self, user_id: &str) -> bool {
        self.team_lead_ids.iter().any(|id| id == user_id)
    }
}

// User model (read-side: accounts are provisioned by the auth service)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub calendar_provider: Option<CalendarProvider>,
    #[serde(default)]
    pub google_access_token: Option<String>,
    #[serde(default)]
    pub outlook_access_token: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl User {
    // Returns the connected provider and its access token, if the user
    // linked a calendar and the matching token is present.
    pub fn connected_calendar(&self) -> Option<(CalendarProvider, &str)> {
        match self.calendar_provider {
            Some(CalendarProvider::Google) => self
                .google_access_token
                .as_deref()
                .map(|token| (CalendarProvider::Google, token)),
            Some(CalendarProvider::Outlook) => self
                .outlook_access_token
                .as_deref()
                .map(|token| (CalendarProvider::Outlook, token)),
            None => None,
        }
    }
}

// Member view returned by the team members endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamMemberView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub timezone: String,
    pub is_active: bool,
    pub profile_image: Option<String>,
    pub is_admin: bool,
    pub role: String,
}

// Drop repeated ids while keeping first-seen order
fn dedup_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Vec::<String>::deserialize(deserializer)?;
    let mut seen = HashSet::new();
    Ok(ids.into_iter().filter(|id| seen.insert(id.clone())).collect())
}

fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "UTC".to_string()
}

// JWT claims structure for authentication
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,  // Subject (user ID)
    pub email: String,
    pub exp: usize,   // Expiration time
    pub iat: usize,   // Issued at
}

// Custom error types
#[derive(Debug)]
pub enum ServiceError {
    InternalServerError,
    BadRequest(String),
    Unauthorized,
    NotFound,
    Forbidden,
    ProviderUnavailable(String),
}

// Implement Display for ServiceError
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::InternalServerError => write!(f, "Internal Server Error"),
            ServiceError::BadRequest(msg) => write!(f, "BadRequest: {}", msg),
            ServiceError::Unauthorized => write!(f, "Unauthorized"),
            ServiceError::NotFound => write!(f, "Not Found"),
            ServiceError::Forbidden => write!(f, "Forbidden"),
            ServiceError::ProviderUnavailable(msg) => write!(f, "Provider Unavailable: {}", msg),
        }
    }
}

// Implement std::error::Error for ServiceError
impl std::error::Error for ServiceError {}

// Implement ResponseError for ServiceError
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError =>
                HttpResponse::InternalServerError().json("Internal Server Error"),
            ServiceError::BadRequest(ref message) =>
                HttpResponse::BadRequest().json(message),
            ServiceError::Unauthorized =>
                HttpResponse::Unauthorized().json("Unauthorized"),
            ServiceError::NotFound =>
                HttpResponse::NotFound().json("Not Found"),
            ServiceError::Forbidden =>
                HttpResponse::Forbidden().json("Forbidden: You don't have permission to access this resource"),
            ServiceError::ProviderUnavailable(ref message) =>
                HttpResponse::BadGateway().json(message),
        }
    }
}
