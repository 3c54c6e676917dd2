//! velvetline — REST backend for a companion-booking marketplace.
//!
//! Five route modules (auth, profiles, messages, bookings, status) nested
//! under `/api`, all speaking the `{success, message, data}` envelope.

pub mod auth;
pub mod bookings;
pub mod config;
pub mod db;
pub mod error;
pub mod messages;
pub mod pagination;
pub mod profiles;
pub mod status;
pub mod validate;

use axum::{Json, Router, extract::FromRef, http::StatusCode, routing::get};
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{AppError, AppResult, FieldError};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub keys: auth::JwtKeys,
}

/// The uniform response envelope. Errors render their own shape in
/// [`error::AppError`].
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn data(data: Value) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: None,
        })
    }

    pub fn with_message(message: impl Into<String>, data: Value) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(health))
        .nest("/api/auth", auth::router())
        .nest("/api/profiles", profiles::router())
        .nest("/api/messages", messages::router())
        .nest("/api/bookings", bookings::router())
        .nest("/api/status", status::router())
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<ApiResponse> {
    ApiResponse::message("velvetline API")
}

async fn not_found() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse {
            success: false,
            message: Some("Route not found".to_owned()),
            data: None,
        }),
    )
}

pub fn rfc3339(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_default()
}

pub fn rfc3339_opt(dt: Option<OffsetDateTime>) -> Option<String> {
    dt.map(rfc3339)
}
