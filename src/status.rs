//! Plain status-check endpoints, kept for compatibility with older clients.

use axum::{
    Json, Router, debug_handler,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, rfc3339};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_checks).post(create_check))
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCheckRow {
    id: String,
    client_name: String,
    timestamp: OffsetDateTime,
}

impl StatusCheckRow {
    fn json(&self) -> Value {
        json!({
            "id": self.id,
            "client_name": self.client_name,
            "timestamp": rfc3339(self.timestamp),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CreateCheckBody {
    client_name: Option<String>,
}

#[debug_handler(state = AppState)]
async fn create_check(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<CreateCheckBody>,
) -> AppResult<impl IntoResponse> {
    let client_name = body
        .client_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if client_name.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "client_name",
            "client name is required",
        )]));
    }

    let row = StatusCheckRow {
        id: Uuid::now_v7().to_string(),
        client_name: client_name.to_owned(),
        timestamp: OffsetDateTime::now_utc(),
    };
    sqlx::query("INSERT INTO status_checks (id, client_name, timestamp) VALUES (?, ?, ?)")
        .bind(&row.id)
        .bind(&row.client_name)
        .bind(row.timestamp)
        .execute(&db_pool)
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::data(row.json())))
}

#[debug_handler(state = AppState)]
async fn list_checks(State(db_pool): State<SqlitePool>) -> AppResult<Json<ApiResponse>> {
    let rows: Vec<StatusCheckRow> =
        sqlx::query_as("SELECT * FROM status_checks ORDER BY timestamp DESC LIMIT 1000")
            .fetch_all(&db_pool)
            .await?;

    let checks: Vec<_> = rows.iter().map(StatusCheckRow::json).collect();
    Ok(ApiResponse::data(json!(checks)))
}
