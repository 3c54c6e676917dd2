use axum::{Json, debug_handler, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, auth::AuthUser};

use super::{JOINED_SELECT, MessageJoinedRow};

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageBody {
    receiver_id: Option<String>,
    profile_id: Option<String>,
    content: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
    Json(body): Json<SendMessageBody>,
) -> AppResult<impl IntoResponse> {
    let mut errors = Vec::new();

    let receiver_id = body
        .receiver_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok());
    if receiver_id.is_none() {
        errors.push(FieldError::new("receiver_id", "invalid receiver id"));
    }
    let profile_id = body
        .profile_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok());
    if profile_id.is_none() {
        errors.push(FieldError::new("profile_id", "invalid profile id"));
    }
    let content = body.content.as_deref().map(str::trim).unwrap_or_default();
    if content.is_empty() || content.chars().count() > 1000 {
        errors.push(FieldError::new(
            "content",
            "content is required and cannot exceed 1000 characters",
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let (receiver_id, profile_id) = (
        receiver_id.expect("checked above"),
        profile_id.expect("checked above"),
    );

    let profile: Option<(String,)> = sqlx::query_as("SELECT id FROM profiles WHERE id = ?")
        .bind(profile_id.to_string())
        .fetch_optional(&db_pool)
        .await?;
    if profile.is_none() {
        return Err(AppError::NotFound("Profile not found".to_owned()));
    }

    let id = Uuid::now_v7();
    let now = OffsetDateTime::now_utc();
    sqlx::query(
        "INSERT INTO messages (id, sender_id, receiver_id, profile_id, content, message_type, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, 'text', ?, ?)",
    )
    .bind(id.to_string())
    .bind(user.id.to_string())
    .bind(receiver_id.to_string())
    .bind(profile_id.to_string())
    .bind(content)
    .bind(now)
    .bind(now)
    .execute(&db_pool)
    .await?;

    let message: MessageJoinedRow = sqlx::query_as(&format!("{JOINED_SELECT} WHERE m.id = ?"))
        .bind(id.to_string())
        .fetch_one(&db_pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Message sent successfully",
            json!({ "message": message.json() }),
        ),
    ))
}
