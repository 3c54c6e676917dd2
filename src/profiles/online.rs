use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, auth::AuthUser};

#[derive(Debug, Deserialize)]
pub(crate) struct OnlineStatusBody {
    is_online: Option<bool>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn online_status(
    user: AuthUser,
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    Json(body): Json<OnlineStatusBody>,
) -> AppResult<Json<ApiResponse>> {
    user.require_model()?;

    let Some(is_online) = body.is_online else {
        return Err(AppError::Validation(vec![FieldError::new(
            "is_online",
            "is_online must be a boolean",
        )]));
    };

    let now = OffsetDateTime::now_utc();
    let updated = sqlx::query(
        "UPDATE profiles SET is_online = ?, last_active = ?, updated_at = ? \
         WHERE id = ? AND user_id = ?",
    )
    .bind(is_online)
    .bind(now)
    .bind(now)
    .bind(profile_id.to_string())
    .bind(user.id.to_string())
    .execute(&db_pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("Profile not found".to_owned()));
    }

    Ok(ApiResponse::message("Status updated successfully"))
}
