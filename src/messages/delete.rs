use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, auth::AuthUser};

/// Soft delete: the row stays for the other participant's history, it just
/// stops showing up anywhere.
#[debug_handler(state = AppState)]
pub(crate) async fn delete_message(
    user: AuthUser,
    Path(message_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<ApiResponse>> {
    let caller = user.id.to_string();
    let updated = sqlx::query(
        "UPDATE messages SET is_deleted = 1, updated_at = ? \
         WHERE id = ? AND is_deleted = 0 AND (sender_id = ? OR receiver_id = ?)",
    )
    .bind(OffsetDateTime::now_utc())
    .bind(message_id.to_string())
    .bind(&caller)
    .bind(&caller)
    .execute(&db_pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("Message not found".to_owned()));
    }

    Ok(ApiResponse::message("Message deleted successfully"))
}
