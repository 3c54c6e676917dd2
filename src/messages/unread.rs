use axum::{Json, debug_handler, extract::State};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{ApiResponse, AppResult, AppState, auth::AuthUser};

#[debug_handler(state = AppState)]
pub(crate) async fn unread_count(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<ApiResponse>> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM messages WHERE receiver_id = ? AND is_read = 0 AND is_deleted = 0",
    )
    .bind(user.id.to_string())
    .fetch_one(&db_pool)
    .await?;

    Ok(ApiResponse::data(json!({ "unread_count": count })))
}
