use axum::{
    Json, debug_handler,
    extract::{Path, Query, State},
};
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    ApiResponse, AppError, AppResult, AppState, auth::AuthUser, pagination::Pagination,
};

use super::{JOINED_SELECT, MessageJoinedRow};

#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    user: AuthUser,
    Path((other_user_id, profile_id)): Path<(Uuid, Uuid)>,
    State(db_pool): State<SqlitePool>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<ApiResponse>> {
    let mut errors = Vec::new();
    page.check(&mut errors);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let caller = user.id.to_string();
    let other = other_user_id.to_string();

    let rows: Vec<MessageJoinedRow> = sqlx::query_as(&format!(
        "{JOINED_SELECT} WHERE ((m.sender_id = ? AND m.receiver_id = ?) \
         OR (m.sender_id = ? AND m.receiver_id = ?)) \
         AND m.profile_id = ? AND m.is_deleted = 0 \
         ORDER BY m.created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(&caller)
    .bind(&other)
    .bind(&other)
    .bind(&caller)
    .bind(profile_id.to_string())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&db_pool)
    .await?;

    // Fetching the thread counts as reading it.
    sqlx::query(
        "UPDATE messages SET is_read = 1, read_at = ? \
         WHERE sender_id = ? AND receiver_id = ? AND profile_id = ? AND is_read = 0",
    )
    .bind(OffsetDateTime::now_utc())
    .bind(&other)
    .bind(&caller)
    .bind(profile_id.to_string())
    .execute(&db_pool)
    .await?;

    // Queried newest-first for the page window, shown oldest-first.
    let messages: Vec<_> = rows.iter().rev().map(MessageJoinedRow::json).collect();

    Ok(ApiResponse::data(json!({
        "messages": messages,
        "pagination": { "page": page.page(), "limit": page.limit() },
    })))
}
