use axum::{Json, debug_handler, extract::State};
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::{ApiResponse, AppResult, AppState, auth::AuthUser, rfc3339};

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    profile_id: String,
    other_user_id: String,
    other_name: String,
    other_email: String,
    profile_name: String,
    last_message: String,
    last_message_at: OffsetDateTime,
    unread_count: i64,
}

/// One row per (listing, counterpart) pair the caller has exchanged
/// messages about, newest first.
const INBOX_SQL: &str = "WITH thread AS ( \
     SELECT profile_id, \
            CASE WHEN sender_id = ? THEN receiver_id ELSE sender_id END AS other_user_id, \
            content, created_at, \
            CASE WHEN receiver_id = ? AND is_read = 0 THEN 1 ELSE 0 END AS unread \
     FROM messages \
     WHERE (sender_id = ? OR receiver_id = ?) AND is_deleted = 0 \
     ) \
     SELECT t.profile_id, t.other_user_id, \
            u.name AS other_name, u.email AS other_email, \
            p.name AS profile_name, \
            (SELECT t2.content FROM thread t2 \
             WHERE t2.profile_id = t.profile_id AND t2.other_user_id = t.other_user_id \
             ORDER BY t2.created_at DESC LIMIT 1) AS last_message, \
            MAX(t.created_at) AS last_message_at, \
            SUM(t.unread) AS unread_count \
     FROM thread t \
     JOIN users u ON u.id = t.other_user_id \
     JOIN profiles p ON p.id = t.profile_id \
     GROUP BY t.profile_id, t.other_user_id \
     ORDER BY last_message_at DESC \
     LIMIT 50";

#[debug_handler(state = AppState)]
pub(crate) async fn conversations(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<ApiResponse>> {
    let caller = user.id.to_string();
    let rows: Vec<ConversationRow> = sqlx::query_as(INBOX_SQL)
        .bind(&caller)
        .bind(&caller)
        .bind(&caller)
        .bind(&caller)
        .fetch_all(&db_pool)
        .await?;

    let conversations: Vec<_> = rows
        .iter()
        .map(|row| {
            json!({
                "profile_id": row.profile_id,
                "other_user_id": row.other_user_id,
                "other_user": { "id": row.other_user_id, "name": row.other_name, "email": row.other_email },
                "profile": { "id": row.profile_id, "name": row.profile_name },
                "last_message": row.last_message,
                "last_message_date": rfc3339(row.last_message_at),
                "unread_count": row.unread_count,
            })
        })
        .collect();

    Ok(ApiResponse::data(json!({ "conversations": conversations })))
}
