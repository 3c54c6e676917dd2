use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState};

use super::ProfileRow;

#[debug_handler(state = AppState)]
pub(crate) async fn detail(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<ApiResponse>> {
    // Every view counts, so bump the counters and read the row in one go.
    let row: Option<ProfileRow> = sqlx::query_as(
        "UPDATE profiles SET views_total = views_total + 1, views_week = views_week + 1, \
         views_month = views_month + 1 \
         WHERE id = ? AND is_active = 1 RETURNING *",
    )
    .bind(profile_id.to_string())
    .fetch_optional(&db_pool)
    .await?;

    let Some(profile) = row else {
        return Err(AppError::NotFound("Profile not found".to_owned()));
    };

    Ok(ApiResponse::data(json!({ "profile": profile.detail() })))
}
