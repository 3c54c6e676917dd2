use axum::{Json, debug_handler, extract::State};
use serde_json::{Map, Value, json};
use sqlx::SqlitePool;

use crate::{
    ApiResponse, AppResult, AppState,
    auth::{AuthUser, UserType},
};

use super::BookingStatus;

#[debug_handler(state = AppState)]
pub(crate) async fn overview(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<ApiResponse>> {
    let side = match user.user_type {
        UserType::Customer => "customer_id",
        UserType::Model => "model_id",
    };

    let counts: Vec<(BookingStatus, i64)> = sqlx::query_as(&format!(
        "SELECT status, COUNT(*) FROM bookings WHERE {side} = ? GROUP BY status"
    ))
    .bind(user.id.to_string())
    .fetch_all(&db_pool)
    .await?;

    let mut overview = Map::new();
    for status in [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
        BookingStatus::NoShow,
    ] {
        overview.insert(status.as_str().to_owned(), json!(0));
    }
    let mut total = 0;
    for (status, count) in counts {
        total += count;
        overview.insert(status.as_str().to_owned(), json!(count));
    }
    overview.insert("total".to_owned(), json!(total));

    Ok(ApiResponse::data(json!({ "stats": overview })))
}
