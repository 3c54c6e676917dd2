use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, auth::AuthUser};

use super::{BookingJoinedRow, JOINED_SELECT};

#[debug_handler(state = AppState)]
pub(crate) async fn detail(
    user: AuthUser,
    Path(booking_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<ApiResponse>> {
    let Some(booking): Option<BookingJoinedRow> =
        sqlx::query_as(&format!("{JOINED_SELECT} WHERE b.id = ?"))
            .bind(booking_id.to_string())
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::NotFound("Booking not found".to_owned()));
    };

    let caller = user.id.to_string();
    if booking.booking.customer_id != caller && booking.booking.model_id != caller {
        return Err(AppError::Forbidden(
            "Not authorized to view this booking".to_owned(),
        ));
    }

    Ok(ApiResponse::data(json!({ "booking": booking.json() })))
}
