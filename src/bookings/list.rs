use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    ApiResponse, AppError, AppResult, AppState, FieldError, auth::{AuthUser, UserType},
    pagination::Pagination,
};

use super::{BookingJoinedRow, BookingStatus, JOINED_SELECT};

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    status: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
    Query(page): Query<Pagination>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse>> {
    let mut errors = Vec::new();
    page.check(&mut errors);

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match BookingStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                errors.push(FieldError::new("status", "unknown booking status"));
                None
            }
        },
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Customers see the bookings they made, models the ones made with them.
    let side = match user.user_type {
        UserType::Customer => "b.customer_id",
        UserType::Model => "b.model_id",
    };

    let (total, rows): (i64, Vec<BookingJoinedRow>) = match status {
        Some(status) => {
            let (total,): (i64,) = sqlx::query_as(&format!(
                "SELECT COUNT(*) FROM bookings b WHERE {side} = ? AND b.status = ?"
            ))
            .bind(user.id.to_string())
            .bind(status)
            .fetch_one(&db_pool)
            .await?;
            let rows = sqlx::query_as(&format!(
                "{JOINED_SELECT} WHERE {side} = ? AND b.status = ? \
                 ORDER BY b.created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(user.id.to_string())
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&db_pool)
            .await?;
            (total, rows)
        }
        None => {
            let (total,): (i64,) =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM bookings b WHERE {side} = ?"))
                    .bind(user.id.to_string())
                    .fetch_one(&db_pool)
                    .await?;
            let rows = sqlx::query_as(&format!(
                "{JOINED_SELECT} WHERE {side} = ? ORDER BY b.created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(user.id.to_string())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&db_pool)
            .await?;
            (total, rows)
        }
    };

    let bookings: Vec<_> = rows.iter().map(BookingJoinedRow::json).collect();
    Ok(ApiResponse::data(json!({
        "bookings": bookings,
        "pagination": page.meta(total),
    })))
}
