use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, auth::AuthUser};

use super::{BookingJoinedRow, BookingRow, BookingStatus, JOINED_SELECT};

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateStatusBody {
    status: Option<String>,
    notes: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_status(
    user: AuthUser,
    Path(booking_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    Json(body): Json<UpdateStatusBody>,
) -> AppResult<Json<ApiResponse>> {
    let mut errors = Vec::new();

    let next = body.status.as_deref().and_then(BookingStatus::parse);
    // `pending` is the starting state, never a target.
    let next = match next {
        Some(BookingStatus::Pending) | None => {
            errors.push(FieldError::new(
                "status",
                "status must be confirmed, cancelled, completed or no-show",
            ));
            None
        }
        some => some,
    };

    let notes = body.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
    if notes.is_some_and(|n| n.chars().count() > 500) {
        errors.push(FieldError::new("notes", "notes cannot exceed 500 characters"));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let next = next.expect("checked above");

    let Some(booking): Option<BookingRow> = sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
        .bind(booking_id.to_string())
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::NotFound("Booking not found".to_owned()));
    };

    let caller = user.id.to_string();
    let is_customer = booking.customer_id == caller;
    let is_model = booking.model_id == caller;
    if !is_customer && !is_model {
        return Err(AppError::Forbidden(
            "Not authorized to update this booking".to_owned(),
        ));
    }

    // Cancelling is open to both sides; everything else is the model's call.
    if next != BookingStatus::Cancelled && !is_model {
        return Err(AppError::Forbidden(format!(
            "Only the model can mark a booking {next}"
        )));
    }

    if !booking.status.can_transition(next) {
        return Err(AppError::IllegalTransition(format!(
            "Cannot move a {} booking to {next}",
            booking.status
        )));
    }

    let now = OffsetDateTime::now_utc();
    match next {
        BookingStatus::Cancelled => {
            sqlx::query(
                "UPDATE bookings SET status = ?, cancelled_by = ?, cancelled_at = ?, \
                 cancellation_reason = ?, updated_at = ? WHERE id = ?",
            )
            .bind(next)
            .bind(&caller)
            .bind(now)
            .bind(notes)
            .bind(now)
            .bind(&booking.id)
            .execute(&db_pool)
            .await?;
        }
        BookingStatus::Completed => {
            sqlx::query(
                "UPDATE bookings SET status = ?, completed_at = ?, updated_at = ? WHERE id = ?",
            )
            .bind(next)
            .bind(now)
            .bind(now)
            .bind(&booking.id)
            .execute(&db_pool)
            .await?;
        }
        _ => {
            sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
                .bind(next)
                .bind(now)
                .bind(&booking.id)
                .execute(&db_pool)
                .await?;
        }
    }

    if let Some(notes) = notes {
        let column = if is_customer {
            "customer_notes"
        } else {
            "model_notes"
        };
        sqlx::query(&format!(
            "UPDATE bookings SET {column} = ?, updated_at = ? WHERE id = ?"
        ))
        .bind(notes)
        .bind(now)
        .bind(&booking.id)
        .execute(&db_pool)
        .await?;
    }

    info!("booking {} -> {next}", booking.confirmation_code);

    let updated: BookingJoinedRow = sqlx::query_as(&format!("{JOINED_SELECT} WHERE b.id = ?"))
        .bind(&booking.id)
        .fetch_one(&db_pool)
        .await?;

    Ok(ApiResponse::with_message(
        "Booking status updated successfully",
        json!({ "booking": updated.json() }),
    ))
}
