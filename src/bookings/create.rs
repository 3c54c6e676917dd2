use axum::{Json, debug_handler, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::{Date, OffsetDateTime, macros::format_description};
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiResponse, AppError, AppResult, AppState, FieldError, auth::AuthUser,
    error::is_unique_violation, validate,
};

use super::{BookingJoinedRow, JOINED_SELECT, PaymentMethod, ServiceType, confirmation_code};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LocationBody {
    address: Option<String>,
    city: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PricingBody {
    hourly_rate: Option<f64>,
    total_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateBookingBody {
    model_id: Option<String>,
    profile_id: Option<String>,
    date: Option<String>,
    time: Option<String>,
    duration: Option<i64>,
    service_type: Option<String>,
    services: Option<Vec<String>>,
    #[serde(default)]
    location: LocationBody,
    #[serde(default)]
    pricing: PricingBody,
    customer_phone: Option<String>,
    customer_notes: Option<String>,
    payment_method: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
    Json(body): Json<CreateBookingBody>,
) -> AppResult<impl IntoResponse> {
    user.require_customer()?;

    let mut errors = Vec::new();

    let model_id = body.model_id.as_deref().and_then(|s| Uuid::parse_str(s).ok());
    if model_id.is_none() {
        errors.push(FieldError::new("model_id", "invalid model id"));
    }
    let profile_id = body
        .profile_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok());
    if profile_id.is_none() {
        errors.push(FieldError::new("profile_id", "invalid profile id"));
    }

    let format = format_description!("[year]-[month]-[day]");
    let date = body
        .date
        .as_deref()
        .and_then(|s| Date::parse(s, &format).ok());
    match date {
        None => errors.push(FieldError::new("date", "date must be YYYY-MM-DD")),
        Some(d) if d <= OffsetDateTime::now_utc().date() => {
            errors.push(FieldError::new("date", "date must be in the future"));
        }
        Some(_) => {}
    }

    let time = body.time.as_deref().map(str::trim).unwrap_or_default();
    if !validate::clock_time_ok(time) {
        errors.push(FieldError::new("time", "time must be HH:MM"));
    }

    let duration = body.duration.unwrap_or(0);
    if !(1..=24).contains(&duration) {
        errors.push(FieldError::new(
            "duration",
            "duration must be between 1 and 24 hours",
        ));
    }

    let service_type = body.service_type.as_deref().and_then(ServiceType::parse);
    if service_type.is_none() {
        errors.push(FieldError::new(
            "service_type",
            "service_type must be incall or outcall",
        ));
    }

    let services = body.services.as_deref().unwrap_or_default();
    if services.is_empty() {
        errors.push(FieldError::new("services", "at least one service is required"));
    }

    let customer_phone = body
        .customer_phone
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if !validate::phone_ok(customer_phone) {
        errors.push(FieldError::new(
            "customer_phone",
            "a valid phone number is required",
        ));
    }

    if body.pricing.hourly_rate.is_none() {
        errors.push(FieldError::new("pricing.hourly_rate", "hourly rate is required"));
    }
    if body.pricing.total_amount.is_none() {
        errors.push(FieldError::new("pricing.total_amount", "total amount is required"));
    }

    if body
        .customer_notes
        .as_deref()
        .is_some_and(|n| n.chars().count() > 500)
    {
        errors.push(FieldError::new(
            "customer_notes",
            "notes cannot exceed 500 characters",
        ));
    }

    let payment_method = match body.payment_method.as_deref() {
        None => PaymentMethod::Cash,
        Some(raw) => PaymentMethod::parse(raw).unwrap_or_else(|| {
            errors.push(FieldError::new(
                "payment_method",
                "payment_method must be cash, card or transfer",
            ));
            PaymentMethod::Cash
        }),
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let (model_id, profile_id) = (
        model_id.expect("checked above"),
        profile_id.expect("checked above"),
    );
    let date = date.expect("checked above");
    let service_type = service_type.expect("checked above");

    // Conflict check and insert in one transaction; the partial unique index
    // on (model_id, date) catches whatever races past the read.
    let mut tx = db_pool.begin().await?;

    let profile: Option<(String,)> =
        sqlx::query_as("SELECT id FROM profiles WHERE id = ? AND user_id = ?")
            .bind(profile_id.to_string())
            .bind(model_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
    if profile.is_none() {
        return Err(AppError::NotFound("Profile not found".to_owned()));
    }

    let clash: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM bookings WHERE model_id = ? AND date = ? \
         AND status IN ('pending', 'confirmed') LIMIT 1",
    )
    .bind(model_id.to_string())
    .bind(date)
    .fetch_optional(&mut *tx)
    .await?;
    if clash.is_some() {
        return Err(AppError::Conflict(
            "A booking already exists for this date".to_owned(),
        ));
    }

    let id = Uuid::now_v7();
    let code = confirmation_code();
    let now = OffsetDateTime::now_utc();
    let insert = sqlx::query(
        "INSERT INTO bookings (id, customer_id, model_id, profile_id, date, time, duration, \
         service_type, services, location_address, location_city, location_notes, hourly_rate, \
         total_amount, currency, status, customer_notes, customer_phone, payment_status, \
         payment_method, confirmation_code, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'EUR', 'pending', ?, ?, 'pending', ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(user.id.to_string())
    .bind(model_id.to_string())
    .bind(profile_id.to_string())
    .bind(date)
    .bind(time)
    .bind(duration)
    .bind(service_type)
    .bind(serde_json::to_string(services).map_err(anyhow::Error::from)?)
    .bind(&body.location.address)
    .bind(&body.location.city)
    .bind(&body.location.notes)
    .bind(body.pricing.hourly_rate)
    .bind(body.pricing.total_amount)
    .bind(body.customer_notes.as_deref().unwrap_or(""))
    .bind(customer_phone)
    .bind(payment_method)
    .bind(&code)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await;

    match insert {
        Ok(_) => {}
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict(
                "A booking already exists for this date".to_owned(),
            ));
        }
        Err(err) => return Err(err.into()),
    }

    tx.commit().await?;

    info!("booking {code} created for model {model_id}");

    let booking: BookingJoinedRow =
        sqlx::query_as(&format!("{JOINED_SELECT} WHERE b.id = ?"))
            .bind(id.to_string())
            .fetch_one(&db_pool)
            .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Booking created successfully",
            json!({ "booking": booking.json() }),
        ),
    ))
}
