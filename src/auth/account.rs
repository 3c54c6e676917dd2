use axum::{Json, debug_handler, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, validate};

use super::{AuthUser, User};

#[debug_handler(state = AppState)]
pub(crate) async fn me(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
) -> AppResult<impl IntoResponse> {
    let Some(row): Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(user.id.to_string())
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::NotFound("User not found".to_owned()));
    };

    Ok(ApiResponse::data(json!({ "user": row.public_json() })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateAccountBody {
    name: Option<String>,
    phone: Option<String>,
    age: Option<i64>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_account(
    user: AuthUser,
    State(db_pool): State<SqlitePool>,
    Json(body): Json<UpdateAccountBody>,
) -> AppResult<impl IntoResponse> {
    let mut errors = Vec::new();

    if let Some(name) = body.name.as_deref().map(str::trim) {
        if !(2..=100).contains(&name.chars().count()) {
            errors.push(FieldError::new("name", "name must be 2 to 100 characters"));
        }
    }
    if let Some(phone) = body.phone.as_deref().map(str::trim) {
        if !validate::phone_ok(phone) {
            errors.push(FieldError::new("phone", "a valid phone number is required"));
        }
    }
    if let Some(age) = body.age {
        if !(18..=100).contains(&age) {
            errors.push(FieldError::new("age", "age must be between 18 and 100"));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let Some(mut row): Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(user.id.to_string())
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::NotFound("User not found".to_owned()));
    };

    if let Some(name) = body.name.as_deref().map(str::trim) {
        row.name = name.to_owned();
    }
    if let Some(phone) = body.phone.as_deref().map(str::trim) {
        row.phone = phone.to_owned();
    }
    if let Some(age) = body.age {
        row.age = age;
    }
    row.updated_at = OffsetDateTime::now_utc();

    sqlx::query("UPDATE users SET name = ?, phone = ?, age = ?, updated_at = ? WHERE id = ?")
        .bind(&row.name)
        .bind(&row.phone)
        .bind(row.age)
        .bind(row.updated_at)
        .bind(&row.id)
        .execute(&db_pool)
        .await?;

    Ok(ApiResponse::with_message(
        "Account updated successfully",
        json!({ "user": row.public_json() }),
    ))
}
