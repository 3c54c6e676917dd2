use axum::{Json, debug_handler, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, validate};

use super::{JwtKeys, User, verify_password};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    State(keys): State<JwtKeys>,
    Json(body): Json<LoginBody>,
) -> AppResult<impl IntoResponse> {
    let mut errors = Vec::new();

    let email = body
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    if !validate::email_ok(&email) {
        errors.push(FieldError::new("email", "a valid email is required"));
    }

    let password = body.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let Some(mut user): Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&db_pool)
        .await?
    else {
        return Err(AppError::Unauthorized("Invalid credentials".to_owned()));
    };

    if !verify_password(password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_owned()));
    }

    let now = OffsetDateTime::now_utc();
    sqlx::query("UPDATE users SET last_login = ?, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(now)
        .bind(&user.id)
        .execute(&db_pool)
        .await?;
    user.last_login = Some(now);
    user.updated_at = now;

    info!("login {}", user.email);

    let token = keys.issue(
        Uuid::parse_str(&user.id).map_err(anyhow::Error::from)?,
        user.user_type,
    )?;
    Ok(ApiResponse::with_message(
        "Login successful",
        json!({ "user": user.public_json(), "token": token }),
    ))
}
