use axum::{Json, debug_handler, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, profiles, validate};

use super::{JwtKeys, User, UserType, hash_password};

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
    age: Option<i64>,
    user_type: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    State(keys): State<JwtKeys>,
    Json(body): Json<RegisterBody>,
) -> AppResult<impl IntoResponse> {
    let mut errors = Vec::new();

    let name = body.name.as_deref().map(str::trim).unwrap_or_default();
    if !(2..=100).contains(&name.chars().count()) {
        errors.push(FieldError::new("name", "name must be 2 to 100 characters"));
    }

    let email = body
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    if !validate::email_ok(&email) {
        errors.push(FieldError::new("email", "a valid email is required"));
    }

    let password = body.password.as_deref().unwrap_or_default();
    if password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "password must be at least 6 characters",
        ));
    }

    let phone = body.phone.as_deref().map(str::trim).unwrap_or_default();
    if !validate::phone_ok(phone) {
        errors.push(FieldError::new("phone", "a valid phone number is required"));
    }

    let age = body.age.unwrap_or(0);
    if !(18..=100).contains(&age) {
        errors.push(FieldError::new("age", "age must be between 18 and 100"));
    }

    let user_type = body.user_type.as_deref().and_then(UserType::parse);
    if user_type.is_none() {
        errors.push(FieldError::new(
            "user_type",
            "user_type must be customer or model",
        ));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let user_type = user_type.expect("checked above");

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&db_pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "A user with this email already exists".to_owned(),
        ));
    }

    let id = Uuid::now_v7();
    let now = OffsetDateTime::now_utc();
    let user = User {
        id: id.to_string(),
        name: name.to_owned(),
        email,
        password_hash: hash_password(password)?,
        phone: phone.to_owned(),
        age,
        user_type,
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, phone, age, user_type, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.phone)
    .bind(user.age)
    .bind(user.user_type)
    .bind(now)
    .bind(now)
    .execute(&db_pool)
    .await?;

    // Models get a listing straight away so they show up in search.
    if user.user_type == UserType::Model {
        profiles::seed_for_model(&db_pool, &user).await?;
    }

    info!("registered {} ({:?})", user.email, user.user_type);

    let token = keys.issue(id, user.user_type)?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "User registered successfully",
            json!({ "user": user.public_json(), "token": token }),
        ),
    ))
}
