use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ApiResponse, AppError, AppResult, AppState, FieldError, auth::AuthUser, validate};

use super::{Category, Ethnicity, ProfileRow};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RatesBody {
    incall: Option<String>,
    outcall: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateProfileBody {
    name: Option<String>,
    age: Option<i64>,
    location: Option<String>,
    description: Option<String>,
    services: Option<Vec<String>>,
    ethnicity: Option<String>,
    category: Option<String>,
    #[serde(default)]
    rates: RatesBody,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    user: AuthUser,
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    Json(body): Json<UpdateProfileBody>,
) -> AppResult<Json<ApiResponse>> {
    user.require_model()?;

    let mut errors = Vec::new();

    if let Some(name) = body.name.as_deref().map(str::trim) {
        if !(2..=100).contains(&name.chars().count()) {
            errors.push(FieldError::new("name", "name must be 2 to 100 characters"));
        }
    }
    if let Some(age) = body.age {
        if !(18..=100).contains(&age) {
            errors.push(FieldError::new("age", "age must be between 18 and 100"));
        }
    }
    if let Some(location) = body.location.as_deref().map(str::trim) {
        if !(2..=100).contains(&location.chars().count()) {
            errors.push(FieldError::new(
                "location",
                "location must be 2 to 100 characters",
            ));
        }
    }
    if let Some(description) = body.description.as_deref() {
        if description.chars().count() > 2000 {
            errors.push(FieldError::new(
                "description",
                "description cannot exceed 2000 characters",
            ));
        }
    }
    let ethnicity = match body.ethnicity.as_deref() {
        None => None,
        Some(raw) => match Ethnicity::parse(raw) {
            Some(e) => Some(e),
            None => {
                errors.push(FieldError::new("ethnicity", "unknown ethnicity"));
                None
            }
        },
    };
    let category = match body.category.as_deref() {
        None => None,
        Some(raw) => match Category::parse(raw) {
            Some(c) => Some(c),
            None => {
                errors.push(FieldError::new(
                    "category",
                    "category must be independent or agency",
                ));
                None
            }
        },
    };
    if let Some(rate) = body.rates.incall.as_deref().map(str::trim) {
        if !validate::rate_ok(rate) {
            errors.push(FieldError::new(
                "rates.incall",
                "rate must look like €150/h",
            ));
        }
    }
    if let Some(rate) = body.rates.outcall.as_deref().map(str::trim) {
        if !validate::rate_ok(rate) {
            errors.push(FieldError::new(
                "rates.outcall",
                "rate must look like €200/h",
            ));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Owner check doubles as the lookup: models can only touch their own
    // listing.
    let Some(mut profile): Option<ProfileRow> =
        sqlx::query_as("SELECT * FROM profiles WHERE id = ? AND user_id = ?")
            .bind(profile_id.to_string())
            .bind(user.id.to_string())
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::NotFound(
            "Profile not found or not yours".to_owned(),
        ));
    };

    if let Some(name) = body.name.as_deref().map(str::trim) {
        profile.name = name.to_owned();
    }
    if let Some(age) = body.age {
        profile.age = age;
    }
    if let Some(location) = body.location.as_deref().map(str::trim) {
        profile.location = location.to_owned();
    }
    if let Some(description) = body.description.as_deref() {
        profile.description = description.to_owned();
    }
    if let Some(services) = &body.services {
        profile.services = serde_json::to_string(services).map_err(anyhow::Error::from)?;
    }
    if let Some(ethnicity) = ethnicity {
        profile.ethnicity = ethnicity;
    }
    if let Some(category) = category {
        profile.category = category;
    }
    if let Some(rate) = body.rates.incall.as_deref().map(str::trim) {
        profile.rates_incall = rate.to_owned();
    }
    if let Some(rate) = body.rates.outcall.as_deref().map(str::trim) {
        profile.rates_outcall = rate.to_owned();
    }
    profile.updated_at = OffsetDateTime::now_utc();

    sqlx::query(
        "UPDATE profiles SET name = ?, age = ?, location = ?, description = ?, services = ?, \
         ethnicity = ?, category = ?, rates_incall = ?, rates_outcall = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&profile.name)
    .bind(profile.age)
    .bind(&profile.location)
    .bind(&profile.description)
    .bind(&profile.services)
    .bind(profile.ethnicity)
    .bind(profile.category)
    .bind(&profile.rates_incall)
    .bind(&profile.rates_outcall)
    .bind(profile.updated_at)
    .bind(&profile.id)
    .execute(&db_pool)
    .await?;

    Ok(ApiResponse::with_message(
        "Profile updated successfully",
        json!({ "profile": profile.detail() }),
    ))
}
