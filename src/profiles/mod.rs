mod detail;
mod list;
mod online;
mod update;

use axum::{
    Router,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AppResult, AppState, auth::User, rfc3339};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list))
        .route("/{id}", get(detail::detail).put(update::update))
        .route("/{id}/online-status", patch(online::online_status))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Ethnicity {
    European,
    Asian,
    Latina,
    African,
    Mixed,
    Arab,
    Indian,
}

impl Ethnicity {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "european" => Some(Self::European),
            "asian" => Some(Self::Asian),
            "latina" => Some(Self::Latina),
            "african" => Some(Self::African),
            "mixed" => Some(Self::Mixed),
            "arab" => Some(Self::Arab),
            "indian" => Some(Self::Indian),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Independent,
    Agency,
}

impl Category {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "independent" => Some(Self::Independent),
            "agency" => Some(Self::Agency),
            _ => None,
        }
    }
}

/// An uploaded listing photo. Stored as a JSON array in the `images` column.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileImage {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayAvailability {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Availability {
    pub monday: DayAvailability,
    pub tuesday: DayAvailability,
    pub wednesday: DayAvailability,
    pub thursday: DayAvailability,
    pub friday: DayAvailability,
    pub saturday: DayAvailability,
    pub sunday: DayAvailability,
}

impl Default for Availability {
    fn default() -> Self {
        let open = || DayAvailability {
            start: None,
            end: None,
            available: true,
        };
        Self {
            monday: open(),
            tuesday: open(),
            wednesday: open(),
            thursday: open(),
            friday: open(),
            saturday: open(),
            sunday: DayAvailability {
                start: None,
                end: None,
                available: false,
            },
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub age: i64,
    pub location: String,
    pub description: String,
    pub images: String,
    pub services: String,
    pub ethnicity: Ethnicity,
    pub category: Category,
    pub rates_incall: String,
    pub rates_outcall: String,
    pub availability: String,
    pub is_verified: bool,
    pub is_featured: bool,
    pub is_online: bool,
    pub rating_average: f64,
    pub rating_count: i64,
    pub views_total: i64,
    pub views_week: i64,
    pub views_month: i64,
    pub favorites: i64,
    pub last_active: OffsetDateTime,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl ProfileRow {
    fn image_urls(&self) -> Vec<String> {
        let images: Vec<ProfileImage> = serde_json::from_str(&self.images).unwrap_or_default();
        if images.is_empty() {
            vec![format!(
                "https://via.placeholder.com/400x500/e5e7eb/6b7280?text={}",
                self.name.replace(' ', "+")
            )]
        } else {
            images.into_iter().map(|img| img.url).collect()
        }
    }

    pub fn services_vec(&self) -> Vec<String> {
        serde_json::from_str(&self.services).unwrap_or_default()
    }

    /// The listing card used by the browse endpoint.
    pub fn card(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "age": self.age,
            "location": self.location,
            "description": self.description,
            "images": self.image_urls(),
            "verified": self.is_verified,
            "featured": self.is_featured,
            "online": self.is_online,
            "incall": self.rates_incall,
            "outcall": self.rates_outcall,
            "services": self.services_vec(),
            "ethnicity": self.ethnicity,
            "category": self.category,
            "rating": self.rating_average,
            "views": self.views_total,
        })
    }

    /// Card plus the fields only the detail page shows.
    pub fn detail(&self) -> Value {
        let mut value = self.card();
        let availability: Value = serde_json::from_str(&self.availability).unwrap_or(Value::Null);
        value["review_count"] = json!(self.rating_count);
        value["availability"] = availability;
        value["last_active"] = json!(rfc3339(self.last_active));
        value
    }
}

/// Seeds the default listing a model gets at registration.
pub(crate) async fn seed_for_model(db_pool: &SqlitePool, user: &User) -> AppResult<()> {
    let now = OffsetDateTime::now_utc();
    let availability =
        serde_json::to_string(&Availability::default()).map_err(anyhow::Error::from)?;

    sqlx::query(
        "INSERT INTO profiles (id, user_id, name, age, location, description, services, \
         ethnicity, category, rates_incall, rates_outcall, availability, last_active, \
         created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(&user.id)
    .bind(&user.name)
    .bind(user.age)
    .bind("Madrid")
    .bind("Professional and discreet companion.")
    .bind(r#"["Girlfriend experience"]"#)
    .bind(Ethnicity::European)
    .bind(Category::Independent)
    .bind("€150/h")
    .bind("€200/h")
    .bind(availability)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(db_pool)
    .await?;

    Ok(())
}
