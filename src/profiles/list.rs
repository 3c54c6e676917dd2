use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    ApiResponse, AppError, AppResult, AppState, FieldError,
    pagination::Pagination,
};

use super::{Category, ProfileRow};

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    location: Option<String>,
    min_age: Option<String>,
    max_age: Option<String>,
    ethnicity: Option<String>,
    category: Option<String>,
    sort_by: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sort {
    Featured,
    Newest,
    PriceLow,
    PriceHigh,
    Popular,
}

impl Sort {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "featured" => Some(Self::Featured),
            "newest" => Some(Self::Newest),
            "price-low" => Some(Self::PriceLow),
            "price-high" => Some(Self::PriceHigh),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            Self::Featured => " ORDER BY is_featured DESC, created_at DESC",
            Self::Newest => " ORDER BY created_at DESC",
            Self::PriceLow => " ORDER BY rates_incall ASC",
            Self::PriceHigh => " ORDER BY rates_incall DESC",
            Self::Popular => " ORDER BY views_total DESC",
        }
    }
}

#[derive(Debug, Default)]
struct Filters {
    location: Option<String>,
    min_age: Option<i64>,
    max_age: Option<i64>,
    ethnicity: Option<String>,
    category: Option<Category>,
    search: Option<String>,
}

/// `all` disables a filter, same as leaving it out.
fn given(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

impl Filters {
    fn parse(query: &ListQuery, errors: &mut Vec<FieldError>) -> Self {
        let mut filters = Filters {
            location: given(&query.location).map(str::to_owned),
            ethnicity: given(&query.ethnicity).map(str::to_owned),
            search: given(&query.search).map(str::to_owned),
            ..Filters::default()
        };

        if let Some(raw) = given(&query.min_age) {
            match raw.parse::<i64>() {
                Ok(age) if age >= 18 => filters.min_age = Some(age),
                _ => errors.push(FieldError::new("min_age", "min_age must be at least 18")),
            }
        }
        if let Some(raw) = given(&query.max_age) {
            match raw.parse::<i64>() {
                Ok(age) if (18..=100).contains(&age) => filters.max_age = Some(age),
                _ => errors.push(FieldError::new(
                    "max_age",
                    "max_age must be between 18 and 100",
                )),
            }
        }
        if let Some(raw) = given(&query.category) {
            match Category::parse(raw) {
                Some(category) => filters.category = Some(category),
                None => errors.push(FieldError::new(
                    "category",
                    "category must be independent or agency",
                )),
            }
        }

        filters
    }

    fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(location) = &self.location {
            qb.push(" AND location = ").push_bind(location.clone());
        }
        if let Some(min_age) = self.min_age {
            qb.push(" AND age >= ").push_bind(min_age);
        }
        if let Some(max_age) = self.max_age {
            qb.push(" AND age <= ").push_bind(max_age);
        }
        if let Some(ethnicity) = &self.ethnicity {
            qb.push(" AND ethnicity = ").push_bind(ethnicity.clone());
        }
        if let Some(category) = self.category {
            qb.push(" AND category = ").push_bind(category);
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{search}%");
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern.clone())
                .push(" OR location LIKE ")
                .push_bind(pattern.clone())
                .push(" OR services LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    Query(page): Query<Pagination>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse>> {
    let mut errors = Vec::new();
    page.check(&mut errors);

    let sort = match query.sort_by.as_deref() {
        None => Sort::Featured,
        Some(raw) => Sort::parse(raw).unwrap_or_else(|| {
            errors.push(FieldError::new("sort_by", "unknown sort option"));
            Sort::Featured
        }),
    };
    let filters = Filters::parse(&query, &mut errors);

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM profiles WHERE is_active = 1");
    filters.push_sql(&mut count_query);
    let (total,): (i64,) = count_query.build_query_as().fetch_one(&db_pool).await?;

    let mut select = QueryBuilder::new("SELECT * FROM profiles WHERE is_active = 1");
    filters.push_sql(&mut select);
    select.push(sort.order_clause());
    select
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<ProfileRow> = select.build_query_as().fetch_all(&db_pool).await?;
    let profiles: Vec<_> = rows.iter().map(ProfileRow::card).collect();

    Ok(ApiResponse::data(json!({
        "profiles": profiles,
        "pagination": page.meta(total),
    })))
}
