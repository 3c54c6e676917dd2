use serde::Deserialize;
use serde_json::{Value, json};

use crate::FieldError;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 50;

/// `?page=` / `?limit=` query parameters, shared by every list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn check(&self, errors: &mut Vec<FieldError>) {
        if self.page.is_some_and(|p| p < 1) {
            errors.push(FieldError::new("page", "page must be a positive integer"));
        }
        if self.limit.is_some_and(|l| !(1..=MAX_LIMIT).contains(&l)) {
            errors.push(FieldError::new("limit", "limit must be between 1 and 50"));
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    pub fn meta(&self, total: i64) -> Value {
        json!({
            "page": self.page(),
            "limit": self.limit(),
            "total": total,
            "pages": (total as u64).div_ceil(self.limit() as u64) as i64,
        })
    }
}
