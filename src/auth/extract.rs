use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult};

use super::{JwtKeys, UserType};

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Mirrors the auth gate of every protected route: a missing header is 401,
/// an undecodable token 403, and a token whose user has vanished or been
/// deactivated 401 again.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub user_type: UserType,
}

impl AuthUser {
    pub fn require_model(&self) -> AppResult<()> {
        match self.user_type {
            UserType::Model => Ok(()),
            _ => Err(AppError::Forbidden(
                "Only models can perform this action".to_owned(),
            )),
        }
    }

    pub fn require_customer(&self) -> AppResult<()> {
        match self.user_type {
            UserType::Customer => Ok(()),
            _ => Err(AppError::Forbidden(
                "Only customers can perform this action".to_owned(),
            )),
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_owned()))?;

        let claims = JwtKeys::from_ref(state)
            .verify(token)
            .map_err(|_| AppError::Forbidden("Invalid token".to_owned()))?;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Forbidden("Invalid token".to_owned()))?;

        // The token may outlive the account; re-check the row.
        let db_pool = SqlitePool::from_ref(state);
        let active: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&db_pool)
            .await?;

        match active {
            Some((true,)) => Ok(AuthUser {
                id,
                user_type: claims.user_type,
            }),
            _ => Err(AppError::Unauthorized("Invalid user".to_owned())),
        }
    }
}
