//! Request identity extractors. Authentication itself happens upstream; the
//! identity layer injects `X-User-ID` and issues the admin bearer token.

use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Extractor for the authenticated user. Rejects with 401 when the header is
/// missing or not a valid UUID.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;
        let user_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::Unauthorized("invalid user id".into()))?;
        Ok(CurrentUser(user_id))
    }
}

/// Extractor gating admin-only routes: `Authorization: Bearer <token>` must match
/// the configured admin token. 401 when absent, 403 on mismatch.
#[derive(Clone, Copy, Debug)]
pub struct RequireAdmin;

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized("admin token required".into()))?;
        if token != state.settings.admin_token {
            return Err(AppError::Forbidden("admin access denied".into()));
        }
        Ok(RequireAdmin)
    }
}
