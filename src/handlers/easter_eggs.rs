//! Easter egg definitions (admin) and the discovery endpoint.
//!
//! Discovery is idempotent from the caller's view: a repeat unlock returns the
//! same reward with `alreadyUnlocked: true` instead of erroring, even though
//! the underlying write is insert-if-absent rather than an upsert.

use crate::auth::{CurrentUser, RequireAdmin};
use crate::error::AppError;
use crate::handlers::{require_text, ListParams};
use crate::models::{valid_item_type, EasterEgg, EasterEggDiscovery};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const COLUMNS: &str = "id, title, hint, item_id, item_type, reward, active, created_at, updated_at";

#[derive(Deserialize)]
pub struct EggPayload {
    pub title: Option<String>,
    pub hint: Option<String>,
    pub item_id: Option<i64>,
    pub item_type: Option<String>,
    pub reward: Option<Value>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct DiscoverPayload {
    pub egg_id: Option<i64>,
    pub item_id: Option<i64>,
    pub item_type: Option<String>,
}

#[derive(Serialize)]
pub struct DiscoveryResponse {
    pub egg_id: i64,
    pub title: String,
    pub reward: Value,
    #[serde(rename = "alreadyUnlocked")]
    pub already_unlocked: bool,
}

/// GET /api/easter-eggs (admin — definitions reveal the hiding spots)
pub async fn list(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<EasterEgg>>, AppError> {
    let sql = format!(
        "SELECT {} FROM easter_eggs ORDER BY id LIMIT $1 OFFSET $2",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, EasterEgg>(&sql)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&state.admin_pool)
        .await?;
    Ok(Json(rows))
}

/// POST /api/easter-eggs (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<EggPayload>,
) -> Result<(StatusCode, Json<EasterEgg>), AppError> {
    let title = require_text(body.title, "title")?;
    let item_id = body
        .item_id
        .ok_or_else(|| AppError::BadRequest("item_id is required".into()))?;
    let item_type = body
        .item_type
        .ok_or_else(|| AppError::BadRequest("item_type is required".into()))?;
    if !valid_item_type(&item_type) {
        return Err(AppError::BadRequest(format!(
            "invalid item_type '{}'",
            item_type
        )));
    }
    let sql = format!(
        "INSERT INTO easter_eggs (title, hint, item_id, item_type, reward, active) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, EasterEgg>(&sql)
        .bind(title)
        .bind(body.hint)
        .bind(item_id)
        .bind(item_type)
        .bind(body.reward.unwrap_or_else(|| Value::Object(Default::default())))
        .bind(body.active.unwrap_or(true))
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/easter-eggs/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EggPayload>,
) -> Result<Json<EasterEgg>, AppError> {
    if let Some(ref item_type) = body.item_type {
        if !valid_item_type(item_type) {
            return Err(AppError::BadRequest(format!(
                "invalid item_type '{}'",
                item_type
            )));
        }
    }
    let sql = format!(
        "UPDATE easter_eggs SET \
         title = COALESCE($2, title), \
         hint = COALESCE($3, hint), \
         item_id = COALESCE($4, item_id), \
         item_type = COALESCE($5, item_type), \
         reward = COALESCE($6, reward), \
         active = COALESCE($7, active), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, EasterEgg>(&sql)
        .bind(id)
        .bind(body.title)
        .bind(body.hint)
        .bind(body.item_id)
        .bind(body.item_type)
        .bind(body.reward)
        .bind(body.active)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("easter egg {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/easter-eggs/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> =
        sqlx::query_as("DELETE FROM easter_eggs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&state.admin_pool)
            .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("easter egg {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/easter-eggs/discover (authenticated). The egg must exist, be
/// active, and match the item the caller claims to have found it on.
pub async fn discover(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<DiscoverPayload>,
) -> Result<Json<DiscoveryResponse>, AppError> {
    let egg_id = body
        .egg_id
        .ok_or_else(|| AppError::BadRequest("egg_id is required".into()))?;
    let item_id = body
        .item_id
        .ok_or_else(|| AppError::BadRequest("item_id is required".into()))?;
    let item_type = body
        .item_type
        .ok_or_else(|| AppError::BadRequest("item_type is required".into()))?;

    let sql = format!("SELECT {} FROM easter_eggs WHERE id = $1", COLUMNS);
    let egg = sqlx::query_as::<_, EasterEgg>(&sql)
        .bind(egg_id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("easter egg {} not found", egg_id)))?;
    if !egg.active {
        return Err(AppError::Forbidden("easter egg is not active".into()));
    }
    if egg.item_id != item_id || egg.item_type != item_type {
        return Err(AppError::BadRequest(
            "easter egg does not belong to that item".into(),
        ));
    }

    let existing = sqlx::query_as::<_, EasterEggDiscovery>(
        "SELECT id, user_id, egg_id, discovered_at FROM easter_egg_discoveries \
         WHERE user_id = $1 AND egg_id = $2",
    )
    .bind(user_id)
    .bind(egg_id)
    .fetch_optional(&state.user_pool)
    .await?;
    if existing.is_some() {
        return Ok(Json(DiscoveryResponse {
            egg_id: egg.id,
            title: egg.title,
            reward: egg.reward,
            already_unlocked: true,
        }));
    }

    // Insert-if-absent; the unique index backstops a concurrent double-unlock.
    sqlx::query(
        "INSERT INTO easter_egg_discoveries (user_id, egg_id) VALUES ($1, $2) \
         ON CONFLICT (user_id, egg_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(egg_id)
    .execute(&state.user_pool)
    .await?;

    Ok(Json(DiscoveryResponse {
        egg_id: egg.id,
        title: egg.title,
        reward: egg.reward,
        already_unlocked: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn discovery_response_uses_camel_case_flag() {
        let body = DiscoveryResponse {
            egg_id: 7,
            title: "Hidden sigil".into(),
            reward: json!({"kind": "wallpaper"}),
            already_unlocked: true,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["alreadyUnlocked"], json!(true));
        assert!(v.get("already_unlocked").is_none());
    }
}
