//! Saga CRUD. A saga belongs to a volume and holds arcs.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{ensure_row_exists, page_limit, page_offset, require_text};
use crate::models::Saga;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str = "id, volume_id, title, description, order_index, created_at, updated_at";

#[derive(Deserialize)]
pub struct SagaPayload {
    pub volume_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Deserialize)]
pub struct SagaListParams {
    pub volume_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/sagas?volume_id=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SagaListParams>,
) -> Result<Json<Vec<Saga>>, AppError> {
    let rows = match params.volume_id {
        Some(volume_id) => {
            let sql = format!(
                "SELECT {} FROM sagas WHERE volume_id = $1 ORDER BY order_index, id LIMIT $2 OFFSET $3",
                COLUMNS
            );
            sqlx::query_as::<_, Saga>(&sql)
                .bind(volume_id)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM sagas ORDER BY order_index, id LIMIT $1 OFFSET $2",
                COLUMNS
            );
            sqlx::query_as::<_, Saga>(&sql)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
    };
    Ok(Json(rows))
}

/// GET /api/sagas/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Saga>, AppError> {
    let sql = format!("SELECT {} FROM sagas WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, Saga>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("saga {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/sagas (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<SagaPayload>,
) -> Result<(StatusCode, Json<Saga>), AppError> {
    let title = require_text(body.title, "title")?;
    let volume_id = body
        .volume_id
        .ok_or_else(|| AppError::BadRequest("volume_id is required".into()))?;
    ensure_row_exists(&state.admin_pool, "volumes", volume_id, "volume").await?;
    let sql = format!(
        "INSERT INTO sagas (volume_id, title, description, order_index) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Saga>(&sql)
        .bind(volume_id)
        .bind(title)
        .bind(body.description)
        .bind(body.order_index.unwrap_or(0))
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/sagas/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SagaPayload>,
) -> Result<Json<Saga>, AppError> {
    if let Some(volume_id) = body.volume_id {
        ensure_row_exists(&state.admin_pool, "volumes", volume_id, "volume").await?;
    }
    let sql = format!(
        "UPDATE sagas SET \
         volume_id = COALESCE($2, volume_id), \
         title = COALESCE($3, title), \
         description = COALESCE($4, description), \
         order_index = COALESCE($5, order_index), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Saga>(&sql)
        .bind(id)
        .bind(body.volume_id)
        .bind(body.title)
        .bind(body.description)
        .bind(body.order_index)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("saga {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/sagas/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM sagas WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&state.admin_pool)
        .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("saga {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
