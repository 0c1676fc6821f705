//! Arc CRUD. An arc belongs to a saga, holds issues, and carries bundle pricing.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{ensure_row_exists, page_limit, page_offset, require_text};
use crate::models::StoryArc;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str =
    "id, saga_id, title, price, bundle_discount, is_complete, order_index, created_at, updated_at";

#[derive(Deserialize)]
pub struct ArcPayload {
    pub saga_id: Option<i64>,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub bundle_discount: Option<f64>,
    pub is_complete: Option<bool>,
    pub order_index: Option<i32>,
}

#[derive(Deserialize)]
pub struct ArcListParams {
    pub saga_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/arcs?saga_id=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ArcListParams>,
) -> Result<Json<Vec<StoryArc>>, AppError> {
    let rows = match params.saga_id {
        Some(saga_id) => {
            let sql = format!(
                "SELECT {} FROM arcs WHERE saga_id = $1 ORDER BY order_index, id LIMIT $2 OFFSET $3",
                COLUMNS
            );
            sqlx::query_as::<_, StoryArc>(&sql)
                .bind(saga_id)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM arcs ORDER BY order_index, id LIMIT $1 OFFSET $2",
                COLUMNS
            );
            sqlx::query_as::<_, StoryArc>(&sql)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
    };
    Ok(Json(rows))
}

/// GET /api/arcs/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StoryArc>, AppError> {
    let sql = format!("SELECT {} FROM arcs WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, StoryArc>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("arc {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/arcs (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ArcPayload>,
) -> Result<(StatusCode, Json<StoryArc>), AppError> {
    let title = require_text(body.title, "title")?;
    let saga_id = body
        .saga_id
        .ok_or_else(|| AppError::BadRequest("saga_id is required".into()))?;
    ensure_row_exists(&state.admin_pool, "sagas", saga_id, "saga").await?;
    let sql = format!(
        "INSERT INTO arcs (saga_id, title, price, bundle_discount, is_complete, order_index) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, StoryArc>(&sql)
        .bind(saga_id)
        .bind(title)
        .bind(body.price)
        .bind(body.bundle_discount)
        .bind(body.is_complete.unwrap_or(false))
        .bind(body.order_index.unwrap_or(0))
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/arcs/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ArcPayload>,
) -> Result<Json<StoryArc>, AppError> {
    if let Some(saga_id) = body.saga_id {
        ensure_row_exists(&state.admin_pool, "sagas", saga_id, "saga").await?;
    }
    let sql = format!(
        "UPDATE arcs SET \
         saga_id = COALESCE($2, saga_id), \
         title = COALESCE($3, title), \
         price = COALESCE($4, price), \
         bundle_discount = COALESCE($5, bundle_discount), \
         is_complete = COALESCE($6, is_complete), \
         order_index = COALESCE($7, order_index), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, StoryArc>(&sql)
        .bind(id)
        .bind(body.saga_id)
        .bind(body.title)
        .bind(body.price)
        .bind(body.bundle_discount)
        .bind(body.is_complete)
        .bind(body.order_index)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("arc {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/arcs/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM arcs WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&state.admin_pool)
        .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("arc {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
