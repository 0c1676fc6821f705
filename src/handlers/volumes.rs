//! Volume CRUD. A volume belongs to a book and holds sagas.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{ensure_row_exists, page_limit, page_offset, require_text};
use crate::models::Volume;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str = "id, book_id, title, price, order_index, status, created_at, updated_at";

#[derive(Deserialize)]
pub struct VolumePayload {
    pub book_id: Option<i64>,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub order_index: Option<i32>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct VolumeListParams {
    pub book_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/volumes?book_id=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<VolumeListParams>,
) -> Result<Json<Vec<Volume>>, AppError> {
    let rows = match params.book_id {
        Some(book_id) => {
            let sql = format!(
                "SELECT {} FROM volumes WHERE book_id = $1 ORDER BY order_index, id LIMIT $2 OFFSET $3",
                COLUMNS
            );
            sqlx::query_as::<_, Volume>(&sql)
                .bind(book_id)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM volumes ORDER BY order_index, id LIMIT $1 OFFSET $2",
                COLUMNS
            );
            sqlx::query_as::<_, Volume>(&sql)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
    };
    Ok(Json(rows))
}

/// GET /api/volumes/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Volume>, AppError> {
    let sql = format!("SELECT {} FROM volumes WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, Volume>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("volume {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/volumes (admin). The referenced book must exist.
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<VolumePayload>,
) -> Result<(StatusCode, Json<Volume>), AppError> {
    let title = require_text(body.title, "title")?;
    let book_id = body
        .book_id
        .ok_or_else(|| AppError::BadRequest("book_id is required".into()))?;
    ensure_row_exists(&state.admin_pool, "books", book_id, "book").await?;
    let sql = format!(
        "INSERT INTO volumes (book_id, title, price, order_index, status) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Volume>(&sql)
        .bind(book_id)
        .bind(title)
        .bind(body.price)
        .bind(body.order_index.unwrap_or(0))
        .bind(body.status.unwrap_or_else(|| "draft".into()))
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/volumes/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<VolumePayload>,
) -> Result<Json<Volume>, AppError> {
    if let Some(book_id) = body.book_id {
        ensure_row_exists(&state.admin_pool, "books", book_id, "book").await?;
    }
    let sql = format!(
        "UPDATE volumes SET \
         book_id = COALESCE($2, book_id), \
         title = COALESCE($3, title), \
         price = COALESCE($4, price), \
         order_index = COALESCE($5, order_index), \
         status = COALESCE($6, status), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Volume>(&sql)
        .bind(id)
        .bind(body.book_id)
        .bind(body.title)
        .bind(body.price)
        .bind(body.order_index)
        .bind(body.status)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("volume {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/volumes/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM volumes WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&state.admin_pool)
        .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("volume {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
