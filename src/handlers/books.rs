//! Book CRUD. Top of the catalog hierarchy; deleting a book cascades through
//! volumes, sagas, arcs, and issues.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{require_text, ListParams};
use crate::models::Book;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str = "id, title, description, price, word_count, is_complete, \
     paperback_available, hardcover_available, created_at, updated_at";

#[derive(Deserialize)]
pub struct BookPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub word_count: Option<i32>,
    pub is_complete: Option<bool>,
    pub paperback_available: Option<bool>,
    pub hardcover_available: Option<bool>,
}

/// GET /api/books
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Book>>, AppError> {
    let sql = format!(
        "SELECT {} FROM books ORDER BY id LIMIT $1 OFFSET $2",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, Book>(&sql)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(rows))
}

/// GET /api/books/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, AppError> {
    let sql = format!("SELECT {} FROM books WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, Book>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/books (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<BookPayload>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let title = require_text(body.title, "title")?;
    let sql = format!(
        "INSERT INTO books (title, description, price, word_count, is_complete, \
         paperback_available, hardcover_available) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Book>(&sql)
        .bind(title)
        .bind(body.description)
        .bind(body.price)
        .bind(body.word_count)
        .bind(body.is_complete.unwrap_or(false))
        .bind(body.paperback_available.unwrap_or(false))
        .bind(body.hardcover_available.unwrap_or(false))
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/books/:id (admin). Partial update; server-managed timestamps are
/// never taken from the payload and updated_at is stamped here.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<BookPayload>,
) -> Result<Json<Book>, AppError> {
    let sql = format!(
        "UPDATE books SET \
         title = COALESCE($2, title), \
         description = COALESCE($3, description), \
         price = COALESCE($4, price), \
         word_count = COALESCE($5, word_count), \
         is_complete = COALESCE($6, is_complete), \
         paperback_available = COALESCE($7, paperback_available), \
         hardcover_available = COALESCE($8, hardcover_available), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Book>(&sql)
        .bind(id)
        .bind(body.title)
        .bind(body.description)
        .bind(body.price)
        .bind(body.word_count)
        .bind(body.is_complete)
        .bind(body.paperback_available)
        .bind(body.hardcover_available)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/books/:id (admin). Dependents are removed by cascade.
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM books WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&state.admin_pool)
        .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("book {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
