//! In-universe timeline events, optionally pinned to a book.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{ensure_row_exists, page_limit, page_offset, require_text};
use crate::models::TimelineEvent;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

const COLUMNS: &str = "id, event_date, category, description, book_id, created_at, updated_at";

#[derive(Deserialize)]
pub struct TimelineEventPayload {
    pub event_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub book_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct TimelineListParams {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/timeline?category=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<TimelineListParams>,
) -> Result<Json<Vec<TimelineEvent>>, AppError> {
    let rows = match params.category {
        Some(category) => {
            let sql = format!(
                "SELECT {} FROM timeline_events WHERE category = $1 \
                 ORDER BY event_date, id LIMIT $2 OFFSET $3",
                COLUMNS
            );
            sqlx::query_as::<_, TimelineEvent>(&sql)
                .bind(category)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM timeline_events ORDER BY event_date, id LIMIT $1 OFFSET $2",
                COLUMNS
            );
            sqlx::query_as::<_, TimelineEvent>(&sql)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
    };
    Ok(Json(rows))
}

/// POST /api/timeline (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<TimelineEventPayload>,
) -> Result<(StatusCode, Json<TimelineEvent>), AppError> {
    let event_date = body
        .event_date
        .ok_or_else(|| AppError::BadRequest("event_date is required".into()))?;
    let category = require_text(body.category, "category")?;
    let description = require_text(body.description, "description")?;
    if let Some(book_id) = body.book_id {
        ensure_row_exists(&state.admin_pool, "books", book_id, "book").await?;
    }
    let sql = format!(
        "INSERT INTO timeline_events (event_date, category, description, book_id) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, TimelineEvent>(&sql)
        .bind(event_date)
        .bind(category)
        .bind(description)
        .bind(body.book_id)
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/timeline/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TimelineEventPayload>,
) -> Result<Json<TimelineEvent>, AppError> {
    if let Some(book_id) = body.book_id {
        ensure_row_exists(&state.admin_pool, "books", book_id, "book").await?;
    }
    let sql = format!(
        "UPDATE timeline_events SET \
         event_date = COALESCE($2, event_date), \
         category = COALESCE($3, category), \
         description = COALESCE($4, description), \
         book_id = COALESCE($5, book_id), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, TimelineEvent>(&sql)
        .bind(id)
        .bind(body.event_date)
        .bind(body.category)
        .bind(body.description)
        .bind(body.book_id)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timeline event {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/timeline/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> =
        sqlx::query_as("DELETE FROM timeline_events WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&state.admin_pool)
            .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!(
            "timeline event {} not found",
            id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
