//! Issue CRUD. The leaf of the catalog hierarchy: a single release inside an arc.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{ensure_row_exists, page_limit, page_offset, require_text};
use crate::models::Issue;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

const COLUMNS: &str =
    "id, arc_id, title, word_count, release_date, tags, order_index, status, created_at, updated_at";

#[derive(Deserialize)]
pub struct IssuePayload {
    pub arc_id: Option<i64>,
    pub title: Option<String>,
    pub word_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub order_index: Option<i32>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct IssueListParams {
    pub arc_id: Option<i64>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/issues?arc_id=&status=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<IssueListParams>,
) -> Result<Json<Vec<Issue>>, AppError> {
    let mut clauses: Vec<String> = Vec::new();
    if params.arc_id.is_some() {
        clauses.push(format!("arc_id = ${}", clauses.len() + 1));
    }
    if params.status.is_some() {
        clauses.push(format!("status = ${}", clauses.len() + 1));
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM issues{} ORDER BY order_index, id LIMIT ${} OFFSET ${}",
        COLUMNS,
        where_clause,
        clauses.len() + 1,
        clauses.len() + 2
    );
    let mut query = sqlx::query_as::<_, Issue>(&sql);
    if let Some(arc_id) = params.arc_id {
        query = query.bind(arc_id);
    }
    if let Some(status) = params.status {
        query = query.bind(status);
    }
    let rows = query
        .bind(page_limit(params.limit))
        .bind(page_offset(params.offset))
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(rows))
}

/// GET /api/issues/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Issue>, AppError> {
    let sql = format!("SELECT {} FROM issues WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, Issue>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("issue {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/issues (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<IssuePayload>,
) -> Result<(StatusCode, Json<Issue>), AppError> {
    let title = require_text(body.title, "title")?;
    let arc_id = body
        .arc_id
        .ok_or_else(|| AppError::BadRequest("arc_id is required".into()))?;
    ensure_row_exists(&state.admin_pool, "arcs", arc_id, "arc").await?;
    let sql = format!(
        "INSERT INTO issues (arc_id, title, word_count, release_date, tags, order_index, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Issue>(&sql)
        .bind(arc_id)
        .bind(title)
        .bind(body.word_count)
        .bind(body.release_date)
        .bind(body.tags.unwrap_or_default())
        .bind(body.order_index.unwrap_or(0))
        .bind(body.status.unwrap_or_else(|| "draft".into()))
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/issues/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<IssuePayload>,
) -> Result<Json<Issue>, AppError> {
    if let Some(arc_id) = body.arc_id {
        ensure_row_exists(&state.admin_pool, "arcs", arc_id, "arc").await?;
    }
    let sql = format!(
        "UPDATE issues SET \
         arc_id = COALESCE($2, arc_id), \
         title = COALESCE($3, title), \
         word_count = COALESCE($4, word_count), \
         release_date = COALESCE($5, release_date), \
         tags = COALESCE($6, tags), \
         order_index = COALESCE($7, order_index), \
         status = COALESCE($8, status), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Issue>(&sql)
        .bind(id)
        .bind(body.arc_id)
        .bind(body.title)
        .bind(body.word_count)
        .bind(body.release_date)
        .bind(body.tags)
        .bind(body.order_index)
        .bind(body.status)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("issue {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/issues/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM issues WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&state.admin_pool)
        .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("issue {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
