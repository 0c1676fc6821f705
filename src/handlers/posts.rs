//! Behind-the-scenes blog posts. Slugs are unique, normalized, derived from the
//! title when absent, and stable across later title edits.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{page_limit, page_offset, require_text};
use crate::models::Post;
use crate::slug::slugify;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str =
    "id, title, slug, content, category, status, tags, published_at, created_at, updated_at";

#[derive(Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct PostListParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/posts?status=&category=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> Result<Json<Vec<Post>>, AppError> {
    let mut clauses: Vec<String> = Vec::new();
    if params.status.is_some() {
        clauses.push(format!("status = ${}", clauses.len() + 1));
    }
    if params.category.is_some() {
        clauses.push(format!("category = ${}", clauses.len() + 1));
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM posts{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
        COLUMNS,
        where_clause,
        clauses.len() + 1,
        clauses.len() + 2
    );
    let mut query = sqlx::query_as::<_, Post>(&sql);
    if let Some(status) = params.status {
        query = query.bind(status);
    }
    if let Some(category) = params.category {
        query = query.bind(category);
    }
    let rows = query
        .bind(page_limit(params.limit))
        .bind(page_offset(params.offset))
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(rows))
}

/// GET /api/posts/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, AppError> {
    let sql = format!("SELECT {} FROM posts WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {} not found", id)))?;
    Ok(Json(row))
}

/// GET /api/posts/slug/:slug
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, AppError> {
    let sql = format!("SELECT {} FROM posts WHERE slug = $1", COLUMNS);
    let row = sqlx::query_as::<_, Post>(&sql)
        .bind(&slug)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post '{}' not found", slug)))?;
    Ok(Json(row))
}

/// POST /api/posts (admin). A missing slug is derived from the title; a
/// provided one is normalized the same way.
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<PostPayload>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let title = require_text(body.title, "title")?;
    let slug = slugify(body.slug.as_deref().unwrap_or(&title));
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "slug could not be derived from title".into(),
        ));
    }
    let status = body.status.unwrap_or_else(|| "draft".into());
    let sql = format!(
        "INSERT INTO posts (title, slug, content, category, status, tags, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $5 = 'published' THEN NOW() END) \
         RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Post>(&sql)
        .bind(title)
        .bind(slug)
        .bind(body.content.unwrap_or_default())
        .bind(body.category)
        .bind(status)
        .bind(body.tags.unwrap_or_default())
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/posts/:id (admin). Title edits do not re-derive the slug; only an
/// explicitly supplied slug changes it, normalized first.
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PostPayload>,
) -> Result<Json<Post>, AppError> {
    let slug = match body.slug.as_deref() {
        Some(raw) => {
            let s = slugify(raw);
            if s.is_empty() {
                return Err(AppError::BadRequest("slug must not be empty".into()));
            }
            Some(s)
        }
        None => None,
    };
    let sql = format!(
        "UPDATE posts SET \
         title = COALESCE($2, title), \
         slug = COALESCE($3, slug), \
         content = COALESCE($4, content), \
         category = COALESCE($5, category), \
         status = COALESCE($6, status), \
         tags = COALESCE($7, tags), \
         published_at = CASE \
             WHEN COALESCE($6, status) = 'published' AND published_at IS NULL THEN NOW() \
             ELSE published_at END, \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .bind(body.title)
        .bind(slug)
        .bind(body.content)
        .bind(body.category)
        .bind(body.status)
        .bind(body.tags)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/posts/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM posts WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&state.admin_pool)
        .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("post {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
