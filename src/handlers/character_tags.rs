//! Character tags: CRUD, paginated search, and wholesale assignment replacement.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{ensure_row_exists, require_text};
use crate::models::{CharacterTag, CharacterTagAssignment};
use crate::response::{paginated, Paginated};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const TAG_COLUMNS: &str = "id, name, category, description, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str = "id, character_id, tag_id, confidence, source, created_at";

#[derive(Deserialize)]
pub struct TagPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct TagSearchParams {
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Deserialize)]
pub struct AssignmentListParams {
    pub character_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct ReplaceAssignmentsPayload {
    pub character_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
    pub confidence: Option<f64>,
    pub source: Option<String>,
}

/// GET /api/character-tags?q=&limit=&offset= — the one enveloped endpoint:
/// `{ data, pagination: { offset, limit, total } }`.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<TagSearchParams>,
) -> Result<Json<Paginated<CharacterTag>>, AppError> {
    let limit = params.limit.unwrap_or(50).min(500);
    let offset = params.offset.unwrap_or(0);
    let pattern = params
        .q
        .as_deref()
        .map(|q| format!("%{}%", q.trim()))
        .unwrap_or_else(|| "%".into());

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM character_tags WHERE name ILIKE $1")
        .bind(&pattern)
        .fetch_one(&state.user_pool)
        .await?;
    let sql = format!(
        "SELECT {} FROM character_tags WHERE name ILIKE $1 ORDER BY name, id LIMIT $2 OFFSET $3",
        TAG_COLUMNS
    );
    let rows = sqlx::query_as::<_, CharacterTag>(&sql)
        .bind(&pattern)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(paginated(rows, offset, limit, total.0 as u64)))
}

/// GET /api/character-tags/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CharacterTag>, AppError> {
    let sql = format!("SELECT {} FROM character_tags WHERE id = $1", TAG_COLUMNS);
    let row = sqlx::query_as::<_, CharacterTag>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("character tag {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/character-tags (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<TagPayload>,
) -> Result<(StatusCode, Json<CharacterTag>), AppError> {
    let name = require_text(body.name, "name")?;
    let sql = format!(
        "INSERT INTO character_tags (name, category, description) \
         VALUES ($1, $2, $3) RETURNING {}",
        TAG_COLUMNS
    );
    let row = sqlx::query_as::<_, CharacterTag>(&sql)
        .bind(name)
        .bind(body.category)
        .bind(body.description)
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/character-tags/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TagPayload>,
) -> Result<Json<CharacterTag>, AppError> {
    let sql = format!(
        "UPDATE character_tags SET \
         name = COALESCE($2, name), \
         category = COALESCE($3, category), \
         description = COALESCE($4, description), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        TAG_COLUMNS
    );
    let row = sqlx::query_as::<_, CharacterTag>(&sql)
        .bind(id)
        .bind(body.name)
        .bind(body.category)
        .bind(body.description)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("character tag {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/character-tags/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> =
        sqlx::query_as("DELETE FROM character_tags WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&state.admin_pool)
            .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!(
            "character tag {} not found",
            id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/character-tags/assignments?character_id=
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(params): Query<AssignmentListParams>,
) -> Result<Json<Vec<CharacterTagAssignment>>, AppError> {
    let character_id = params
        .character_id
        .ok_or_else(|| AppError::BadRequest("character_id is required".into()))?;
    let sql = format!(
        "SELECT {} FROM character_tag_assignments WHERE character_id = $1 ORDER BY id",
        ASSIGNMENT_COLUMNS
    );
    let rows = sqlx::query_as::<_, CharacterTagAssignment>(&sql)
        .bind(character_id)
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(rows))
}

/// POST /api/character-tags/assignments (admin). Replaces the character's
/// assignment set wholesale: delete everything, then insert the new set. The
/// two statements are intentionally not wrapped in a transaction; a failure
/// between them leaves the character with zero tags.
pub async fn replace_assignments(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ReplaceAssignmentsPayload>,
) -> Result<Json<Vec<CharacterTagAssignment>>, AppError> {
    let character_id = body
        .character_id
        .ok_or_else(|| AppError::BadRequest("character_id is required".into()))?;
    let tag_ids = body
        .tag_ids
        .ok_or_else(|| AppError::BadRequest("tag_ids is required".into()))?;
    ensure_row_exists(&state.admin_pool, "characters", character_id, "character").await?;
    for tag_id in &tag_ids {
        ensure_row_exists(&state.admin_pool, "character_tags", *tag_id, "character tag").await?;
    }

    sqlx::query("DELETE FROM character_tag_assignments WHERE character_id = $1")
        .bind(character_id)
        .execute(&state.admin_pool)
        .await?;

    if tag_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let sql = format!(
        "INSERT INTO character_tag_assignments (character_id, tag_id, confidence, source) \
         SELECT $1, t, $3, $4 FROM UNNEST($2::bigint[]) AS t RETURNING {}",
        ASSIGNMENT_COLUMNS
    );
    let rows = sqlx::query_as::<_, CharacterTagAssignment>(&sql)
        .bind(character_id)
        .bind(&tag_ids)
        .bind(body.confidence)
        .bind(body.source)
        .fetch_all(&state.admin_pool)
        .await?;
    Ok(Json(rows))
}
