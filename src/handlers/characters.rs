//! Character CRUD and template instantiation.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{require_text, ListParams};
use crate::models::Character;
use crate::state::AppState;
use crate::templates::{load_templates, merge_overrides, CharacterTemplate};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};

const COLUMNS: &str = "id, name, description, tags, relationships, created_at, updated_at";

#[derive(Deserialize)]
pub struct CharacterPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub relationships: Option<Value>,
}

#[derive(Deserialize)]
pub struct FromTemplatePayload {
    pub template: Option<String>,
    #[serde(default)]
    pub overrides: Map<String, Value>,
}

/// GET /api/characters
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Character>>, AppError> {
    let sql = format!(
        "SELECT {} FROM characters ORDER BY name, id LIMIT $1 OFFSET $2",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, Character>(&sql)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(rows))
}

/// GET /api/characters/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Character>, AppError> {
    let sql = format!("SELECT {} FROM characters WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, Character>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("character {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/characters (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CharacterPayload>,
) -> Result<(StatusCode, Json<Character>), AppError> {
    let name = require_text(body.name, "name")?;
    let relationships = body.relationships.unwrap_or_else(|| Value::Array(Vec::new()));
    if !relationships.is_array() {
        return Err(AppError::BadRequest(
            "relationships must be an array of edges".into(),
        ));
    }
    let row = insert_character(
        &state,
        &name,
        body.description.as_deref(),
        &body.tags.unwrap_or_default(),
        &relationships,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/characters/from-template (admin). Instantiate a preset from the
/// fixtures file, caller overrides winning key-by-key.
pub async fn create_from_template(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<FromTemplatePayload>,
) -> Result<(StatusCode, Json<Character>), AppError> {
    let template_name = require_text(body.template, "template")?;
    let templates = load_templates(&state.settings.character_templates_path).await?;
    let preset = templates.get(&template_name).ok_or_else(|| {
        AppError::BadRequest(format!("unknown character template '{}'", template_name))
    })?;
    let merged = merge_overrides(template_as_value(preset), &body.overrides);

    let name = merged
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".into()))?
        .to_string();
    let description = merged
        .get("description")
        .and_then(Value::as_str)
        .map(String::from);
    let tags: Vec<String> = merged
        .get("tags")
        .and_then(Value::as_array)
        .map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    let relationships = merged
        .get("relationships")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    if !relationships.is_array() {
        return Err(AppError::BadRequest(
            "relationships must be an array of edges".into(),
        ));
    }

    let row = insert_character(&state, &name, description.as_deref(), &tags, &relationships).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

fn template_as_value(t: &CharacterTemplate) -> Value {
    serde_json::json!({
        "name": t.name,
        "description": t.description,
        "tags": t.tags,
        "relationships": t.relationships,
    })
}

async fn insert_character(
    state: &AppState,
    name: &str,
    description: Option<&str>,
    tags: &[String],
    relationships: &Value,
) -> Result<Character, AppError> {
    let sql = format!(
        "INSERT INTO characters (name, description, tags, relationships) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Character>(&sql)
        .bind(name)
        .bind(description)
        .bind(tags.to_vec())
        .bind(relationships)
        .fetch_one(&state.admin_pool)
        .await?;
    Ok(row)
}

/// PUT /api/characters/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CharacterPayload>,
) -> Result<Json<Character>, AppError> {
    if let Some(ref rel) = body.relationships {
        if !rel.is_array() {
            return Err(AppError::BadRequest(
                "relationships must be an array of edges".into(),
            ));
        }
    }
    let sql = format!(
        "UPDATE characters SET \
         name = COALESCE($2, name), \
         description = COALESCE($3, description), \
         tags = COALESCE($4, tags), \
         relationships = COALESCE($5, relationships), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Character>(&sql)
        .bind(id)
        .bind(body.name)
        .bind(body.description)
        .bind(body.tags)
        .bind(body.relationships)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("character {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/characters/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> =
        sqlx::query_as("DELETE FROM characters WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&state.admin_pool)
            .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("character {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
