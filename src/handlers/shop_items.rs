//! Shop item CRUD and the hierarchy endpoint. Shop items are a flattened,
//! self-referential view of catalog nodes used for purchase bundling.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::handlers::{ensure_row_exists, require_text, ListParams};
use crate::hierarchy::{build_forest, ShopItemNode};
use crate::models::ShopItem;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str = "id, parent_id, title, item_type, price, order_index, created_at, updated_at";

#[derive(Deserialize)]
pub struct ShopItemPayload {
    pub parent_id: Option<i64>,
    pub title: Option<String>,
    pub item_type: Option<String>,
    pub price: Option<f64>,
    pub order_index: Option<i32>,
}

/// GET /api/shop-items
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ShopItem>>, AppError> {
    let sql = format!(
        "SELECT {} FROM shop_items ORDER BY order_index, id LIMIT $1 OFFSET $2",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, ShopItem>(&sql)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(rows))
}

/// GET /api/shop-items/hierarchy — the full forest, children nested in
/// order_index order.
pub async fn hierarchy(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShopItemNode>>, AppError> {
    let sql = format!("SELECT {} FROM shop_items ORDER BY order_index, id", COLUMNS);
    let rows = sqlx::query_as::<_, ShopItem>(&sql)
        .fetch_all(&state.user_pool)
        .await?;
    Ok(Json(build_forest(rows)))
}

/// GET /api/shop-items/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShopItem>, AppError> {
    let sql = format!("SELECT {} FROM shop_items WHERE id = $1", COLUMNS);
    let row = sqlx::query_as::<_, ShopItem>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop item {} not found", id)))?;
    Ok(Json(row))
}

/// POST /api/shop-items (admin). A parent, when given, must already exist.
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ShopItemPayload>,
) -> Result<(StatusCode, Json<ShopItem>), AppError> {
    let title = require_text(body.title, "title")?;
    let item_type = require_text(body.item_type, "item_type")?;
    if let Some(parent_id) = body.parent_id {
        ensure_row_exists(&state.admin_pool, "shop_items", parent_id, "shop item").await?;
    }
    let sql = format!(
        "INSERT INTO shop_items (parent_id, title, item_type, price, order_index) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, ShopItem>(&sql)
        .bind(body.parent_id)
        .bind(title)
        .bind(item_type)
        .bind(body.price)
        .bind(body.order_index.unwrap_or(0))
        .fetch_one(&state.admin_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/shop-items/:id (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ShopItemPayload>,
) -> Result<Json<ShopItem>, AppError> {
    if let Some(parent_id) = body.parent_id {
        if parent_id == id {
            return Err(AppError::BadRequest(
                "shop item cannot be its own parent".into(),
            ));
        }
        ensure_row_exists(&state.admin_pool, "shop_items", parent_id, "shop item").await?;
    }
    let sql = format!(
        "UPDATE shop_items SET \
         parent_id = COALESCE($2, parent_id), \
         title = COALESCE($3, title), \
         item_type = COALESCE($4, item_type), \
         price = COALESCE($5, price), \
         order_index = COALESCE($6, order_index), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, ShopItem>(&sql)
        .bind(id)
        .bind(body.parent_id)
        .bind(body.title)
        .bind(body.item_type)
        .bind(body.price)
        .bind(body.order_index)
        .fetch_optional(&state.admin_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop item {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/shop-items/:id (admin). The subtree below goes with it.
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> =
        sqlx::query_as("DELETE FROM shop_items WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&state.admin_pool)
            .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("shop item {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
