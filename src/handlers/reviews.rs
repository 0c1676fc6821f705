//! Reviews against a polymorphic catalog target (item_id + item_type).

use crate::auth::{CurrentUser, RequireAdmin};
use crate::error::AppError;
use crate::handlers::{page_limit, page_offset};
use crate::models::{valid_item_type, Review};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str = "id, user_id, item_id, item_type, rating, comment, verified_purchase, \
     helpful_count, created_at, updated_at";

#[derive(Deserialize)]
pub struct CreateReviewPayload {
    pub item_id: Option<i64>,
    pub item_type: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub verified_purchase: Option<bool>,
}

#[derive(Deserialize)]
pub struct ReviewListParams {
    pub item_id: Option<i64>,
    pub item_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Ratings are clamped into the 1-5 band rather than rejected.
fn clamp_rating(rating: i32) -> i32 {
    rating.clamp(1, 5)
}

/// GET /api/reviews?item_id=&item_type=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> Result<Json<Vec<Review>>, AppError> {
    let rows = match (params.item_id, params.item_type) {
        (Some(item_id), Some(item_type)) => {
            let sql = format!(
                "SELECT {} FROM reviews WHERE item_id = $1 AND item_type = $2 \
                 ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
                COLUMNS
            );
            sqlx::query_as::<_, Review>(&sql)
                .bind(item_id)
                .bind(item_type)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
        _ => {
            let sql = format!(
                "SELECT {} FROM reviews ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
                COLUMNS
            );
            sqlx::query_as::<_, Review>(&sql)
                .bind(page_limit(params.limit))
                .bind(page_offset(params.offset))
                .fetch_all(&state.user_pool)
                .await?
        }
    };
    Ok(Json(rows))
}

/// POST /api/reviews (authenticated)
pub async fn create(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreateReviewPayload>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let item_id = body
        .item_id
        .ok_or_else(|| AppError::BadRequest("item_id is required".into()))?;
    let item_type = body
        .item_type
        .ok_or_else(|| AppError::BadRequest("item_type is required".into()))?;
    if !valid_item_type(&item_type) {
        return Err(AppError::BadRequest(format!(
            "invalid item_type '{}'",
            item_type
        )));
    }
    let rating = body
        .rating
        .ok_or_else(|| AppError::BadRequest("rating is required".into()))?;
    let sql = format!(
        "INSERT INTO reviews (user_id, item_id, item_type, rating, comment, verified_purchase) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Review>(&sql)
        .bind(user_id)
        .bind(item_id)
        .bind(item_type)
        .bind(clamp_rating(rating))
        .bind(body.comment)
        .bind(body.verified_purchase.unwrap_or(false))
        .fetch_one(&state.user_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/reviews/:id/helpful — bump the helpful counter.
pub async fn mark_helpful(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Review>, AppError> {
    let sql = format!(
        "UPDATE reviews SET helpful_count = helpful_count + 1, updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, Review>(&sql)
        .bind(id)
        .fetch_optional(&state.user_pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {} not found", id)))?;
    Ok(Json(row))
}

/// DELETE /api/reviews/:id (admin)
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM reviews WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&state.admin_pool)
        .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!("review {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::clamp_rating;

    #[test]
    fn ratings_clamp_into_band() {
        assert_eq!(clamp_rating(0), 1);
        assert_eq!(clamp_rating(-7), 1);
        assert_eq!(clamp_rating(3), 3);
        assert_eq!(clamp_rating(6), 5);
    }
}
