//! Per-user reading progress: one row per (user, item), upserted.

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{valid_item_type, ReadingProgress};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

const COLUMNS: &str = "id, user_id, item_id, item_type, percent, last_position, \
     reading_seconds, created_at, updated_at";

#[derive(Deserialize)]
pub struct UpsertProgressPayload {
    pub item_id: Option<i64>,
    pub item_type: Option<String>,
    pub percent: Option<f64>,
    pub last_position: Option<String>,
    /// Seconds read since the last report; accumulated server-side.
    pub reading_seconds_delta: Option<i64>,
}

#[derive(Deserialize)]
pub struct ProgressListParams {
    pub item_id: Option<i64>,
    pub item_type: Option<String>,
}

fn clamp_percent(p: f64) -> f64 {
    p.clamp(0.0, 100.0)
}

/// GET /api/progress[?item_id=&item_type=] — the caller's rows.
pub async fn list(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ProgressListParams>,
) -> Result<Json<Vec<ReadingProgress>>, AppError> {
    let rows = match (params.item_id, params.item_type) {
        (Some(item_id), Some(item_type)) => {
            let sql = format!(
                "SELECT {} FROM reading_progress \
                 WHERE user_id = $1 AND item_id = $2 AND item_type = $3",
                COLUMNS
            );
            sqlx::query_as::<_, ReadingProgress>(&sql)
                .bind(user_id)
                .bind(item_id)
                .bind(item_type)
                .fetch_all(&state.user_pool)
                .await?
        }
        _ => {
            let sql = format!(
                "SELECT {} FROM reading_progress WHERE user_id = $1 ORDER BY updated_at DESC",
                COLUMNS
            );
            sqlx::query_as::<_, ReadingProgress>(&sql)
                .bind(user_id)
                .fetch_all(&state.user_pool)
                .await?
        }
    };
    Ok(Json(rows))
}

/// PUT /api/progress (authenticated). Upsert on (user, item); percent clamped
/// to 0-100, reading time accumulated by the supplied delta.
pub async fn upsert(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<UpsertProgressPayload>,
) -> Result<Json<ReadingProgress>, AppError> {
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
    let percent = clamp_percent(body.percent.unwrap_or(0.0));
    let delta = body.reading_seconds_delta.unwrap_or(0).max(0);
    let sql = format!(
        "INSERT INTO reading_progress (user_id, item_id, item_type, percent, last_position, reading_seconds) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (user_id, item_id, item_type) DO UPDATE SET \
         percent = EXCLUDED.percent, \
         last_position = COALESCE(EXCLUDED.last_position, reading_progress.last_position), \
         reading_seconds = reading_progress.reading_seconds + $6, \
         updated_at = NOW() \
         RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, ReadingProgress>(&sql)
        .bind(user_id)
        .bind(item_id)
        .bind(item_type)
        .bind(percent)
        .bind(body.last_position)
        .bind(delta)
        .fetch_one(&state.user_pool)
        .await?;
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::clamp_percent;

    #[test]
    fn percent_clamps_to_completion_range() {
        assert_eq!(clamp_percent(-3.0), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
        assert_eq!(clamp_percent(180.0), 100.0);
    }
}
