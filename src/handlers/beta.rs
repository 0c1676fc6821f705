//! Beta program: capacity-gated applications and a public status check.
//!
//! The count-then-insert sequence is not locked; concurrent submissions near
//! the ceiling can overshoot by the number of in-flight requests. Accepted for
//! this domain.

use crate::error::AppError;
use crate::handlers::require_text;
use crate::models::BetaApplication;
use crate::rate_limit;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

const COLUMNS: &str = "id, name, email, reason, status, created_at";

#[derive(Deserialize)]
pub struct ApplyPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct BetaStatus {
    pub enabled: bool,
    pub max_applications: i64,
    pub current: i64,
    pub remaining: i64,
    pub accepting: bool,
}

fn remaining_capacity(max: i64, current: i64) -> i64 {
    (max - current).max(0)
}

async fn application_count(state: &AppState) -> Result<i64, AppError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM beta_applications")
        .fetch_one(&state.user_pool)
        .await?;
    Ok(count.0)
}

/// GET /api/beta/status
pub async fn status(State(state): State<AppState>) -> Result<Json<BetaStatus>, AppError> {
    let current = application_count(&state).await?;
    let max = state.settings.beta_max_applications;
    let remaining = remaining_capacity(max, current);
    Ok(Json(BetaStatus {
        enabled: state.settings.beta_enabled,
        max_applications: max,
        current,
        remaining,
        accepting: state.settings.beta_enabled && remaining > 0,
    }))
}

/// POST /api/beta/applications. 403 when the program is disabled or full.
pub async fn apply(
    State(state): State<AppState>,
    Json(body): Json<ApplyPayload>,
) -> Result<(StatusCode, Json<BetaApplication>), AppError> {
    let _ = rate_limit::check("beta:apply");
    if !state.settings.beta_enabled {
        return Err(AppError::Forbidden("beta program is closed".into()));
    }
    let name = require_text(body.name, "name")?;
    let email = require_text(body.email, "email")?;
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".into()));
    }

    let current = application_count(&state).await?;
    if current >= state.settings.beta_max_applications {
        return Err(AppError::Forbidden(
            "beta application capacity reached".into(),
        ));
    }

    let status = if state.settings.beta_auto_approve {
        "approved"
    } else {
        "pending"
    };
    let sql = format!(
        "INSERT INTO beta_applications (name, email, reason, status) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, BetaApplication>(&sql)
        .bind(name)
        .bind(email)
        .bind(body.reason)
        .bind(status)
        .fetch_one(&state.user_pool)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[cfg(test)]
mod tests {
    use super::remaining_capacity;

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining_capacity(100, 40), 60);
        assert_eq!(remaining_capacity(100, 100), 0);
        // Overshoot from racing submissions still reports zero.
        assert_eq!(remaining_capacity(100, 104), 0);
    }
}
