//! Router assembly: common routes (health, readiness, version) and the
//! per-resource API under /api.

use crate::handlers::{
    beta, books, character_tags, characters, easter_eggs, issues, posts, progress, reviews, sagas,
    shop_items, story_arcs, timeline, volumes,
};
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadyBody>, (axum::http::StatusCode, Json<ReadyBody>)> {
    if sqlx::query("SELECT 1")
        .fetch_optional(&state.user_pool)
        .await
        .is_err()
    {
        return Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: Some("ok"),
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes: GET /health, GET /ready (DB check), GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}

/// All resource routes, mounted under /api by [`app`].
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/books", get(books::list).post(books::create))
        .route(
            "/books/:id",
            get(books::get).put(books::update).delete(books::delete),
        )
        .route("/volumes", get(volumes::list).post(volumes::create))
        .route(
            "/volumes/:id",
            get(volumes::get)
                .put(volumes::update)
                .delete(volumes::delete),
        )
        .route("/sagas", get(sagas::list).post(sagas::create))
        .route(
            "/sagas/:id",
            get(sagas::get).put(sagas::update).delete(sagas::delete),
        )
        .route("/arcs", get(story_arcs::list).post(story_arcs::create))
        .route(
            "/arcs/:id",
            get(story_arcs::get)
                .put(story_arcs::update)
                .delete(story_arcs::delete),
        )
        .route("/issues", get(issues::list).post(issues::create))
        .route(
            "/issues/:id",
            get(issues::get).put(issues::update).delete(issues::delete),
        )
        .route("/shop-items", get(shop_items::list).post(shop_items::create))
        .route("/shop-items/hierarchy", get(shop_items::hierarchy))
        .route(
            "/shop-items/:id",
            get(shop_items::get)
                .put(shop_items::update)
                .delete(shop_items::delete),
        )
        .route("/posts", get(posts::list).post(posts::create))
        .route("/posts/slug/:slug", get(posts::get_by_slug))
        .route(
            "/posts/:id",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route("/characters", get(characters::list).post(characters::create))
        .route(
            "/characters/from-template",
            post(characters::create_from_template),
        )
        .route(
            "/characters/:id",
            get(characters::get)
                .put(characters::update)
                .delete(characters::delete),
        )
        .route(
            "/character-tags",
            get(character_tags::search).post(character_tags::create),
        )
        .route(
            "/character-tags/assignments",
            get(character_tags::list_assignments).post(character_tags::replace_assignments),
        )
        .route(
            "/character-tags/:id",
            get(character_tags::get)
                .put(character_tags::update)
                .delete(character_tags::delete),
        )
        .route("/reviews", get(reviews::list).post(reviews::create))
        .route("/reviews/:id/helpful", post(reviews::mark_helpful))
        .route("/reviews/:id", axum::routing::delete(reviews::delete))
        .route("/progress", get(progress::list).put(progress::upsert))
        .route(
            "/easter-eggs",
            get(easter_eggs::list).post(easter_eggs::create),
        )
        .route("/easter-eggs/discover", post(easter_eggs::discover))
        .route(
            "/easter-eggs/:id",
            put(easter_eggs::update).delete(easter_eggs::delete),
        )
        .route("/beta/status", get(beta::status))
        .route("/beta/applications", post(beta::apply))
        .route("/timeline", get(timeline::list).post(timeline::create))
        .route(
            "/timeline/:id",
            put(timeline::update).delete(timeline::delete),
        )
        .with_state(state)
}

/// Full application router with body limit and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api", api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
