//! Fablepress: content-management backend for a serialized-fiction publishing site.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hierarchy;
pub mod models;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod slug;
pub mod state;
pub mod store;
pub mod templates;

pub use config::Settings;
pub use error::AppError;
pub use hierarchy::build_forest;
pub use routes::app;
pub use slug::slugify;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};
