//! Shared application state for all routes.

use crate::config::Settings;
use sqlx::PgPool;

/// Two credential tiers: `admin_pool` connects with the elevated DSN that bypasses
/// row security and is used by admin mutation handlers; `user_pool` is the
/// user-scoped tier for everything else.
#[derive(Clone)]
pub struct AppState {
    pub admin_pool: PgPool,
    pub user_pool: PgPool,
    pub settings: Settings,
}
