//! Server binary: loads settings, bootstraps the database, mounts the router.

use fablepress::{app, ensure_database_exists, ensure_tables, AppState, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fablepress=info".parse()?))
        .init();

    let settings = Settings::from_env();
    ensure_database_exists(&settings.admin_database_url).await?;

    let admin_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.admin_database_url)
        .await?;
    let user_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    ensure_tables(&admin_pool).await?;

    let bind_addr = settings.bind_addr.clone();
    let state = AppState {
        admin_pool,
        user_pool,
        settings,
    };

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
