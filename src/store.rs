//! Database bootstrap: database creation and table DDL.
//!
//! Deletes are physical everywhere; dependent rows go away through the
//! `ON DELETE CASCADE` clauses declared here.

use crate::error::AppError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const TABLE_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        price DOUBLE PRECISION,
        word_count INT,
        is_complete BOOLEAN NOT NULL DEFAULT FALSE,
        paperback_available BOOLEAN NOT NULL DEFAULT FALSE,
        hardcover_available BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS volumes (
        id BIGSERIAL PRIMARY KEY,
        book_id BIGINT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        price DOUBLE PRECISION,
        order_index INT NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'draft',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sagas (
        id BIGSERIAL PRIMARY KEY,
        volume_id BIGINT NOT NULL REFERENCES volumes(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        order_index INT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS arcs (
        id BIGSERIAL PRIMARY KEY,
        saga_id BIGINT NOT NULL REFERENCES sagas(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        price DOUBLE PRECISION,
        bundle_discount DOUBLE PRECISION,
        is_complete BOOLEAN NOT NULL DEFAULT FALSE,
        order_index INT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS issues (
        id BIGSERIAL PRIMARY KEY,
        arc_id BIGINT NOT NULL REFERENCES arcs(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        word_count INT,
        release_date DATE,
        tags TEXT[] NOT NULL DEFAULT '{}',
        order_index INT NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'draft',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shop_items (
        id BIGSERIAL PRIMARY KEY,
        parent_id BIGINT REFERENCES shop_items(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        item_type TEXT NOT NULL,
        price DOUBLE PRECISION,
        order_index INT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        tags TEXT[] NOT NULL DEFAULT '{}',
        relationships JSONB NOT NULL DEFAULT '[]'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS character_tags (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS character_tag_assignments (
        id BIGSERIAL PRIMARY KEY,
        character_id BIGINT NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        tag_id BIGINT NOT NULL REFERENCES character_tags(id) ON DELETE CASCADE,
        confidence DOUBLE PRECISION,
        source TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        content TEXT NOT NULL,
        category TEXT,
        status TEXT NOT NULL DEFAULT 'draft',
        tags TEXT[] NOT NULL DEFAULT '{}',
        published_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id BIGSERIAL PRIMARY KEY,
        user_id UUID NOT NULL,
        item_id BIGINT NOT NULL,
        item_type TEXT NOT NULL,
        rating INT NOT NULL,
        comment TEXT,
        verified_purchase BOOLEAN NOT NULL DEFAULT FALSE,
        helpful_count INT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reading_progress (
        id BIGSERIAL PRIMARY KEY,
        user_id UUID NOT NULL,
        item_id BIGINT NOT NULL,
        item_type TEXT NOT NULL,
        percent DOUBLE PRECISION NOT NULL DEFAULT 0,
        last_position TEXT,
        reading_seconds BIGINT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (user_id, item_id, item_type)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS easter_eggs (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        hint TEXT,
        item_id BIGINT NOT NULL,
        item_type TEXT NOT NULL,
        reward JSONB NOT NULL DEFAULT '{}'::jsonb,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS easter_egg_discoveries (
        id BIGSERIAL PRIMARY KEY,
        user_id UUID NOT NULL,
        egg_id BIGINT NOT NULL REFERENCES easter_eggs(id) ON DELETE CASCADE,
        discovered_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (user_id, egg_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS beta_applications (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        reason TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS timeline_events (
        id BIGSERIAL PRIMARY KEY,
        event_date DATE NOT NULL,
        category TEXT NOT NULL,
        description TEXT NOT NULL,
        book_id BIGINT REFERENCES books(id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

const INDEX_DDL: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_volumes_book ON volumes (book_id, order_index)",
    "CREATE INDEX IF NOT EXISTS idx_sagas_volume ON sagas (volume_id, order_index)",
    "CREATE INDEX IF NOT EXISTS idx_arcs_saga ON arcs (saga_id, order_index)",
    "CREATE INDEX IF NOT EXISTS idx_issues_arc ON issues (arc_id, order_index)",
    "CREATE INDEX IF NOT EXISTS idx_shop_items_parent ON shop_items (parent_id)",
    "CREATE INDEX IF NOT EXISTS idx_assignments_character ON character_tag_assignments (character_id)",
    "CREATE INDEX IF NOT EXISTS idx_reviews_item ON reviews (item_type, item_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_date ON timeline_events (event_date)",
];

/// Create all application tables and indexes if missing. Run with the admin pool.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in TABLE_DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEX_DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        let quoted = quote_ident(&db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quoted))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_name_is_last_path_segment() {
        let (admin, name) =
            parse_db_name_from_url("postgres://u:p@host:5432/fablepress?sslmode=require").unwrap();
        assert_eq!(name, "fablepress");
        assert_eq!(admin, "postgres://u:p@host:5432/postgres");
    }
}
