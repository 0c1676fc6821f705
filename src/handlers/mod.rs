//! Per-resource request handlers.

pub mod beta;
pub mod books;
pub mod character_tags;
pub mod characters;
pub mod easter_eggs;
pub mod issues;
pub mod posts;
pub mod progress;
pub mod reviews;
pub mod sagas;
pub mod shop_items;
pub mod story_arcs;
pub mod timeline;
pub mod volumes;

use crate::error::AppError;
use serde::Deserialize;
use sqlx::PgPool;

/// Shared list query parameters. Limit defaults to 100, capped at 1000.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn limit(&self) -> i64 {
        page_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        page_offset(self.offset)
    }
}

/// Effective page size: default 100, capped at 1000.
pub(crate) fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(100).clamp(1, 1000)
}

pub(crate) fn page_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Pull a required, non-empty text field out of an optional payload slot.
pub(crate) fn require_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

/// Hierarchy inserts check the parent row first; a dangling reference is a 400,
/// not a foreign-key 500.
pub(crate) async fn ensure_row_exists(
    pool: &PgPool,
    table: &str,
    id: i64,
    label: &str,
) -> Result<(), AppError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
    let exists: (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(pool).await?;
    if !exists.0 {
        return Err(AppError::BadRequest(format!(
            "{} {} does not exist",
            label, id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_default_and_cap() {
        let p = ListParams {
            limit: None,
            offset: None,
        };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 0);
        let p = ListParams {
            limit: Some(5000),
            offset: Some(-3),
        };
        assert_eq!(p.limit(), 1000);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn require_text_rejects_missing_and_blank() {
        assert!(require_text(None, "title").is_err());
        assert!(require_text(Some("   ".into()), "title").is_err());
        assert_eq!(require_text(Some(" Ash ".into()), "title").unwrap(), "Ash");
    }
}
