//! Row types for every table. Responses are the raw serialized rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog levels a polymorphic target (reviews, progress, easter eggs) may reference.
pub const ITEM_TYPES: &[&str] = &["book", "volume", "saga", "arc", "issue"];

/// Validate a polymorphic `item_type` value.
pub fn valid_item_type(s: &str) -> bool {
    ITEM_TYPES.contains(&s)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub word_count: Option<i32>,
    pub is_complete: bool,
    pub paperback_available: bool,
    pub hardcover_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Volume {
    pub id: i64,
    pub book_id: i64,
    pub title: String,
    pub price: Option<f64>,
    pub order_index: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Saga {
    pub id: i64,
    pub volume_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoryArc {
    pub id: i64,
    pub saga_id: i64,
    pub title: String,
    pub price: Option<f64>,
    pub bundle_discount: Option<f64>,
    pub is_complete: bool,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: i64,
    pub arc_id: i64,
    pub title: String,
    pub word_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub order_index: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattened, self-referential representation of catalog nodes for purchase bundling.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShopItem {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub item_type: String,
    pub price: Option<f64>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `relationships` is a JSONB edge list: `[{ "character_id": n, "kind": s }, ...]`.
/// It forms a graph over characters, not a tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub relationships: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CharacterTag {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CharacterTagAssignment {
    pub id: i64,
    pub character_id: i64,
    pub tag_id: i64,
    pub confidence: Option<f64>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: Option<String>,
    pub status: String,
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: Uuid,
    pub item_id: i64,
    pub item_type: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub verified_purchase: bool,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReadingProgress {
    pub id: i64,
    pub user_id: Uuid,
    pub item_id: i64,
    pub item_type: String,
    pub percent: f64,
    pub last_position: Option<String>,
    pub reading_seconds: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EasterEgg {
    pub id: i64,
    pub title: String,
    pub hint: Option<String>,
    pub item_id: i64,
    pub item_type: String,
    pub reward: serde_json::Value,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EasterEggDiscovery {
    pub id: i64,
    pub user_id: Uuid,
    pub egg_id: i64,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BetaApplication {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimelineEvent {
    pub id: i64,
    pub event_date: NaiveDate,
    pub category: String,
    pub description: String,
    pub book_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_type_accepts_catalog_levels_only() {
        for t in ["book", "volume", "saga", "arc", "issue"] {
            assert!(valid_item_type(t));
        }
        assert!(!valid_item_type("bundle"));
        assert!(!valid_item_type(""));
    }
}
