//! Stock Item Repository

use super::{RepoError, RepoResult};
use crate::db::models::{StockItem, StockItemCreate, StockPatch};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::collections::HashMap;

// =============================================================================
// Stock Item Repository
// =============================================================================

#[derive(Clone)]
pub struct StockItemRepository {
    pool: SqlitePool,
}

impl StockItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all items ordered by name ascending
    pub async fn find_all(&self) -> RepoResult<Vec<StockItem>> {
        let items: Vec<StockItem> = sqlx::query_as(
            "SELECT id, name, emoji, price, quantity, max FROM stock_item ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Find item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<StockItem>> {
        let item: Option<StockItem> =
            sqlx::query_as("SELECT id, name, emoji, price, quantity, max FROM stock_item WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(item)
    }

    pub async fn count(&self) -> RepoResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stock_item")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Create a new item
    ///
    /// The id is normalized once here and never recomputed afterwards.
    /// An absent `max` falls back to the quantity, and a zero quantity
    /// falls back to 100 (legacy panel behavior).
    pub async fn create(&self, data: StockItemCreate) -> RepoResult<StockItem> {
        let raw_id = data
            .id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| RepoError::Validation("id is required".into()))?;
        let name = data
            .name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| RepoError::Validation("name is required".into()))?;

        let id = StockItem::normalize_id(raw_id);
        if self.find_by_id(&id).await?.is_some() {
            return Err(RepoError::Duplicate(format!("Item {id} already exists")));
        }

        let quantity = data.quantity.unwrap_or(0);
        let item = StockItem {
            id,
            name: name.to_uppercase(),
            emoji: data.emoji.unwrap_or_default(),
            price: data.price.unwrap_or(Decimal::ZERO),
            quantity,
            max: data
                .max
                .filter(|m| *m != 0)
                .unwrap_or(if quantity != 0 { quantity } else { 100 }),
        };

        self.insert(&item).await?;
        Ok(item)
    }

    /// Apply partial updates keyed by item id
    ///
    /// Only the fields present in each patch are written; items absent from
    /// the map (and ids that match nothing) are left untouched.
    pub async fn apply_updates(&self, updates: &HashMap<String, StockPatch>) -> RepoResult<()> {
        for (id, patch) in updates {
            if patch.is_empty() {
                continue;
            }

            // Build dynamic SET clauses, two fields at most
            let mut set_parts: Vec<&str> = Vec::new();
            if patch.quantity.is_some() {
                set_parts.push("quantity = ?");
            }
            if patch.price.is_some() {
                set_parts.push("price = ?");
            }
            let sql = format!("UPDATE stock_item SET {} WHERE id = ?", set_parts.join(", "));

            let mut query = sqlx::query(&sql);
            if let Some(q) = patch.quantity {
                query = query.bind(q);
            }
            if let Some(p) = patch.price {
                query = query.bind(p.to_string());
            }
            query.bind(id).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Populate the store with the default catalog, only when empty
    ///
    /// Idempotent across restarts: re-checks emptiness each time instead of
    /// keeping a seeded flag.
    pub async fn seed_if_empty(&self, defaults: &[StockItem]) -> RepoResult<bool> {
        if self.count().await? > 0 {
            return Ok(false);
        }
        tracing::info!("Stock table empty, seeding default catalog");
        for item in defaults {
            self.insert(item).await?;
        }
        Ok(true)
    }

    async fn insert(&self, item: &StockItem) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO stock_item (id, name, emoji, price, quantity, max) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.emoji)
        .bind(item.price.to_string())
        .bind(item.quantity)
        .bind(item.max)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
