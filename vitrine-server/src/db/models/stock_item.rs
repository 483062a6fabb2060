//! Stock Item Model

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::str::FromStr;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Catalog item mirrored onto the price board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    /// Stable identifier, uppercase with underscores, assigned at creation
    pub id: String,
    /// Display name (uppercase by convention)
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    /// Unit price, non-negative
    pub price: Decimal,
    pub quantity: i64,
    /// Capacity hint, not enforced anywhere
    pub max: i64,
}

// price lives in a TEXT column, so the row mapping is manual
impl<'r> sqlx::FromRow<'r, SqliteRow> for StockItem {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let price_text: String = row.try_get("price")?;
        let price = Decimal::from_str(&price_text).map_err(|e| sqlx::Error::ColumnDecode {
            index: "price".into(),
            source: Box::new(e),
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            emoji: row.try_get("emoji")?,
            price,
            quantity: row.try_get("quantity")?,
            max: row.try_get("max")?,
        })
    }
}

impl StockItem {
    /// Normalize a candidate identifier: uppercase, whitespace runs → `_`
    pub fn normalize_id(raw: &str) -> String {
        WHITESPACE_RUN
            .replace_all(&raw.to_uppercase(), "_")
            .into_owned()
    }

    /// Default catalog used to seed an empty store on first run
    pub fn default_catalog() -> Vec<StockItem> {
        vec![
            StockItem {
                id: "TOMATRIO".into(),
                name: "TOMATRIO".into(),
                emoji: "🍅".into(),
                price: Decimal::new(50, 2),
                quantity: 202,
                max: 300,
            },
            StockItem {
                id: "MANGO".into(),
                name: "MANGO".into(),
                emoji: "🥭".into(),
                price: Decimal::new(70, 2),
                quantity: 260,
                max: 300,
            },
            StockItem {
                id: "MR_CARROT".into(),
                name: "MR CARROT".into(),
                emoji: "🥕".into(),
                price: Decimal::new(40, 2),
                quantity: 74,
                max: 150,
            },
            StockItem {
                id: "PLANTA".into(),
                name: "PLANTA (100k ~ 500k DPS)".into(),
                emoji: "🌱".into(),
                price: Decimal::new(750, 2),
                quantity: 12,
                max: 20,
            },
        ]
    }
}

/// Payload for creating a new stock item
///
/// Numeric fields tolerate whatever the panel form sends; non-numeric
/// input falls back to the creation defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct StockItemCreate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub emoji: Option<String>,
    #[serde(default, deserialize_with = "super::serde_helpers::lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "super::serde_helpers::lenient_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "super::serde_helpers::lenient_i64")]
    pub max: Option<i64>,
}

/// Partial update for a single item, fields absent are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockPatch {
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
}

impl StockPatch {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id_uppercases_and_joins() {
        assert_eq!(StockItem::normalize_id("mr carrot"), "MR_CARROT");
        assert_eq!(StockItem::normalize_id("Tomatrio"), "TOMATRIO");
    }

    #[test]
    fn test_normalize_id_collapses_whitespace_runs() {
        assert_eq!(StockItem::normalize_id("a  b\tc"), "A_B_C");
    }

    #[test]
    fn test_normalize_id_is_stable() {
        let once = StockItem::normalize_id("mango tree");
        assert_eq!(StockItem::normalize_id(&once), once);
    }
}
