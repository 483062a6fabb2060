//! Stock API Handlers

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::audit::AuditAction;
use crate::core::ServerState;
use crate::db::models::{StockItem, StockItemCreate, StockPatch};
use crate::db::repository::StockItemRepository;
use crate::utils::AppResult;

/// GET /api/stock - full catalog, name ascending
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<StockItem>>> {
    let repo = StockItemRepository::new(state.db.clone());
    let items = repo.find_all().await?;
    Ok(Json(items))
}

/// POST /api/stock - add a catalog item
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StockItemCreate>,
) -> AppResult<Json<StockItem>> {
    let repo = StockItemRepository::new(state.db.clone());
    let item = repo.create(payload).await?;

    state
        .audit
        .record(
            AuditAction::StockItemCreated,
            &item.id,
            serde_json::json!({ "name": &item.name }),
        )
        .await;

    state.board.spawn_publish();
    Ok(Json(item))
}

/// POST /api/stock/updates - bulk panel edit
///
/// The body is the panel form as a flat string map with `{ID}_quantity` /
/// `{ID}_price` keys. Values that fail numeric parsing are ignored with a
/// warning; the request itself never fails over a malformed number.
pub async fn update_many(
    State(state): State<ServerState>,
    Json(form): Json<HashMap<String, String>>,
) -> AppResult<Json<Vec<StockItem>>> {
    let repo = StockItemRepository::new(state.db.clone());
    let items = repo.find_all().await?;

    let mut updates: HashMap<String, StockPatch> = HashMap::new();
    for item in &items {
        let mut patch = StockPatch::default();

        if let Some(raw) = form.get(&format!("{}_quantity", item.id)) {
            match raw.trim().parse::<i64>() {
                Ok(quantity) => patch.quantity = Some(quantity),
                Err(_) => {
                    tracing::warn!(item = %item.id, value = %raw, "Ignoring unparseable quantity")
                }
            }
        }
        if let Some(raw) = form.get(&format!("{}_price", item.id)) {
            match Decimal::from_str(raw.trim()) {
                Ok(price) => patch.price = Some(price),
                Err(_) => {
                    tracing::warn!(item = %item.id, value = %raw, "Ignoring unparseable price")
                }
            }
        }

        if !patch.is_empty() {
            updates.insert(item.id.clone(), patch);
        }
    }

    if !updates.is_empty() {
        repo.apply_updates(&updates).await?;
        let mut touched: Vec<&str> = updates.keys().map(String::as_str).collect();
        touched.sort_unstable();
        state
            .audit
            .record(
                AuditAction::StockUpdated,
                "stock",
                serde_json::json!({ "items": touched }),
            )
            .await;
    }

    // Best-effort mirror of the new state onto the board
    state.board.spawn_publish();

    let items = repo.find_all().await?;
    Ok(Json(items))
}
