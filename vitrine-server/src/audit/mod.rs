//! Audit log
//!
//! Append-only record of panel actions. Entries are immutable and never
//! deleted; queries read newest first. Inserts are best-effort: a lost
//! audit row must not fail the request that triggered it.

use crate::db::repository::RepoResult;
use serde::Serialize;
use sqlx::Row;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

/// Audited action types (enum, not free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Item added through the panel
    StockItemCreated,
    /// Quantities/prices edited through the panel
    StockUpdated,
    /// Webhook endpoints changed
    SettingsChanged,
    /// Tracked board message id changed
    BoardMessageChanged,
    /// Item handed out to a recipient
    DeliveryExecuted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::StockItemCreated => "stock_item_created",
            AuditAction::StockUpdated => "stock_updated",
            AuditAction::SettingsChanged => "settings_changed",
            AuditAction::BoardMessageChanged => "board_message_changed",
            AuditAction::DeliveryExecuted => "delivery_executed",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit log entry (immutable)
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    /// Unix millis
    pub timestamp: i64,
    pub action: String,
    pub resource: String,
    pub details: serde_json::Value,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for AuditEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let details_text: String = row.try_get("details")?;
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: row.try_get("timestamp")?,
            action: row.try_get("action")?,
            resource: row.try_get("resource")?,
            details: serde_json::from_str(&details_text).unwrap_or(serde_json::Value::Null),
        })
    }
}

#[derive(Clone)]
pub struct AuditService {
    pool: SqlitePool,
}

impl AuditService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write an audit entry, logging instead of failing on error
    pub async fn record(&self, action: AuditAction, resource: &str, details: serde_json::Value) {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query(
            "INSERT INTO audit_entry (timestamp, action, resource, details) VALUES (?, ?, ?, ?)",
        )
        .bind(timestamp)
        .bind(action.as_str())
        .bind(resource)
        .bind(details.to_string())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(action = %action, error = %e, "Failed to write audit entry");
        }
    }

    /// Recent entries, newest first
    pub async fn recent(&self, limit: i64) -> RepoResult<Vec<AuditEntry>> {
        let entries: Vec<AuditEntry> = sqlx::query_as(
            "SELECT id, timestamp, action, resource, details \
             FROM audit_entry ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
