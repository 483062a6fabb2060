//! Delivery Record Model

use serde::Serialize;

/// Immutable record of an item handed to a recipient
///
/// Created exactly once per delivery request, even when the outbound
/// notification fails — `webhook_sent`/`webhook_status` capture the outcome.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DeliveryRecord {
    pub id: i64,
    pub mention: Option<String>,
    pub item_id: String,
    /// Name snapshot, survives later catalog changes
    pub item_name: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub photo_url: Option<String>,
    pub webhook_sent: bool,
    pub webhook_status: i64,
    /// Unix millis, used for descending ordering on read
    pub timestamp: i64,
}

/// Fields for inserting a new delivery record
#[derive(Debug, Clone)]
pub struct NewDeliveryRecord {
    pub mention: Option<String>,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub photo_url: Option<String>,
    pub webhook_sent: bool,
    pub webhook_status: i64,
}
