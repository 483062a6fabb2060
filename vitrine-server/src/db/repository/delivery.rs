//! Delivery Record Repository

use super::RepoResult;
use crate::db::models::{DeliveryRecord, NewDeliveryRecord};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new record and return it with its assigned id
    pub async fn create(&self, data: NewDeliveryRecord) -> RepoResult<DeliveryRecord> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let record: DeliveryRecord = sqlx::query_as(
            "INSERT INTO delivery_record \
             (mention, item_id, item_name, quantity, note, photo_url, webhook_sent, webhook_status, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, mention, item_id, item_name, quantity, note, photo_url, webhook_sent, webhook_status, timestamp",
        )
        .bind(&data.mention)
        .bind(&data.item_id)
        .bind(&data.item_name)
        .bind(data.quantity)
        .bind(&data.note)
        .bind(&data.photo_url)
        .bind(data.webhook_sent)
        .bind(data.webhook_status)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Full history, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<DeliveryRecord>> {
        let records: Vec<DeliveryRecord> = sqlx::query_as(
            "SELECT id, mention, item_id, item_name, quantity, note, photo_url, \
             webhook_sent, webhook_status, timestamp \
             FROM delivery_record ORDER BY timestamp DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
