//! Board synchronization
//!
//! Orchestrates the codec against the remote board message: fetch-and-merge
//! on startup or when the tracked message changes, render-and-publish after
//! local edits. Both directions are no-ops until the webhook and message id
//! are configured.

use super::codec;
use crate::db::repository::StockItemRepository;
use crate::discord::DiscordClient;
use crate::settings::SettingsStore;
use crate::utils::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct BoardSync {
    stock: StockItemRepository,
    settings: Arc<SettingsStore>,
    discord: Arc<DiscordClient>,
}

impl BoardSync {
    pub fn new(
        stock: StockItemRepository,
        settings: Arc<SettingsStore>,
        discord: Arc<DiscordClient>,
    ) -> Self {
        Self {
            stock,
            settings,
            discord,
        }
    }

    /// Merge the remote board message into local stock
    ///
    /// Items the board does not mention keep their local state, which is
    /// how items added after the message was posted survive a reconcile.
    /// Callers on the startup path swallow the error; the panel route that
    /// changes the message id surfaces it.
    pub async fn reconcile_from_remote(&self) -> Result<(), AppError> {
        let snapshot = self.settings.snapshot();
        let Some((webhook, message_id)) = snapshot.board_target() else {
            tracing::info!("Board webhook or message id not configured, skipping reconciliation");
            return Ok(());
        };

        let Some(message) = self.discord.fetch_message(webhook, message_id).await? else {
            return Ok(());
        };
        let Some(embed) = message.embeds.first() else {
            tracing::info!("Board message has no embeds, nothing to reconcile");
            return Ok(());
        };

        let known = self.stock.find_all().await?;
        let updates = codec::parse_board(&embed.fields, &known);
        if updates.is_empty() {
            return Ok(());
        }

        self.stock.apply_updates(&updates).await?;
        tracing::info!(
            items = updates.len(),
            "Local stock updated from board message"
        );
        Ok(())
    }

    /// Reconcile once at startup; failures must not block boot
    pub async fn reconcile_on_startup(&self) {
        if let Err(e) = self.reconcile_from_remote().await {
            tracing::warn!(error = %e, "Startup reconciliation failed, keeping local state");
        }
    }

    /// Render the current catalog and edit it into the board message
    ///
    /// Reads the store at call time, so a publish following several edits
    /// reflects the latest committed state.
    pub async fn publish(&self) -> Result<(), AppError> {
        let snapshot = self.settings.snapshot();
        let Some((webhook, message_id)) = snapshot.board_target() else {
            tracing::info!("Board webhook or message id not configured, skipping publish");
            return Ok(());
        };

        let items = self.stock.find_all().await?;
        let payload = codec::render_board(&items);
        let outcome = self.discord.edit_message(webhook, message_id, &payload).await?;
        if !outcome.ok {
            return Err(AppError::remote(format!(
                "Board edit returned status {}",
                outcome.status
            )));
        }

        tracing::info!(items = items.len(), "Board message updated");
        Ok(())
    }

    /// Fire-and-forget publish after a stock mutation
    ///
    /// The triggering request returns without awaiting this; failures land
    /// in the log, never in the caller's response.
    pub fn spawn_publish(&self) {
        let sync = self.clone();
        tokio::spawn(async move {
            if let Err(e) = sync.publish().await {
                tracing::warn!(error = %e, "Board publish failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn make_sync(dir: &std::path::Path) -> BoardSync {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        BoardSync::new(
            StockItemRepository::new(pool),
            Arc::new(SettingsStore::load(dir.join("settings.json"))),
            Arc::new(DiscordClient::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_reconcile_without_config_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let sync = make_sync(dir.path()).await;
        // no webhook/message id configured: returns before any network call
        sync.reconcile_from_remote().await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_without_config_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let sync = make_sync(dir.path()).await;
        sync.publish().await.unwrap();
    }
}
