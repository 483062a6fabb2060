//! DiscordClient — HTTP client for webhook endpoints
//!
//! Single shared reqwest client; every operation is a single attempt with
//! the transport timeout as its only bound. Non-2xx statuses are data, not
//! transport errors: callers decide what a failed send means.

use super::payload::{Message, WebhookPayload};
use crate::utils::AppError;
use async_trait::async_trait;
use reqwest::Client;

/// Outcome of a webhook send or edit
#[derive(Debug, Clone, Copy)]
pub struct WebhookOutcome {
    pub ok: bool,
    pub status: u16,
}

/// Seam for outbound notification sends
#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, url: &str, payload: &WebhookPayload) -> Result<WebhookOutcome, AppError>;
}

pub struct DiscordClient {
    client: Client,
}

impl DiscordClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch the message behind `message_id` through its owning webhook
    ///
    /// Returns `Ok(None)` when the endpoint answers non-2xx (unknown id,
    /// deleted message) — the error body is JSON without embeds, so the
    /// distinction does not matter to reconciliation.
    pub async fn fetch_message(
        &self,
        webhook_url: &str,
        message_id: &str,
    ) -> Result<Option<Message>, AppError> {
        let url = format!("{webhook_url}/messages/{message_id}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::remote(format!("Message fetch failed: {e}")))?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                message_id = %message_id,
                "Message fetch returned non-success status"
            );
            return Ok(None);
        }

        let message: Message = response
            .json()
            .await
            .map_err(|e| AppError::remote(format!("Failed to parse message body: {e}")))?;
        Ok(Some(message))
    }

    /// Edit an existing webhook message in place
    pub async fn edit_message(
        &self,
        webhook_url: &str,
        message_id: &str,
        payload: &WebhookPayload,
    ) -> Result<WebhookOutcome, AppError> {
        let url = format!("{webhook_url}/messages/{message_id}");
        let response = self
            .client
            .patch(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::remote(format!("Message edit failed: {e}")))?;

        Ok(WebhookOutcome {
            ok: response.status().is_success(),
            status: response.status().as_u16(),
        })
    }
}

#[async_trait]
impl WebhookSender for DiscordClient {
    /// Execute a webhook once; no retry on failure
    async fn send(&self, url: &str, payload: &WebhookPayload) -> Result<WebhookOutcome, AppError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::remote(format!("Webhook send failed: {e}")))?;

        Ok(WebhookOutcome {
            ok: response.status().is_success(),
            status: response.status().as_u16(),
        })
    }
}
