//! Delivery pipeline
//!
//! Turns a validated delivery request into an outbound notification plus an
//! immutable history record. The record is written no matter how the send
//! goes: the business event is the hand-out, not the notification.

use crate::audit::{AuditAction, AuditService};
use crate::db::models::{DeliveryRecord, NewDeliveryRecord, StockItem};
use crate::db::repository::{DeliveryRepository, StockItemRepository};
use crate::discord::{
    Embed, EmbedField, EmbedFooter, EmbedThumbnail, WebhookOutcome, WebhookPayload, WebhookSender,
};
use crate::settings::SettingsStore;
use crate::utils::AppError;
use regex::Regex;
use std::sync::Arc;
use std::sync::LazyLock;

const DELIVERY_TITLE: &str = "📦 Entrega Confirmada";
const DELIVERY_USERNAME: &str = "VITRINE - Entregas";
const DELIVERY_FOOTER: &str = "VITRINE STORE — Entrega";
const DELIVERY_COLOR: u32 = 3066993;

// Raw snowflake ids are 17-19 digits; anything else is free text
static NUMERIC_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{17,19}$").expect("mention pattern"));

/// Incoming delivery request, already past multipart decoding
#[derive(Debug, Clone, Default)]
pub struct DeliveryRequest {
    pub mention: Option<String>,
    pub item_id: Option<String>,
    pub quantity: Option<i64>,
    pub note: Option<String>,
    pub photo_url: Option<String>,
}

/// Result handed back to the caller: the persisted record and the
/// notification status observed on the wire
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeliveryOutcome {
    pub record: DeliveryRecord,
    pub webhook_status: u16,
}

#[derive(Clone)]
pub struct DeliveryPipeline {
    stock: StockItemRepository,
    deliveries: DeliveryRepository,
    settings: Arc<SettingsStore>,
    audit: AuditService,
}

impl DeliveryPipeline {
    pub fn new(
        stock: StockItemRepository,
        deliveries: DeliveryRepository,
        settings: Arc<SettingsStore>,
        audit: AuditService,
    ) -> Self {
        Self {
            stock,
            deliveries,
            settings,
            audit,
        }
    }

    pub async fn execute(
        &self,
        sender: &dyn WebhookSender,
        request: DeliveryRequest,
    ) -> Result<DeliveryOutcome, AppError> {
        let settings = self.settings.snapshot();
        let webhook = settings
            .delivery_webhook
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::config("Delivery webhook not configured in the panel"))?;

        let item_id = request
            .item_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("item_id is required"))?;

        let item = self
            .stock
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id}")))?;

        let quantity = request.quantity.filter(|q| *q != 0).unwrap_or(1);
        let payload = build_payload(&item, quantity, &request);

        // Exactly one attempt; a transport failure is still an audited
        // delivery with status 0
        let outcome = match sender.send(webhook, &payload).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, item = %item.id, "Delivery webhook send failed");
                WebhookOutcome {
                    ok: false,
                    status: 0,
                }
            }
        };

        let record = self
            .deliveries
            .create(NewDeliveryRecord {
                mention: request.mention.clone(),
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                quantity,
                note: request.note.clone(),
                photo_url: request.photo_url.clone(),
                webhook_sent: outcome.ok,
                webhook_status: outcome.status as i64,
            })
            .await?;

        self.audit
            .record(
                AuditAction::DeliveryExecuted,
                &record.item_id,
                serde_json::json!({
                    "mention": record.mention,
                    "quantity": record.quantity,
                    "webhook_sent": record.webhook_sent,
                }),
            )
            .await;

        Ok(DeliveryOutcome {
            record,
            webhook_status: outcome.status,
        })
    }
}

/// Rewrite a bare snowflake into a mention tag, pass anything else through
fn mention_content(mention: Option<&str>) -> String {
    let raw = mention.unwrap_or_default();
    if NUMERIC_MENTION_RE.is_match(raw) {
        format!("<@{raw}>")
    } else {
        raw.to_string()
    }
}

fn build_payload(item: &StockItem, quantity: i64, request: &DeliveryRequest) -> WebhookPayload {
    let recipient = request
        .mention
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or("Não informado");

    let embed = Embed {
        title: Some(DELIVERY_TITLE.to_string()),
        color: Some(DELIVERY_COLOR),
        description: request.note.clone(),
        thumbnail: request
            .photo_url
            .as_deref()
            .map(|url| EmbedThumbnail { url: url.to_string() }),
        fields: vec![
            EmbedField::inline("Destinatário", recipient),
            EmbedField::inline("Produto", format!("{} {}", item.emoji, item.name)),
            EmbedField::inline("Quantidade", quantity.to_string()),
            EmbedField::inline("Preço Unit.", format!("R${:.2}", item.price)),
        ],
        footer: Some(EmbedFooter {
            text: DELIVERY_FOOTER.to_string(),
        }),
    };

    WebhookPayload {
        // The mention must live in content for the ping to fire
        content: Some(mention_content(request.mention.as_deref())),
        username: Some(DELIVERY_USERNAME.to_string()),
        avatar_url: None,
        embeds: vec![embed],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::str::FromStr;
    use std::sync::Mutex;

    /// Records every payload; answers with a fixed outcome or transport error
    struct MockSender {
        outcome: Option<WebhookOutcome>,
        sent: Mutex<Vec<(String, WebhookPayload)>>,
    }

    impl MockSender {
        fn with_status(ok: bool, status: u16) -> Self {
            Self {
                outcome: Some(WebhookOutcome { ok, status }),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing_transport() -> Self {
            Self {
                outcome: None,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent_payloads(&self) -> Vec<(String, WebhookPayload)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WebhookSender for MockSender {
        async fn send(
            &self,
            url: &str,
            payload: &WebhookPayload,
        ) -> Result<WebhookOutcome, AppError> {
            self.sent
                .lock()
                .unwrap()
                .push((url.to_string(), payload.clone()));
            self.outcome
                .ok_or_else(|| AppError::remote("connection refused"))
        }
    }

    struct Fixture {
        pipeline: DeliveryPipeline,
        deliveries: DeliveryRepository,
        _dir: tempfile::TempDir,
    }

    async fn make_fixture(configure_webhook: bool) -> Fixture {
        let pool: SqlitePool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let stock = StockItemRepository::new(pool.clone());
        stock
            .seed_if_empty(&[StockItem {
                id: "MANGO".into(),
                name: "MANGO".into(),
                emoji: "🥭".into(),
                price: Decimal::from_str("7.5").unwrap(),
                quantity: 10,
                max: 300,
            }])
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let settings = Arc::new(SettingsStore::load(dir.path().join("settings.json")));
        if configure_webhook {
            settings
                .update(|s| {
                    s.delivery_webhook = Some("https://example.com/api/webhooks/1/token".into())
                })
                .unwrap();
        }

        let deliveries = DeliveryRepository::new(pool.clone());
        Fixture {
            pipeline: DeliveryPipeline::new(
                stock,
                deliveries.clone(),
                settings,
                AuditService::new(pool),
            ),
            deliveries,
            _dir: dir,
        }
    }

    fn make_request(item_id: &str) -> DeliveryRequest {
        DeliveryRequest {
            mention: Some("John".into()),
            item_id: Some(item_id.into()),
            quantity: Some(2),
            note: None,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_numeric_mention_rewritten_to_tag() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(true, 204);

        let mut request = make_request("MANGO");
        request.mention = Some("123456789012345678".into());
        fx.pipeline.execute(&sender, request).await.unwrap();

        let sent = sender.sent_payloads();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.content.as_deref(), Some("<@123456789012345678>"));
    }

    #[tokio::test]
    async fn test_free_text_mention_passes_through() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(true, 204);

        fx.pipeline.execute(&sender, make_request("MANGO")).await.unwrap();

        let sent = sender.sent_payloads();
        assert_eq!(sent[0].1.content.as_deref(), Some("John"));
        // the embed still names the recipient
        assert_eq!(sent[0].1.embeds[0].fields[0].value, "John");
    }

    #[tokio::test]
    async fn test_embed_carries_item_and_price() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(true, 204);

        let outcome = fx.pipeline.execute(&sender, make_request("MANGO")).await.unwrap();
        assert_eq!(outcome.webhook_status, 204);
        assert!(outcome.record.webhook_sent);

        let sent = sender.sent_payloads();
        let fields = &sent[0].1.embeds[0].fields;
        assert_eq!(fields[1].value, "🥭 MANGO");
        assert_eq!(fields[2].value, "2");
        assert_eq!(fields[3].value, "R$7.50");
    }

    #[tokio::test]
    async fn test_unknown_item_creates_no_record() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(true, 204);

        let err = fx
            .pipeline
            .execute(&sender, make_request("GHOST"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(sender.sent_payloads().is_empty());
        assert!(fx.deliveries.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_item_id_rejected() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(true, 204);

        let mut request = make_request("MANGO");
        request.item_id = None;
        let err = fx.pipeline.execute(&sender, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_webhook_is_blocking() {
        let fx = make_fixture(false).await;
        let sender = MockSender::with_status(true, 204);

        let err = fx
            .pipeline
            .execute(&sender, make_request("MANGO"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(fx.deliveries.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_still_records_delivery() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(false, 500);

        let outcome = fx.pipeline.execute(&sender, make_request("MANGO")).await.unwrap();
        assert!(!outcome.record.webhook_sent);
        assert_eq!(outcome.record.webhook_status, 500);

        let records = fx.deliveries.find_all().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_records_status_zero() {
        let fx = make_fixture(true).await;
        let sender = MockSender::failing_transport();

        let outcome = fx.pipeline.execute(&sender, make_request("MANGO")).await.unwrap();
        assert!(!outcome.record.webhook_sent);
        assert_eq!(outcome.record.webhook_status, 0);
        assert_eq!(outcome.webhook_status, 0);
    }

    #[tokio::test]
    async fn test_quantity_defaults_to_one() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(true, 204);

        let mut request = make_request("MANGO");
        request.quantity = None;
        let outcome = fx.pipeline.execute(&sender, request).await.unwrap();
        assert_eq!(outcome.record.quantity, 1);
    }

    #[tokio::test]
    async fn test_records_ordered_newest_first() {
        let fx = make_fixture(true).await;
        let sender = MockSender::with_status(true, 204);

        fx.pipeline.execute(&sender, make_request("MANGO")).await.unwrap();
        fx.pipeline.execute(&sender, make_request("MANGO")).await.unwrap();

        let records = fx.deliveries.find_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].id > records[1].id);
    }
}
