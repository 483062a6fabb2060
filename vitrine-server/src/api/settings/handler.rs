//! Settings API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::audit::AuditAction;
use crate::core::ServerState;
use crate::settings::AppSettings;
use crate::utils::{AppError, AppResult};

/// GET /api/settings - current panel settings
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<AppSettings>> {
    Ok(Json(state.settings.snapshot()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub main_webhook: Option<String>,
    pub delivery_webhook: Option<String>,
}

/// POST /api/settings - update webhook endpoints
///
/// Absent fields are left untouched; present fields are persisted
/// immediately.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<AppSettings>> {
    let settings = state.settings.update(|s| {
        if let Some(main) = payload.main_webhook {
            s.main_webhook = Some(main);
        }
        if let Some(delivery) = payload.delivery_webhook {
            s.delivery_webhook = Some(delivery);
        }
    })?;

    state
        .audit
        .record(
            AuditAction::SettingsChanged,
            "settings",
            serde_json::json!({
                "main_webhook_set": settings.main_webhook.is_some(),
                "delivery_webhook_set": settings.delivery_webhook.is_some(),
            }),
        )
        .await;

    tracing::info!("Panel settings saved");
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
pub struct MessageIdUpdate {
    pub id: Option<String>,
}

/// POST /api/settings/message-id - track a new board message
///
/// Persists the id, then immediately reconciles local stock from that
/// message. Unlike the startup path, fetch failures surface to this caller.
pub async fn set_message_id(
    State(state): State<ServerState>,
    Json(payload): Json<MessageIdUpdate>,
) -> AppResult<Json<AppSettings>> {
    let id = payload
        .id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::validation("id is required"))?;

    let settings = state.settings.update(|s| {
        s.main_message_id = Some(id.clone());
    })?;

    state
        .audit
        .record(
            AuditAction::BoardMessageChanged,
            "settings",
            serde_json::json!({ "main_message_id": &id }),
        )
        .await;

    state.board.reconcile_from_remote().await?;

    Ok(Json(settings))
}
