//! Delivery API Handlers
//!
//! The create route takes multipart form data so a proof photo can ride
//! along with the delivery fields.

use axum::{
    Json,
    extract::{Multipart, State},
};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::core::ServerState;
use crate::db::models::DeliveryRecord;
use crate::db::repository::DeliveryRepository;
use crate::delivery::{DeliveryOutcome, DeliveryRequest};
use crate::utils::{AppError, AppResult};

/// Maximum photo size (5MB)
const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Supported photo formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// POST /api/deliveries - record a delivery and notify the webhook
pub async fn create(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<DeliveryOutcome>> {
    let mut request = DeliveryRequest::default();
    let mut photo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "mention" => request.mention = non_empty(field.text().await?),
            "item_id" => request.item_id = non_empty(field.text().await?),
            "quantity" => request.quantity = field.text().await?.trim().parse().ok(),
            "note" => request.note = non_empty(field.text().await?),
            "photo" => {
                let filename = field.file_name().map(ToString::to_string);
                let data = field.bytes().await?.to_vec();
                if let (Some(filename), false) = (filename, data.is_empty()) {
                    let ext = extension_of(&filename)?;
                    photo = Some((ext, data));
                }
            }
            _ => {}
        }
    }

    if let Some((ext, data)) = photo {
        request.photo_url = Some(store_photo(&state, &ext, data)?);
    }

    let outcome = state.pipeline.execute(&*state.discord, request).await?;
    Ok(Json(outcome))
}

/// GET /api/deliveries - history, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DeliveryRecord>>> {
    let repo = DeliveryRepository::new(state.db.clone());
    let records = repo.find_all().await?;
    Ok(Json(records))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn extension_of(filename: &str) -> Result<String, AppError> {
    PathBuf::from(filename)
        .extension()
        .and_then(|ext| ext.to_str().map(str::to_lowercase))
        .ok_or_else(|| AppError::validation(format!("Invalid file extension for: {filename}")))
}

/// Validate and store a proof photo, returning its public URL
fn store_photo(state: &ServerState, ext: &str, data: Vec<u8>) -> Result<String, AppError> {
    if data.len() > MAX_PHOTO_SIZE {
        return Err(AppError::validation(format!(
            "Photo too large. Maximum size is {}MB",
            MAX_PHOTO_SIZE / 1024 / 1024
        )));
    }
    if !SUPPORTED_FORMATS.contains(&ext) {
        return Err(AppError::validation(format!(
            "Unsupported photo format '{}'. Supported: {}",
            ext,
            SUPPORTED_FORMATS.join(", ")
        )));
    }
    // Verify it's actually an image by trying to load it
    if let Err(e) = image::load_from_memory(&data) {
        return Err(AppError::validation(format!("Invalid image file ({ext}): {e}")));
    }

    let uploads_dir = state.config.uploads_dir();
    fs::create_dir_all(&uploads_dir)
        .map_err(|e| AppError::internal(format!("Failed to create uploads directory: {e}")))?;

    let filename = format!("{}.{ext}", Uuid::new_v4());
    fs::write(uploads_dir.join(&filename), &data)
        .map_err(|e| AppError::internal(format!("Failed to save photo: {e}")))?;

    tracing::info!(file = %filename, size = data.len(), "Delivery photo stored");

    Ok(format!(
        "{}/uploads/{}",
        state.config.public_base_url.trim_end_matches('/'),
        filename
    ))
}
