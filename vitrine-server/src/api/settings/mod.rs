//! Settings API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", settings_routes())
}

fn settings_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get).post(handler::update))
        .route("/message-id", post(handler::set_message_id))
}
