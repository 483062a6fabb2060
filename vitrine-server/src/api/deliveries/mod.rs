//! Deliveries API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/deliveries", delivery_routes())
}

fn delivery_routes() -> Router<ServerState> {
    Router::new().route("/", get(handler::list).post(handler::create))
}
