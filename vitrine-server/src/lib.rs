//! Vitrine Server - storefront backend mirrored onto a Discord price board
//!
//! # Overview
//!
//! The server keeps a small stock catalog and mirrors it into a single
//! webhook-owned Discord message that acts as the public price board:
//!
//! - **Board codec** (`board::codec`): pure render/parse pair between the
//!   catalog and the board's embed text
//! - **Board sync** (`board::sync`): fetch-and-merge on startup, render-and-
//!   publish after panel edits
//! - **Deliveries** (`delivery`): idempotent, audited hand-out notifications
//! - **Persistence** (`db`): embedded SQLite via sqlx
//! - **HTTP API** (`api`): panel routes
//!
//! # Module structure
//!
//! ```text
//! vitrine-server/src/
//! ├── core/          # configuration, state, server
//! ├── db/            # pool, models, repositories
//! ├── settings/      # durable panel settings
//! ├── discord/       # webhook payloads + client
//! ├── board/         # codec + sync
//! ├── delivery/      # delivery pipeline
//! ├── audit/         # audit log
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod audit;
pub mod board;
pub mod core;
pub mod db;
pub mod delivery;
pub mod discord;
pub mod settings;
pub mod utils;

// Re-export common types
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and set up logging; call first thing in `main`
pub fn setup_environment() {
    let _ = dotenvy::dotenv();
    init_logger();
}
