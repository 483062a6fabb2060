//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`stock`] - catalog listing, creation and panel edits
//! - [`settings`] - webhook endpoints and board message id
//! - [`deliveries`] - delivery requests and history
//! - [`audit_log`] - recent audit entries

pub mod audit_log;
pub mod deliveries;
pub mod health;
pub mod settings;
pub mod stock;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
