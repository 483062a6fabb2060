//! Price-board state mirroring
//!
//! - [`codec`] - pure render/parse pair for the board text grammar
//! - [`sync`] - fetch-and-merge / render-and-publish orchestration

pub mod codec;
pub mod sync;

pub use sync::BoardSync;
