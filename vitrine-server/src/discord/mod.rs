//! Messaging collaborator
//!
//! Typed payloads plus the reqwest client that talks to the two fixed
//! webhook endpoints. No general Discord client lives here.

pub mod client;
pub mod payload;

pub use client::{DiscordClient, WebhookOutcome, WebhookSender};
pub use payload::{Embed, EmbedField, EmbedFooter, EmbedThumbnail, Message, WebhookPayload};
