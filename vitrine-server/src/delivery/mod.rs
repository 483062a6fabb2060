//! Delivery event pipeline

pub mod pipeline;

pub use pipeline::{DeliveryOutcome, DeliveryPipeline, DeliveryRequest};
