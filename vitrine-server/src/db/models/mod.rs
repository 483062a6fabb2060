//! Database models

pub mod delivery;
pub mod serde_helpers;
pub mod stock_item;

pub use delivery::{DeliveryRecord, NewDeliveryRecord};
pub use stock_item::{StockItem, StockItemCreate, StockPatch};
