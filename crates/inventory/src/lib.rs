//! Inventory domain module.
//!
//! This crate contains business rules for categories and inventory items,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod filter;
pub mod item;
pub mod low_stock;

pub use category::{Category, CreateCategory};
pub use filter::InventoryFilter;
pub use item::{
    AdjustDirection, CreateItem, InventoryItem, ItemFields, StockAdjustment, ValidItemFields,
};
pub use low_stock::{LowStockReport, is_low_stock};
