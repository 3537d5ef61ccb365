//! Orders domain module.
//!
//! Business rules for orders and their line items, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod filter;
pub mod form;
pub mod order;

pub use filter::OrderFilter;
pub use form::{LineForm, OrderForm, OrderHeader, OrderPlan, PlanTarget};
pub use order::{Order, OrderItem};
