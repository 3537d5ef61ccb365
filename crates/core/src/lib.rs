//! `airhouse-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod owner;
pub mod validation;

pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ItemId, OrderId, OrderItemId, UserId};
pub use owner::Owner;
pub use validation::{FieldError, FieldErrors};
