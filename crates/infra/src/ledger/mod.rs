//! Ownership-scoped application services over a [`LedgerStore`].
//!
//! [`LedgerStore`]: crate::store::LedgerStore

pub mod categories;
pub mod inventory;
pub mod orders;

use thiserror::Error;

use airhouse_core::DomainError;

use crate::store::StoreError;

pub use categories::CategoryLedger;
pub use inventory::{DashboardView, InventoryLedger, RestockView};
pub use orders::OrderLedger;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LedgerError {
    /// Missing rows and uniqueness failures are domain outcomes; only backend
    /// failures stay storage errors.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::Domain(DomainError::NotFound),
            StoreError::Conflict(msg) => Self::Domain(DomainError::Conflict(msg)),
            other => Self::Store(other),
        }
    }
}
