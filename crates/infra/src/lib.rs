//! Infrastructure layer: configuration, storage and the application services
//! built on it.

pub mod accounts;
pub mod config;
pub mod identity;
pub mod ledger;
pub mod store;

pub use accounts::{AccountStore, InMemoryAccountStore, PostgresAccountStore};
pub use config::{AppConfig, ConfigError};
pub use identity::{Authenticated, IdentityError, IdentityService, IssuedToken};
pub use ledger::{
    CategoryLedger, DashboardView, InventoryLedger, LedgerError, LedgerResult, OrderLedger, RestockView,
};
pub use store::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore, StoreError, StoreResult};
