//! moneywatch-core
//!
//! The ledger aggregation engine: the mutable ledger store, budget reconciliation,
//! every time-windowed analytic view, seeding, and the key-value persistence
//! contract. Depends on moneywatch-domain. No terminal I/O and no concrete storage
//! backend beyond the in-memory one.

pub mod budget_service;
pub mod dashboard_service;
pub mod error;
pub mod seed;
pub mod session;
pub mod storage;
pub mod store;
pub mod subscription_service;
pub mod summary_service;
pub mod time;
pub mod transaction_service;

pub use budget_service::*;
pub use dashboard_service::*;
pub use error::{CoreError, CoreResult};
pub use seed::SeedGenerator;
pub use session::*;
pub use storage::*;
pub use store::*;
pub use subscription_service::*;
pub use summary_service::*;
pub use time::*;
pub use transaction_service::*;

#[cfg(test)]
mod tests;
