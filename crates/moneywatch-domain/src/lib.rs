//! moneywatch-domain
//!
//! Pure ledger models (Account, Transaction, Budget, Subscription, categories), the
//! calendar window resolver, and the value types produced by derived views.
//! No I/O and no storage.

pub mod account;
pub mod budget;
pub mod category;
pub mod common;
pub mod ledger;
pub mod report;
pub mod serde_date;
pub mod subscription;
pub mod transaction;
pub mod window;

pub use account::*;
pub use budget::*;
pub use category::*;
pub use common::*;
pub use ledger::*;
pub use report::*;
pub use subscription::*;
pub use transaction::*;
pub use window::*;

// Versions used in public signatures.
pub use chrono;
pub use rust_decimal;
pub use uuid;
