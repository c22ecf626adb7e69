//! moneywatch-config
//!
//! Persistent user preferences: currency and locale hints, where the ledger files
//! live, seeding and reseed thresholds, and dashboard defaults.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, DashboardSettings, ReseedSettings, WeekStart};
