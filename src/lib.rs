#![doc(test(attr(deny(warnings))))]

//! Moneywatch is a personal-finance ledger engine: accounts, transactions,
//! budgets and subscriptions held in memory, persisted per collection, and
//! rolled up into budget progress, trends and dashboards.

pub mod errors;
pub mod utils;

use std::sync::{Arc, Once};

pub use errors::{AppError, AppResult};
pub use moneywatch_config as config;
pub use moneywatch_core as engine;
pub use moneywatch_domain as domain;
pub use moneywatch_storage_json as storage;

use moneywatch_config::Config;
use moneywatch_core::{
    BreakdownOptions, Clock, DashboardRequest, LedgerSession, LoadReport, ReseedPolicy,
    SeedOptions, SystemClock,
};
use moneywatch_storage_json::JsonFileStore;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Moneywatch tracing initialized.");
    });
}

/// Opens the ledger stored under the configured data directory, seeding it on
/// first use.
pub fn open_session(config: &Config) -> AppResult<(LedgerSession, LoadReport)> {
    open_session_with_clock(config, Arc::new(SystemClock))
}

pub fn open_session_with_clock(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> AppResult<(LedgerSession, LoadReport)> {
    let data_dir = config.resolve_data_dir();
    let store = JsonFileStore::new(&data_dir)?;
    let options = SeedOptions {
        seed: config.seed,
        week_start: Some(config.week_start.weekday()),
    };
    let (session, report) = LedgerSession::open(Box::new(store), clock, options)?;
    tracing::info!(
        data_dir = %data_dir.display(),
        seeded = report.seeded.len(),
        recovered = report.recovered.len(),
        "Opened ledger session."
    );
    Ok((session, report))
}

/// Dashboard request built from the configured defaults, targeting the current month.
pub fn dashboard_request(config: &Config) -> DashboardRequest {
    DashboardRequest {
        target: None,
        trend_range: config.dashboard.trend_range,
        upcoming_horizon_days: config.dashboard.upcoming_horizon_days,
        breakdown: BreakdownOptions::default().with_limit(config.dashboard.breakdown_limit),
    }
}

pub fn reseed_policy(config: &Config) -> ReseedPolicy {
    ReseedPolicy {
        min_transactions: config.reseed.min_transactions,
        horizon_days: config.reseed.horizon_days,
    }
}
