//! Loading, seeding and flushing a ledger against a key-value store.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Weekday};
use serde::de::DeserializeOwned;

use moneywatch_domain::{Dashboard, Ledger, Transaction};

use crate::{
    ledger_warnings, reset_all, seed, Clock, Collection, CoreResult, DashboardRequest,
    DashboardService, KeyValueStore, LedgerStore,
};

/// How to build the default data set when a collection has never been stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOptions {
    /// Generator seed. `None` derives one from today's date.
    pub seed: Option<u64>,
    pub week_start: Option<Weekday>,
}

/// Thresholds for [`needs_reseed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReseedPolicy {
    pub min_transactions: usize,
    /// Days past today a stored transaction may be dated.
    pub horizon_days: u32,
}

impl Default for ReseedPolicy {
    fn default() -> Self {
        Self {
            min_transactions: 100,
            horizon_days: 0,
        }
    }
}

/// Outcome of [`LedgerSession::open`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Collections whose key was absent and were filled with defaults.
    pub seeded: Vec<Collection>,
    /// Collections whose stored value could not be read and were replaced with defaults.
    pub recovered: Vec<Collection>,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.seeded.is_empty() && self.recovered.is_empty() && self.warnings.is_empty()
    }
}

enum Stored<T> {
    Absent,
    Malformed(String),
    Present(T),
}

fn read<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    collection: Collection,
) -> CoreResult<Stored<T>> {
    let Some(raw) = store.load(collection.key())? else {
        return Ok(Stored::Absent);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Stored::Present(value)),
        Err(err) => Ok(Stored::Malformed(err.to_string())),
    }
}

/// A ledger bound to the store it was loaded from.
pub struct LedgerSession {
    store: Box<dyn KeyValueStore>,
    ledger: LedgerStore,
    options: SeedOptions,
}

impl LedgerSession {
    /// Loads every collection, seeding absent ones and replacing unreadable ones with
    /// defaults. Seeded and recovered collections are written back immediately.
    pub fn open(
        store: Box<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        options: SeedOptions,
    ) -> CoreResult<(Self, LoadReport)> {
        let (ledger, report, pending) = load_ledger(store.as_ref(), clock.as_ref(), options)?;
        let mut ledger = LedgerStore::new(ledger, clock);
        if let Some(week_start) = options.week_start {
            ledger = ledger.with_week_start(week_start);
        }
        let session = Self {
            store,
            ledger,
            options,
        };
        session.write(&pending)?;
        Ok((session, report))
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn snapshot(&self) -> Ledger {
        self.ledger.snapshot()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Runs `mutation` against the ledger, then flushes what it touched.
    pub fn apply<T>(
        &mut self,
        mutation: impl FnOnce(&mut LedgerStore) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let outcome = mutation(&mut self.ledger);
        self.flush()?;
        outcome
    }

    /// Writes every collection mutated since the last flush.
    pub fn flush(&mut self) -> CoreResult<()> {
        let dirty = self.ledger.take_dirty();
        self.write(&dirty)
    }

    pub fn flush_all(&mut self) -> CoreResult<()> {
        self.write(&Collection::ALL)
    }

    /// Builds a dashboard with the clock read once for the whole batch. Weekly
    /// budgets use the same week layout the store reconciles with.
    pub fn dashboard(&self, request: &DashboardRequest) -> Dashboard {
        let period = self.ledger.report_period(request.target);
        DashboardService::build(self.ledger.ledger(), request, period)
    }

    /// Advisory check against the stored transactions.
    pub fn needs_reseed(&self, policy: &ReseedPolicy) -> bool {
        needs_reseed(self.store.as_ref(), self.ledger.today(), policy)
    }

    /// Clears every stored key and reloads, which reseeds all collections.
    pub fn reset(&mut self) -> CoreResult<LoadReport> {
        reset_all(self.store.as_ref())?;
        let clock = Arc::clone(self.ledger.clock());
        let week_start = self.ledger.week_start();
        let (ledger, report, pending) =
            load_ledger(self.store.as_ref(), clock.as_ref(), self.options)?;
        self.ledger = LedgerStore::new(ledger, clock).with_week_start(week_start);
        self.write(&pending)?;
        Ok(report)
    }

    fn write(&self, collections: &[Collection]) -> CoreResult<()> {
        let snapshot = self.ledger.ledger();
        for collection in collections {
            let json = collection.encode(snapshot)?;
            self.store.save(collection.key(), &json)?;
            tracing::debug!(
                key = collection.key(),
                records = collection.len(snapshot),
                "flushed collection"
            );
        }
        Ok(())
    }
}

/// Reads collections, substituting defaults and recording why.
struct Loader<'a> {
    store: &'a dyn KeyValueStore,
    report: LoadReport,
    pending: Vec<Collection>,
}

impl Loader<'_> {
    fn load_or<T: DeserializeOwned>(
        &mut self,
        collection: Collection,
        default: impl FnOnce() -> T,
    ) -> CoreResult<T> {
        match read(self.store, collection)? {
            Stored::Present(value) => return Ok(value),
            Stored::Absent => {
                tracing::info!(key = collection.key(), "seeding absent collection");
                self.report.seeded.push(collection);
            }
            Stored::Malformed(reason) => {
                tracing::warn!(
                    key = collection.key(),
                    error = %reason,
                    "stored collection unreadable, using defaults"
                );
                self.report
                    .warnings
                    .push(format!("{} could not be read: {reason}", collection.key()));
                self.report.recovered.push(collection);
            }
        }
        self.pending.push(collection);
        Ok(default())
    }
}

/// Reads the five collections. Returns the ledger, the report and the
/// collections that must be written back.
fn load_ledger(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    options: SeedOptions,
) -> CoreResult<(Ledger, LoadReport, Vec<Collection>)> {
    let now = clock.now();
    let today = now.date_naive();
    let mut loader = Loader {
        store,
        report: LoadReport::default(),
        pending: Vec::new(),
    };

    let mut ledger = Ledger::new();
    ledger.accounts = loader.load_or(Collection::Accounts, || seed::default_accounts(now))?;
    ledger.transactions = loader.load_or(Collection::Transactions, || {
        let seed = options.seed.unwrap_or_else(|| seed::seed_for(today));
        seed::SeedGenerator::new(seed).generate(today, &ledger.accounts)
    })?;
    ledger.budgets = loader.load_or(Collection::Budgets, seed::default_budgets)?;
    ledger.subscriptions =
        loader.load_or(Collection::Subscriptions, || seed::default_subscriptions(today))?;
    ledger.categories = loader.load_or(Collection::Categories, seed::default_categories)?;

    let Loader {
        mut report,
        mut pending,
        ..
    } = loader;

    let mut realigned = 0usize;
    for txn in ledger.transactions.iter_mut().filter(|t| !t.is_sign_consistent()) {
        txn.align_kind_to_amount();
        realigned += 1;
    }
    if realigned > 0 {
        tracing::warn!(count = realigned, "realigned transaction types to amount signs");
        report.warnings.push(format!(
            "{realigned} transaction(s) had a type disagreeing with the amount sign"
        ));
        if !pending.contains(&Collection::Transactions) {
            pending.push(Collection::Transactions);
        }
    }
    for warning in ledger_warnings(&ledger) {
        tracing::debug!(%warning, "ledger anomaly");
    }
    pending.sort();
    Ok((ledger, report, pending))
}

/// Whether the surrounding application should offer a data reset. Advisory only.
///
/// True when the stored transactions are missing, unreadable, fewer than the
/// policy minimum, or dated past `today + horizon_days`.
pub fn needs_reseed(store: &dyn KeyValueStore, today: NaiveDate, policy: &ReseedPolicy) -> bool {
    let stored = match read::<Vec<Transaction>>(store, Collection::Transactions) {
        Ok(stored) => stored,
        Err(err) => {
            tracing::debug!(error = %err, "reseed check could not read transactions");
            return true;
        }
    };
    let Stored::Present(transactions) = stored else {
        return true;
    };
    if transactions.len() < policy.min_transactions {
        return true;
    }
    let horizon = today + Duration::days(i64::from(policy.horizon_days));
    transactions.iter().any(|txn| txn.date > horizon)
}
