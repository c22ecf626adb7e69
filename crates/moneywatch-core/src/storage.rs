//! Key-value persistence contract.
//!
//! The engine persists each collection under its own logical key as a serialized
//! string. Backends decide where the bytes live.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use moneywatch_domain::Ledger;

use crate::{CoreError, CoreResult};

/// One independently persisted collection of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Accounts,
    Transactions,
    Budgets,
    Subscriptions,
    Categories,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Accounts,
        Collection::Transactions,
        Collection::Budgets,
        Collection::Subscriptions,
        Collection::Categories,
    ];

    /// Storage key for the collection.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Accounts => "moneywatch-accounts",
            Collection::Transactions => "moneywatch-transactions",
            Collection::Budgets => "moneywatch-budgets",
            Collection::Subscriptions => "moneywatch-subscriptions",
            Collection::Categories => "moneywatch-categories",
        }
    }

    /// Serializes this collection out of `ledger`.
    pub fn encode(self, ledger: &Ledger) -> CoreResult<String> {
        let json = match self {
            Collection::Accounts => serde_json::to_string(&ledger.accounts)?,
            Collection::Transactions => serde_json::to_string(&ledger.transactions)?,
            Collection::Budgets => serde_json::to_string(&ledger.budgets)?,
            Collection::Subscriptions => serde_json::to_string(&ledger.subscriptions)?,
            Collection::Categories => serde_json::to_string(&ledger.categories)?,
        };
        Ok(json)
    }

    /// Number of records this collection holds in `ledger`.
    pub fn len(self, ledger: &Ledger) -> usize {
        match self {
            Collection::Accounts => ledger.accounts.len(),
            Collection::Transactions => ledger.transactions.len(),
            Collection::Budgets => ledger.budgets.len(),
            Collection::Subscriptions => ledger.subscriptions.len(),
            Collection::Categories => ledger.categories.len(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Abstraction over persistence backends holding serialized collections by key.
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written or was removed.
    fn load(&self, key: &str) -> CoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> CoreResult<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> CoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> CoreResult<()> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> CoreResult<()> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        (**self).remove(key)
    }
}

/// Process-local store, used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> CoreResult<Vec<String>> {
        let entries = self.lock()?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn lock(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> CoreResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Removes every ledger key; the next load reseeds all collections.
pub fn reset_all(store: &dyn KeyValueStore) -> CoreResult<()> {
    for collection in Collection::ALL {
        store.remove(collection.key())?;
    }
    tracing::info!("Removed all persisted ledger collections.");
    Ok(())
}
