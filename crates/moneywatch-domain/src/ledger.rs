use serde::{Deserialize, Serialize};

use crate::{
    account::Account, budget::Budget, category::CategorySet, common::{EntityId, Identifiable},
    subscription::Subscription, transaction::Transaction,
};

/// Snapshot of every collection the ledger owns.
///
/// `transactions` is kept newest-inserted first. Query code treats a `Ledger` as
/// immutable for the duration of a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Ledger {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub categories: CategorySet,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, id: &EntityId) -> Option<&Account> {
        find(&self.accounts, id)
    }

    pub fn transaction(&self, id: &EntityId) -> Option<&Transaction> {
        find(&self.transactions, id)
    }

    pub fn budget(&self, id: &EntityId) -> Option<&Budget> {
        find(&self.budgets, id)
    }

    pub fn subscription(&self, id: &EntityId) -> Option<&Subscription> {
        find(&self.subscriptions, id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

fn find<'a, T: Identifiable>(items: &'a [T], id: &EntityId) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}
