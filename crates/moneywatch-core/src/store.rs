//! The mutable ledger and its CRUD surface.
//!
//! Every mutation that touches transactions or budgets refreshes the cached
//! budget spend before returning, and records which collections need flushing.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;

use moneywatch_domain::{
    Account, BelongsToCategory, Budget, BudgetProgress, CategorySet, Displayable, EntityId,
    Identifiable, Ledger, NamedEntity, Subscription, SubscriptionStatus, Transaction, YearMonth,
};

use crate::{
    BudgetService, Clock, Collection, CoreError, CoreResult, ReportPeriod, SpentByBudget,
};

/// Single source of truth for one user's ledger.
pub struct LedgerStore {
    ledger: Ledger,
    clock: Arc<dyn Clock>,
    week_start: Weekday,
    spent: SpentByBudget,
    dirty: BTreeSet<Collection>,
}

impl LedgerStore {
    pub fn new(ledger: Ledger, clock: Arc<dyn Clock>) -> Self {
        let mut store = Self {
            ledger,
            clock,
            week_start: Weekday::Mon,
            spent: HashMap::new(),
            dirty: BTreeSet::new(),
        };
        store.reconcile();
        store
    }

    /// Sets the first day of the week used by weekly budgets.
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self.reconcile();
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Immutable copy for a query batch.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.clone()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Resolves a query batch against this store's clock and week layout.
    pub fn report_period(&self, target: Option<YearMonth>) -> ReportPeriod {
        ReportPeriod::resolve(target, self.clock.as_ref(), self.week_start)
    }

    // Accounts

    /// Adds an account under a fresh id and returns that id.
    pub fn add_account(&mut self, mut account: Account) -> EntityId {
        account.id = EntityId::generate();
        account.last_updated = self.clock.now();
        let id = account.id.clone();
        self.ledger.accounts.push(account);
        self.touch(Collection::Accounts);
        id
    }

    /// Replaces the account stored under `id`. Returns `false` when no such account exists.
    pub fn update_account(&mut self, id: &EntityId, mut account: Account) -> bool {
        let Some(slot) = self.ledger.accounts.iter_mut().find(|a| &a.id == id) else {
            tracing::debug!(%id, "update_account ignored unknown id");
            return false;
        };
        account.id = id.clone();
        account.last_updated = self.clock.now();
        *slot = account;
        self.touch(Collection::Accounts);
        true
    }

    /// Removes an account. Transactions referencing it are left untouched.
    pub fn delete_account(&mut self, id: &EntityId) -> bool {
        let before = self.ledger.accounts.len();
        self.ledger.accounts.retain(|account| &account.id != id);
        let removed = self.ledger.accounts.len() != before;
        if removed {
            self.touch(Collection::Accounts);
        } else {
            tracing::debug!(%id, "delete_account ignored unknown id");
        }
        removed
    }

    // Transactions

    /// Prepends a transaction under a fresh id. The amount is re-signed from its kind.
    pub fn add_transaction(&mut self, mut transaction: Transaction) -> CoreResult<EntityId> {
        validate_transaction(&transaction)?;
        transaction.id = EntityId::generate();
        transaction.align_amount_to_kind();
        let id = transaction.id.clone();
        tracing::debug!(%id, label = %transaction.display_label(), "added transaction");
        self.ledger.transactions.insert(0, transaction);
        self.touch(Collection::Transactions);
        self.reconcile();
        Ok(id)
    }

    /// Replaces the full record stored under `id`; an unknown id is a no-op.
    pub fn update_transaction(
        &mut self,
        id: &EntityId,
        mut transaction: Transaction,
    ) -> CoreResult<bool> {
        validate_transaction(&transaction)?;
        let Some(slot) = self.ledger.transactions.iter_mut().find(|t| &t.id == id) else {
            tracing::debug!(%id, "update_transaction ignored unknown id");
            return Ok(false);
        };
        transaction.id = id.clone();
        transaction.align_amount_to_kind();
        *slot = transaction;
        self.touch(Collection::Transactions);
        self.reconcile();
        Ok(true)
    }

    pub fn delete_transaction(&mut self, id: &EntityId) -> bool {
        let before = self.ledger.transactions.len();
        self.ledger.transactions.retain(|txn| &txn.id != id);
        if self.ledger.transactions.len() == before {
            tracing::debug!(%id, "delete_transaction ignored unknown id");
            return false;
        }
        self.touch(Collection::Transactions);
        self.reconcile();
        true
    }

    // Budgets

    pub fn add_budget(&mut self, mut budget: Budget) -> CoreResult<EntityId> {
        validate_budget(&budget)?;
        budget.id = EntityId::generate();
        let id = budget.id.clone();
        self.refresh_budget(&budget);
        self.ledger.budgets.push(budget);
        self.touch(Collection::Budgets);
        Ok(id)
    }

    /// Replaces the budget stored under `id` and recomputes its spend.
    pub fn update_budget(&mut self, id: &EntityId, mut budget: Budget) -> CoreResult<bool> {
        validate_budget(&budget)?;
        let Some(position) = self.ledger.budgets.iter().position(|b| &b.id == id) else {
            tracing::debug!(%id, "update_budget ignored unknown id");
            return Ok(false);
        };
        budget.id = id.clone();
        self.refresh_budget(&budget);
        self.ledger.budgets[position] = budget;
        self.touch(Collection::Budgets);
        Ok(true)
    }

    pub fn delete_budget(&mut self, id: &EntityId) -> bool {
        let before = self.ledger.budgets.len();
        self.ledger.budgets.retain(|budget| &budget.id != id);
        if self.ledger.budgets.len() == before {
            tracing::debug!(%id, "delete_budget ignored unknown id");
            return false;
        }
        self.spent.remove(id);
        self.touch(Collection::Budgets);
        true
    }

    // Subscriptions

    pub fn add_subscription(&mut self, mut subscription: Subscription) -> CoreResult<EntityId> {
        validate_subscription(&subscription)?;
        subscription.id = EntityId::generate();
        let id = subscription.id.clone();
        self.ledger.subscriptions.push(subscription);
        self.touch(Collection::Subscriptions);
        Ok(id)
    }

    pub fn update_subscription(
        &mut self,
        id: &EntityId,
        mut subscription: Subscription,
    ) -> CoreResult<bool> {
        validate_subscription(&subscription)?;
        let Some(slot) = self.ledger.subscriptions.iter_mut().find(|s| &s.id == id) else {
            tracing::debug!(%id, "update_subscription ignored unknown id");
            return Ok(false);
        };
        subscription.id = id.clone();
        *slot = subscription;
        self.touch(Collection::Subscriptions);
        Ok(true)
    }

    /// Moves a subscription to any status. `next_billing` is left as is.
    pub fn update_subscription_status(
        &mut self,
        id: &EntityId,
        status: SubscriptionStatus,
    ) -> bool {
        let Some(slot) = self.ledger.subscriptions.iter_mut().find(|s| &s.id == id) else {
            tracing::debug!(%id, "update_subscription_status ignored unknown id");
            return false;
        };
        slot.status = status;
        self.touch(Collection::Subscriptions);
        true
    }

    pub fn delete_subscription(&mut self, id: &EntityId) -> bool {
        let before = self.ledger.subscriptions.len();
        self.ledger.subscriptions.retain(|sub| &sub.id != id);
        if self.ledger.subscriptions.len() == before {
            tracing::debug!(%id, "delete_subscription ignored unknown id");
            return false;
        }
        self.touch(Collection::Subscriptions);
        true
    }

    // Categories

    /// Adds a category name. Blank and already present names are a no-op returning `false`.
    pub fn add_category(&mut self, name: &str) -> bool {
        let inserted = self.ledger.categories.insert(name);
        if inserted {
            self.touch(Collection::Categories);
        }
        inserted
    }

    /// Drops a name from the category set without touching transactions or budgets.
    pub fn remove_category(&mut self, name: &str) -> bool {
        let removed = self.ledger.categories.remove(name);
        if removed {
            self.touch(Collection::Categories);
        }
        removed
    }

    // Derived state

    /// Current-period spend of a budget as of the last reconciliation.
    pub fn budget_spent(&self, id: &EntityId) -> Option<Decimal> {
        self.spent.get(id).copied()
    }

    /// Current-period progress of every budget, built from the reconciled spend.
    pub fn budget_progress(&self) -> Vec<BudgetProgress> {
        BudgetService::progress_from(&self.ledger, &self.spent, self.today(), self.week_start)
    }

    /// Recomputes the spend of every budget against the current date.
    pub fn reconcile(&mut self) {
        self.spent = BudgetService::reconcile(&self.ledger, self.today(), self.week_start);
    }

    /// Collections mutated since the last call, in key order.
    pub fn take_dirty(&mut self) -> Vec<Collection> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn refresh_budget(&mut self, budget: &Budget) {
        let spent =
            BudgetService::current_spent(&self.ledger, budget, self.today(), self.week_start);
        self.spent.insert(budget.id.clone(), spent);
    }

    fn touch(&mut self, collection: Collection) {
        self.dirty.insert(collection);
    }
}

fn validate_transaction(transaction: &Transaction) -> CoreResult<()> {
    if transaction.category.trim().is_empty() {
        return Err(CoreError::Validation(
            "transaction category must not be empty".into(),
        ));
    }
    if transaction.amount.is_zero() {
        return Err(CoreError::Validation(
            "transaction amount must not be zero".into(),
        ));
    }
    Ok(())
}

fn validate_budget(budget: &Budget) -> CoreResult<()> {
    if budget.category.trim().is_empty() {
        return Err(CoreError::Validation(
            "budget category must not be empty".into(),
        ));
    }
    if budget.limit <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "budget limit must be positive, got {}",
            budget.limit
        )));
    }
    Ok(())
}

fn validate_subscription(subscription: &Subscription) -> CoreResult<()> {
    if subscription.amount <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "subscription `{}` amount must be positive, got {}",
            subscription.name(),
            subscription.amount
        )));
    }
    Ok(())
}

/// Reports loose references in a ledger snapshot. None of these are errors:
/// orphaned account ids and free-text categories are both allowed.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let account_ids: HashSet<&EntityId> = ledger.accounts.iter().map(|a| &a.id).collect();
    let mut warnings = Vec::new();

    for txn in &ledger.transactions {
        if !account_ids.contains(&txn.account_id) {
            warnings.push(format!(
                "transaction {} references unknown account {}",
                txn.id, txn.account_id
            ));
        }
    }
    unlisted_categories("transaction", &ledger.transactions, &ledger.categories, &mut warnings);
    unlisted_categories("budget", &ledger.budgets, &ledger.categories, &mut warnings);
    unlisted_categories("subscription", &ledger.subscriptions, &ledger.categories, &mut warnings);
    warnings
}

fn unlisted_categories<T: BelongsToCategory + Identifiable>(
    kind: &str,
    items: &[T],
    categories: &CategorySet,
    warnings: &mut Vec<String>,
) {
    for item in items {
        if !categories.contains(item.category()) {
            warnings.push(format!(
                "{kind} {} uses category `{}` outside the category set",
                item.id(),
                item.category()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use moneywatch_domain::{AccountKind, BillingFrequency, BudgetPeriod, TransactionKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_on(day: NaiveDate) -> LedgerStore {
        LedgerStore::new(Ledger::new(), Arc::new(FixedClock::on(day)))
    }

    fn expense(amount: i64, category: &str, day: u32) -> Transaction {
        Transaction::expense("checking", Decimal::from(amount), category, date(2024, 3, day))
    }

    fn unknown() -> EntityId {
        EntityId::generate()
    }

    #[test]
    fn add_transaction_assigns_id_and_prepends() {
        let mut store = store_on(date(2024, 3, 25));
        let first = store.add_transaction(expense(5, "Food", 1)).unwrap();
        let second = store.add_transaction(expense(7, "Food", 2)).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.ledger().transactions[0].id, second);
        assert_eq!(store.ledger().transactions[1].id, first);
    }

    #[test]
    fn add_transaction_replaces_caller_supplied_id() {
        let mut store = store_on(date(2024, 3, 25));
        let mut txn = expense(5, "Food", 1);
        txn.id = EntityId::from("1733000000000");
        let id = store.add_transaction(txn).unwrap();
        assert_ne!(id.as_str(), "1733000000000");
    }

    #[test]
    fn add_transaction_resigns_amount_from_kind() {
        let mut store = store_on(date(2024, 3, 25));
        let mut txn = expense(5, "Food", 1);
        txn.amount = Decimal::from(5);
        let id = store.add_transaction(txn).unwrap();
        let stored = store.ledger().transaction(&id).unwrap();
        assert_eq!(stored.amount, Decimal::from(-5));
        assert_eq!(stored.kind, TransactionKind::Expense);
    }

    #[test]
    fn invalid_transactions_are_rejected() {
        let mut store = store_on(date(2024, 3, 25));
        assert!(matches!(
            store.add_transaction(expense(0, "Food", 1)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            store.add_transaction(expense(1, "  ", 1)),
            Err(CoreError::Validation(_))
        ));
        assert!(store.ledger().transactions.is_empty());
    }

    #[test]
    fn updates_of_unknown_ids_are_noops() {
        let mut store = store_on(date(2024, 3, 25));
        let account = Account::new("X", AccountKind::Checking);
        assert!(!store.update_transaction(&unknown(), expense(1, "Food", 1)).unwrap());
        assert!(!store.delete_transaction(&unknown()));
        assert!(!store.delete_budget(&unknown()));
        assert!(!store.update_subscription_status(&unknown(), SubscriptionStatus::Paused));
        assert!(!store.update_account(&unknown(), account));
        assert!(store.take_dirty().is_empty());
    }

    #[test]
    fn records_with_legacy_ids_can_be_edited() {
        let mut ledger = Ledger::new();
        let mut legacy = expense(50, "Food", 3);
        legacy.id = EntityId::from("salary-3-15");
        ledger.transactions.push(legacy);
        let mut store = LedgerStore::new(ledger, Arc::new(FixedClock::on(date(2024, 3, 25))));

        let id = EntityId::from("salary-3-15");
        assert!(store.update_transaction(&id, expense(20, "Food", 3)).unwrap());
        assert_eq!(store.ledger().transaction(&id).unwrap().amount, Decimal::from(-20));
        assert!(store.delete_transaction(&id));
    }

    #[test]
    fn transaction_mutations_keep_budget_spend_current() {
        let mut store = store_on(date(2024, 3, 25));
        let budget = store
            .add_budget(Budget::new("Food", Decimal::from(100), BudgetPeriod::Monthly))
            .unwrap();
        assert_eq!(store.budget_spent(&budget), Some(Decimal::ZERO));

        let id = store.add_transaction(expense(50, "Food", 3)).unwrap();
        assert_eq!(store.budget_spent(&budget), Some(Decimal::from(50)));

        assert!(store.update_transaction(&id, expense(20, "Food", 3)).unwrap());
        assert_eq!(store.budget_spent(&budget), Some(Decimal::from(20)));
        assert_eq!(store.budget_progress()[0].spent, Decimal::from(20));

        assert!(store.delete_transaction(&id));
        assert_eq!(store.budget_spent(&budget), Some(Decimal::ZERO));
    }

    #[test]
    fn editing_budget_category_recomputes_its_spend() {
        let mut store = store_on(date(2024, 3, 25));
        store.add_transaction(expense(40, "Travel", 3)).unwrap();
        let id = store
            .add_budget(Budget::new("Food", Decimal::from(100), BudgetPeriod::Monthly))
            .unwrap();
        assert_eq!(store.budget_spent(&id), Some(Decimal::ZERO));
        let moved = Budget::new("Travel", Decimal::from(100), BudgetPeriod::Monthly);
        assert!(store.update_budget(&id, moved).unwrap());
        assert_eq!(store.budget_spent(&id), Some(Decimal::from(40)));
        assert!(store.delete_budget(&id));
        assert_eq!(store.budget_spent(&id), None);
    }

    #[test]
    fn budget_progress_matches_cached_spend() {
        let mut store = store_on(date(2024, 3, 25)).with_week_start(Weekday::Sun);
        let weekly = store
            .add_budget(Budget::new("Food", Decimal::from(100), BudgetPeriod::Weekly))
            .unwrap();
        // The Sunday-start week containing 2024-03-25 begins on the 24th.
        store.add_transaction(expense(10, "Food", 23)).unwrap();
        store.add_transaction(expense(4, "Food", 24)).unwrap();
        let progress = store.budget_progress();
        assert_eq!(store.budget_spent(&weekly), Some(Decimal::from(4)));
        assert_eq!(progress[0].spent, Decimal::from(4));
    }

    #[test]
    fn budget_and_subscription_amounts_must_be_positive() {
        let mut store = store_on(date(2024, 3, 25));
        let budget = Budget::new("Food", Decimal::ZERO, BudgetPeriod::Monthly);
        assert!(store.add_budget(budget).is_err());
        let sub = Subscription::new(
            "Gym",
            Decimal::from(-1),
            BillingFrequency::Monthly,
            date(2024, 4, 1),
        );
        assert!(store.add_subscription(sub).is_err());
    }

    #[test]
    fn subscription_status_accepts_any_transition() {
        let mut store = store_on(date(2024, 3, 25));
        let billing = date(2024, 4, 1);
        let gym = Subscription::new("Gym", Decimal::from(30), BillingFrequency::Monthly, billing);
        let id = store.add_subscription(gym).unwrap();
        for status in [
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Active,
            SubscriptionStatus::Paused,
            SubscriptionStatus::Cancelled,
        ] {
            assert!(store.update_subscription_status(&id, status));
            let sub = store.ledger().subscription(&id).unwrap();
            assert_eq!(sub.status, status);
            assert_eq!(sub.next_billing, billing);
        }
    }

    #[test]
    fn categories_are_idempotent_and_tracked_dirty() {
        let mut store = store_on(date(2024, 3, 25));
        assert!(store.add_category("Pets"));
        assert!(!store.add_category("Pets"));
        assert!(!store.add_category("   "));
        assert_eq!(store.take_dirty(), vec![Collection::Categories]);
        assert!(!store.add_category(" Pets "));
        assert!(!store.is_dirty());
        assert!(store.remove_category("Pets"));
        assert!(!store.remove_category("Pets"));
    }

    #[test]
    fn account_updates_stamp_last_updated() {
        let today = date(2024, 3, 25);
        let mut store = store_on(today);
        let id = store.add_account(Account::new("Checking", AccountKind::Checking));
        let renamed = Account::new("Main", AccountKind::Checking).with_balance(Decimal::from(10));
        assert!(store.update_account(&id, renamed));
        let account = store.ledger().account(&id).unwrap();
        assert_eq!(account.name, "Main");
        assert_eq!(account.last_updated.date_naive(), today);
        assert!(store.delete_account(&id));
        assert_eq!(store.take_dirty(), vec![Collection::Accounts]);
    }

    #[test]
    fn warnings_flag_orphans_and_unknown_categories() {
        let mut ledger = Ledger::new();
        ledger.categories.insert("Food");
        ledger.transactions.push(expense(1, "Mystery", 1));
        ledger
            .budgets
            .push(Budget::new("Food", Decimal::from(10), BudgetPeriod::Monthly));
        let warnings = ledger_warnings(&ledger);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("unknown account"));
        assert!(warnings[1].contains("Mystery"));

        ledger.budgets[0].category = "Ghost".into();
        let warnings = ledger_warnings(&ledger);
        assert!(warnings[2].starts_with("budget"));
    }
}
