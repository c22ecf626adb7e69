//! Budget reconciliation: how much of each budget the current period has consumed.

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;

use moneywatch_domain::{
    percent_of, Budget, BudgetHealth, BudgetOverview, BudgetProgress, DateWindow, EntityId,
    Ledger, Transaction,
};

/// Amount spent per budget id for its current period.
pub type SpentByBudget = HashMap<EntityId, Decimal>;

/// Stateless budgeting utilities that operate over [`Ledger`] snapshots.
pub struct BudgetService;

impl BudgetService {
    /// Sum of expense magnitudes in `category` dated inside `window`.
    pub fn spending(transactions: &[Transaction], category: &str, window: DateWindow) -> Decimal {
        transactions
            .iter()
            .filter(|txn| txn.is_expense() && txn.category == category && window.contains(txn.date))
            .map(|txn| txn.amount.abs())
            .sum()
    }

    /// Pure accessor over a snapshot; nothing is cached or stored.
    pub fn budget_spending(ledger: &Ledger, category: &str, window: DateWindow) -> Decimal {
        Self::spending(&ledger.transactions, category, window)
    }

    /// Spending of `budget` during the period instance containing `today`.
    pub fn current_spent(
        ledger: &Ledger,
        budget: &Budget,
        today: NaiveDate,
        week_start: Weekday,
    ) -> Decimal {
        let window = budget.current_window(today, week_start);
        Self::budget_spending(ledger, &budget.category, window)
    }

    /// Recomputes the current-period spend of every budget.
    pub fn reconcile(ledger: &Ledger, today: NaiveDate, week_start: Weekday) -> SpentByBudget {
        let spent: SpentByBudget = ledger
            .budgets
            .iter()
            .map(|budget| {
                (
                    budget.id.clone(),
                    Self::current_spent(ledger, budget, today, week_start),
                )
            })
            .collect();
        tracing::debug!(
            budgets = spent.len(),
            transactions = ledger.transactions.len(),
            %today,
            "reconciled budgets"
        );
        spent
    }

    /// Combines a budget with an already computed spend.
    pub fn progress(budget: &Budget, spent: Decimal, window: DateWindow) -> BudgetProgress {
        let utilization_pct = percent_of(spent, budget.limit);
        BudgetProgress {
            budget_id: budget.id.clone(),
            category: budget.category.clone(),
            period: budget.period,
            color: budget.color.clone(),
            window,
            limit: budget.limit,
            spent,
            remaining: budget.limit - spent,
            progress_pct: utilization_pct.min(Decimal::ONE_HUNDRED),
            utilization_pct,
            over_budget: spent > budget.limit,
            health: BudgetHealth::from_utilization(utilization_pct),
        }
    }

    /// Current-period progress for every budget, in ledger order.
    pub fn progress_all(
        ledger: &Ledger,
        today: NaiveDate,
        week_start: Weekday,
    ) -> Vec<BudgetProgress> {
        let spent = Self::reconcile(ledger, today, week_start);
        Self::progress_from(ledger, &spent, today, week_start)
    }

    /// Progress for every budget using spend already produced by [`Self::reconcile`].
    ///
    /// A budget missing from `spent` falls back to a fresh computation.
    pub fn progress_from(
        ledger: &Ledger,
        spent: &SpentByBudget,
        today: NaiveDate,
        week_start: Weekday,
    ) -> Vec<BudgetProgress> {
        ledger
            .budgets
            .iter()
            .map(|budget| {
                let window = budget.current_window(today, week_start);
                let amount = match spent.get(&budget.id) {
                    Some(amount) => *amount,
                    None => Self::budget_spending(ledger, &budget.category, window),
                };
                Self::progress(budget, amount, window)
            })
            .collect()
    }

    pub fn overview(progress: &[BudgetProgress]) -> BudgetOverview {
        BudgetOverview {
            budget_count: progress.len(),
            total_budgeted: progress.iter().map(|entry| entry.limit).sum(),
            total_spent: progress.iter().map(|entry| entry.spent).sum(),
            over_budget_count: progress.iter().filter(|entry| entry.over_budget).count(),
        }
    }

    /// Summed spend of all budgets' categories inside `window`, paired with the
    /// summed limits.
    pub fn window_totals(ledger: &Ledger, window: DateWindow) -> (Decimal, Decimal) {
        ledger
            .budgets
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(spent, limit), budget| {
                (
                    spent + Self::budget_spending(ledger, &budget.category, window),
                    limit + budget.limit,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneywatch_domain::{BudgetPeriod, YearMonth};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn food_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.transactions = vec![
            Transaction::expense("checking", Decimal::from(50), "Food", date(2024, 3, 3)),
            Transaction::expense("checking", Decimal::from(30), "Food", date(2024, 3, 20)),
            Transaction::expense("checking", Decimal::from(99), "Food", date(2024, 2, 29)),
            Transaction::income("checking", Decimal::from(500), "Food", date(2024, 3, 4)),
            Transaction::expense("checking", Decimal::from(12), "Travel", date(2024, 3, 4)),
        ];
        ledger
            .budgets
            .push(Budget::new("Food", Decimal::from(100), BudgetPeriod::Monthly));
        ledger
    }

    #[test]
    fn spending_counts_only_in_window_expenses_of_category() {
        let ledger = food_ledger();
        let march = YearMonth::new(2024, 3).unwrap().window();
        assert_eq!(
            BudgetService::budget_spending(&ledger, "Food", march),
            Decimal::from(80)
        );
        assert_eq!(
            BudgetService::budget_spending(&ledger, "Nothing", march),
            Decimal::ZERO
        );
    }

    #[test]
    fn progress_reports_remaining_and_status() {
        let ledger = food_ledger();
        let progress = BudgetService::progress_all(&ledger, date(2024, 3, 25), Weekday::Mon);
        assert_eq!(progress.len(), 1);
        let food = &progress[0];
        assert_eq!(food.spent, Decimal::from(80));
        assert_eq!(food.remaining, Decimal::from(20));
        assert!(!food.over_budget);
        assert_eq!(food.health, BudgetHealth::Warning);
        assert_eq!(food.progress_pct, Decimal::from(80));
    }

    #[test]
    fn zero_limit_saturates_percentages() {
        let budget = Budget::new("Food", Decimal::ZERO, BudgetPeriod::Monthly);
        let window = YearMonth::new(2024, 3).unwrap().window();
        let progress = BudgetService::progress(&budget, Decimal::from(5), window);
        assert_eq!(progress.utilization_pct, Decimal::ZERO);
        assert_eq!(progress.progress_pct, Decimal::ZERO);
        assert!(progress.over_budget);
    }

    #[test]
    fn progress_pct_is_capped() {
        let budget = Budget::new("Food", Decimal::from(40), BudgetPeriod::Monthly);
        let window = YearMonth::new(2024, 3).unwrap().window();
        let progress = BudgetService::progress(&budget, Decimal::from(80), window);
        assert_eq!(progress.progress_pct, Decimal::ONE_HUNDRED);
        assert_eq!(progress.utilization_pct, Decimal::from(200));
        assert_eq!(progress.remaining, Decimal::from(-40));
        assert_eq!(progress.health, BudgetHealth::OverLimit);
    }

    #[test]
    fn weekly_budgets_use_the_current_week() {
        let mut ledger = food_ledger();
        ledger.budgets[0].period = BudgetPeriod::Weekly;
        // 2024-03-20 is a Wednesday; its Monday-start week is 18..25.
        let spent = BudgetService::reconcile(&ledger, date(2024, 3, 21), Weekday::Mon);
        assert_eq!(spent[&ledger.budgets[0].id], Decimal::from(30));
    }

    #[test]
    fn progress_prefers_reconciled_spend() {
        let ledger = food_ledger();
        let today = date(2024, 3, 25);
        let mut spent = BudgetService::reconcile(&ledger, today, Weekday::Mon);
        let from_cache = BudgetService::progress_from(&ledger, &spent, today, Weekday::Mon);
        assert_eq!(from_cache, BudgetService::progress_all(&ledger, today, Weekday::Mon));

        spent.clear();
        let recomputed = BudgetService::progress_from(&ledger, &spent, today, Weekday::Mon);
        assert_eq!(recomputed[0].spent, Decimal::from(80));
    }
}
