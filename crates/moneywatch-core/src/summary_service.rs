//! Windowed rollups: trend series, daily series, category breakdowns.

use std::collections::HashMap;

use rust_decimal::Decimal;

use moneywatch_domain::{
    CategoryTotal, DailyPoint, DateWindow, IncomeExpense, Ledger, Transaction, TrendField,
    TrendPoint, INCOME_CATEGORY,
};

use crate::BudgetService;

/// Number of categories a breakdown keeps unless told otherwise.
pub const DEFAULT_BREAKDOWN_LIMIT: usize = 8;

/// Query configuration for [`SummaryService::category_breakdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownOptions {
    /// Categories dropped in addition to `Income`, which is always excluded.
    pub exclude_categories: Vec<String>,
    pub limit: usize,
}

impl Default for BreakdownOptions {
    fn default() -> Self {
        Self {
            exclude_categories: Vec::new(),
            limit: DEFAULT_BREAKDOWN_LIMIT,
        }
    }
}

impl BreakdownOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn excluding(mut self, category: impl Into<String>) -> Self {
        self.exclude_categories.push(category.into());
        self
    }

    fn excludes(&self, category: &str) -> bool {
        category == INCOME_CATEGORY || self.exclude_categories.iter().any(|c| c == category)
    }
}

/// Aggregates ledger snapshots into chart-ready series.
pub struct SummaryService;

impl SummaryService {
    pub fn in_window<'a>(
        ledger: &'a Ledger,
        window: DateWindow,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        ledger
            .transactions
            .iter()
            .filter(move |txn| window.contains(txn.date))
    }

    /// Income and expense magnitudes of the transactions dated inside `window`.
    pub fn income_expense(ledger: &Ledger, window: DateWindow) -> IncomeExpense {
        Self::totals(Self::in_window(ledger, window))
    }

    pub(crate) fn totals<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> IncomeExpense {
        transactions
            .into_iter()
            .fold(IncomeExpense::default(), |mut acc, txn| {
                if txn.is_income() {
                    acc.income += txn.amount;
                } else if txn.is_expense() {
                    acc.expenses += txn.amount.abs();
                }
                acc
            })
    }

    /// Expense totals per category, largest first, ties in first-seen order.
    pub fn category_breakdown(
        ledger: &Ledger,
        window: DateWindow,
        options: &BreakdownOptions,
    ) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for txn in Self::in_window(ledger, window) {
            if !txn.is_expense() || options.excludes(&txn.category) {
                continue;
            }
            let slot = *index.entry(txn.category.as_str()).or_insert_with(|| {
                totals.push(CategoryTotal {
                    category: txn.category.clone(),
                    total: Decimal::ZERO,
                });
                totals.len() - 1
            });
            totals[slot].total += txn.amount.abs();
        }
        // `sort_by` is stable, so equal totals keep first-seen order.
        totals.sort_by(|a, b| b.total.cmp(&a.total));
        totals.truncate(options.limit);
        totals
    }

    pub fn trend_point(ledger: &Ledger, window: DateWindow) -> TrendPoint {
        let IncomeExpense { income, expenses } = Self::income_expense(ledger, window);
        let savings = income - expenses;
        let savings_rate_pct = if income > Decimal::ZERO {
            savings / income * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        let (budget_spent, budget_limit) = BudgetService::window_totals(ledger, window);
        TrendPoint {
            window,
            income,
            expense: expenses,
            savings,
            savings_rate_pct,
            budget_spent,
            budget_limit,
        }
    }

    /// One point per supplied window, in the order given.
    pub fn trend_series(ledger: &Ledger, windows: &[DateWindow]) -> Vec<TrendPoint> {
        windows
            .iter()
            .map(|window| Self::trend_point(ledger, *window))
            .collect()
    }

    /// One point per supplied day window, zero-filled for quiet days.
    pub fn daily_series(ledger: &Ledger, days: &[DateWindow]) -> Vec<DailyPoint> {
        let mut by_day: HashMap<chrono::NaiveDate, (IncomeExpense, usize)> = HashMap::new();
        for txn in &ledger.transactions {
            if !days.iter().any(|day| day.contains(txn.date)) {
                continue;
            }
            let entry = by_day.entry(txn.date).or_default();
            if txn.is_income() {
                entry.0.income += txn.amount;
            } else if txn.is_expense() {
                entry.0.expenses += txn.amount.abs();
            }
            entry.1 += 1;
        }
        days.iter()
            .map(|day| {
                let (totals, count) = by_day.get(&day.start).copied().unwrap_or_default();
                DailyPoint {
                    day: day.start,
                    income: totals.income,
                    expense: totals.expenses,
                    net: totals.net(),
                    transaction_count: count,
                }
            })
            .collect()
    }

    /// Percentage change of `field` between two trend points; zero when the
    /// previous value is zero.
    pub fn month_over_month_change(
        current: &TrendPoint,
        previous: &TrendPoint,
        field: TrendField,
    ) -> Decimal {
        Self::percent_change(current.field(field), previous.field(field))
    }

    pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
        if previous.is_zero() {
            Decimal::ZERO
        } else {
            (current - previous) / previous.abs() * Decimal::ONE_HUNDRED
        }
    }

    /// Sum of all account balances. Liabilities are stored negative.
    pub fn net_worth(ledger: &Ledger) -> Decimal {
        ledger.accounts.iter().map(|account| account.balance).sum()
    }
}
