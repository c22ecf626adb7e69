//! Derived, non-authoritative views computed from a [`crate::Ledger`] snapshot.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{budget::BudgetPeriod, common::EntityId, window::DateWindow, YearMonth};

/// `numerator / denominator * 100`, or zero when the denominator is zero.
pub fn percent_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator * Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Total spending for a single category.
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
/// Income and spending over some set of transactions. `expenses` is a magnitude.
pub struct IncomeExpense {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl IncomeExpense {
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One window of a trend series.
pub struct TrendPoint {
    pub window: DateWindow,
    pub income: Decimal,
    pub expense: Decimal,
    pub savings: Decimal,
    pub savings_rate_pct: Decimal,
    pub budget_spent: Decimal,
    pub budget_limit: Decimal,
}

impl TrendPoint {
    /// Month the window starts in; used for chart labels.
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.window.start)
    }

    pub fn field(&self, field: TrendField) -> Decimal {
        match field {
            TrendField::Income => self.income,
            TrendField::Expense => self.expense,
            TrendField::Savings => self.savings,
            TrendField::SavingsRate => self.savings_rate_pct,
            TrendField::BudgetSpent => self.budget_spent,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Selects a numeric column of a [`TrendPoint`].
pub enum TrendField {
    Income,
    Expense,
    Savings,
    SavingsRate,
    BudgetSpent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Activity on one calendar day.
pub struct DailyPoint {
    pub day: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Traffic-light status of a budget.
pub enum BudgetHealth {
    OnTrack,
    Warning,
    OverLimit,
}

impl BudgetHealth {
    pub const WARNING_PCT: i64 = 80;

    pub fn from_utilization(utilization_pct: Decimal) -> Self {
        if utilization_pct >= Decimal::ONE_HUNDRED {
            BudgetHealth::OverLimit
        } else if utilization_pct >= Decimal::from(Self::WARNING_PCT) {
            BudgetHealth::Warning
        } else {
            BudgetHealth::OnTrack
        }
    }
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetHealth::OnTrack => "On track",
            BudgetHealth::Warning => "Warning",
            BudgetHealth::OverLimit => "Over limit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A budget together with its consumption over one period window.
pub struct BudgetProgress {
    pub budget_id: EntityId,
    pub category: String,
    pub period: BudgetPeriod,
    pub color: String,
    pub window: DateWindow,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// `spent / limit`, capped at 100.
    pub progress_pct: Decimal,
    /// `spent / limit`, uncapped.
    pub utilization_pct: Decimal,
    pub over_budget: bool,
    pub health: BudgetHealth,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
/// Totals across every budget.
pub struct BudgetOverview {
    pub budget_count: usize,
    pub total_budgeted: Decimal,
    pub total_spent: Decimal,
    pub over_budget_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// An active subscription due within the look-ahead horizon.
pub struct UpcomingBill {
    pub subscription_id: EntityId,
    pub name: String,
    pub amount: Decimal,
    pub next_billing: NaiveDate,
    pub days_until: i64,
    pub monthly_equivalent: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
/// Percentage changes of the target month against the month before it.
pub struct MonthOverMonth {
    pub income_pct: Decimal,
    pub expense_pct: Decimal,
    pub savings_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Every view a dashboard render needs, computed from one snapshot and one
/// resolved reporting period.
pub struct Dashboard {
    pub today: NaiveDate,
    pub target: YearMonth,
    pub net_worth: Decimal,
    pub month: TrendPoint,
    pub month_over_month: MonthOverMonth,
    pub trend: Vec<TrendPoint>,
    pub category_breakdown: Vec<CategoryTotal>,
    pub daily: Vec<DailyPoint>,
    pub budgets: Vec<BudgetProgress>,
    pub budget_overview: BudgetOverview,
    pub subscription_monthly_cost: Decimal,
    pub subscription_yearly_cost: Decimal,
    pub active_subscriptions: usize,
    pub upcoming_bills: Vec<UpcomingBill>,
}
