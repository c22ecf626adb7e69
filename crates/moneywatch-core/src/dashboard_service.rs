//! One consistent batch of derived views for a dashboard render.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use moneywatch_domain::{
    span_windows, Dashboard, Ledger, MonthOverMonth, TrendField, TrendRange, YearMonth,
};

use crate::{
    BreakdownOptions, BudgetService, Clock, SubscriptionService, SummaryService,
    DEFAULT_UPCOMING_HORIZON_DAYS,
};

/// What the caller wants to look at.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    /// Month the period-scoped views cover; `None` means the current month.
    pub target: Option<YearMonth>,
    pub trend_range: TrendRange,
    pub upcoming_horizon_days: u32,
    pub breakdown: BreakdownOptions,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            target: None,
            trend_range: TrendRange::default(),
            upcoming_horizon_days: DEFAULT_UPCOMING_HORIZON_DAYS,
            breakdown: BreakdownOptions::default(),
        }
    }
}

impl DashboardRequest {
    pub fn for_month(mut self, target: YearMonth) -> Self {
        self.target = Some(target);
        self
    }
}

/// The clock reading, target month and week layout shared by every view in one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub today: NaiveDate,
    pub target: YearMonth,
    /// First day of the week for weekly budgets; matches the reconciling store.
    pub week_start: Weekday,
}

impl ReportPeriod {
    /// Reads the clock exactly once.
    pub fn resolve(target: Option<YearMonth>, clock: &dyn Clock, week_start: Weekday) -> Self {
        let today = clock.today();
        Self {
            today,
            target: target.unwrap_or_else(|| YearMonth::from_date(today)),
            week_start,
        }
    }
}

pub struct DashboardService;

impl DashboardService {
    /// Builds every dashboard view from one snapshot and one period.
    ///
    /// Budget progress always reflects the budget's current period relative to
    /// `period.today`, whatever month is targeted.
    pub fn build(ledger: &Ledger, request: &DashboardRequest, period: ReportPeriod) -> Dashboard {
        let target = period.target;
        let month = SummaryService::trend_point(ledger, target.window());
        let previous = SummaryService::trend_point(ledger, target.pred().window());
        let change = |field| SummaryService::month_over_month_change(&month, &previous, field);
        let month_over_month = MonthOverMonth {
            income_pct: change(TrendField::Income),
            expense_pct: change(TrendField::Expense),
            savings_pct: change(TrendField::Savings),
        };
        let trend = SummaryService::trend_series(
            ledger,
            &span_windows(request.trend_range.months(), target),
        );
        let budgets = BudgetService::progress_all(ledger, period.today, period.week_start);
        let budget_overview = BudgetService::overview(&budgets);

        let dashboard = Dashboard {
            today: period.today,
            target,
            net_worth: SummaryService::net_worth(ledger),
            category_breakdown: SummaryService::category_breakdown(
                ledger,
                target.window(),
                &request.breakdown,
            ),
            daily: SummaryService::daily_series(ledger, &target.day_windows()),
            month,
            month_over_month,
            trend,
            budgets,
            budget_overview,
            subscription_monthly_cost: SubscriptionService::total_monthly_cost(ledger),
            subscription_yearly_cost: SubscriptionService::yearly_cost(ledger),
            active_subscriptions: SubscriptionService::active(ledger).count(),
            upcoming_bills: SubscriptionService::upcoming_bills(
                ledger,
                period.today,
                request.upcoming_horizon_days,
            ),
        };
        tracing::debug!(
            target_month = %target,
            transactions = ledger.transactions.len(),
            "built dashboard"
        );
        dashboard
    }
}
