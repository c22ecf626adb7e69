use std::sync::Arc;

use chrono::{Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::{
    BreakdownOptions, BudgetService, DashboardRequest, DashboardService, FixedClock, LedgerStore,
    ReportPeriod, SubscriptionService, SummaryService,
};
use moneywatch_domain::{
    Account, AccountKind, BillingFrequency, Budget, BudgetPeriod, Ledger, Subscription,
    SubscriptionStatus, Transaction, TrendField, TrendPoint, YearMonth, INCOME_CATEGORY,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn march(day: u32) -> NaiveDate {
    date(2024, 3, day)
}

fn spend(amount: i64, category: &str, day: NaiveDate) -> Transaction {
    Transaction::expense("checking", Decimal::from(amount), category, day)
}

fn earn(amount: i64, day: NaiveDate) -> Transaction {
    Transaction::income("checking", Decimal::from(amount), INCOME_CATEGORY, day)
}

fn store_on(day: NaiveDate) -> LedgerStore {
    LedgerStore::new(Ledger::new(), Arc::new(FixedClock::on(day)))
}

#[test]
fn food_budget_reconciles_to_eighty_of_one_hundred() {
    let mut store = store_on(march(25));
    for (amount, day) in [(50, 3), (30, 20)] {
        store
            .add_transaction(spend(amount, "Food", march(day)))
            .expect("add transaction");
    }
    let budget_id = store
        .add_budget(Budget::new("Food", Decimal::from(100), BudgetPeriod::Monthly))
        .expect("add budget");

    assert_eq!(store.budget_spent(&budget_id), Some(Decimal::from(80)));
    let progress = store.budget_progress();
    assert_eq!(progress[0].spent, Decimal::from(80));
    assert_eq!(progress[0].remaining, Decimal::from(20));
    assert!(!progress[0].over_budget);
}

#[test]
fn reconciliation_is_idempotent() {
    let mut store = store_on(march(25));
    store
        .add_budget(Budget::new("Food", Decimal::from(100), BudgetPeriod::Monthly))
        .expect("add budget");
    store
        .add_budget(Budget::new("Travel", Decimal::from(300), BudgetPeriod::Weekly))
        .expect("add budget");
    for (amount, category, day) in [(12, "Food", 1), (40, "Travel", 25), (7, "Travel", 2)] {
        store
            .add_transaction(spend(amount, category, march(day)))
            .expect("add transaction");
    }
    let ids: Vec<_> = store.ledger().budgets.iter().map(|b| b.id.clone()).collect();
    let first: Vec<_> = ids.iter().map(|id| store.budget_spent(id)).collect();
    store.reconcile();
    store.reconcile();
    let second: Vec<_> = ids.iter().map(|id| store.budget_spent(id)).collect();
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![Some(Decimal::from(12)), Some(Decimal::from(40))]
    );
}

#[test]
fn budget_spend_ignores_the_dashboard_target_month() {
    let mut ledger = Ledger::new();
    ledger.transactions = vec![
        spend(90, "Food", march(5)),
        spend(10, "Food", date(2024, 4, 2)),
    ];
    ledger
        .budgets
        .push(Budget::new("Food", Decimal::from(100), BudgetPeriod::Monthly));
    let period = ReportPeriod {
        today: date(2024, 4, 10),
        target: YearMonth::new(2024, 3).unwrap(),
        week_start: Weekday::Mon,
    };
    let dashboard = DashboardService::build(&ledger, &DashboardRequest::default(), period);
    assert_eq!(dashboard.budgets[0].spent, Decimal::from(10));
    assert_eq!(dashboard.month.budget_spent, Decimal::from(90));
    assert_eq!(dashboard.month.budget_limit, Decimal::from(100));
}

#[test]
fn only_active_subscriptions_count_towards_monthly_cost() {
    let mut ledger = Ledger::new();
    ledger.subscriptions = vec![
        Subscription::new("Storage", Decimal::from(12), BillingFrequency::Yearly, march(1)),
        Subscription::new("Streaming", Decimal::from(10), BillingFrequency::Monthly, march(1))
            .with_status(SubscriptionStatus::Cancelled),
    ];
    assert_eq!(SubscriptionService::total_monthly_cost(&ledger), Decimal::ONE);
}

#[test]
fn upcoming_bills_skip_past_and_out_of_horizon_dates() {
    let from = march(10);
    let mut ledger = Ledger::new();
    ledger.subscriptions = vec![
        Subscription::new("Past", Decimal::ONE, BillingFrequency::Monthly, march(5)),
        Subscription::new("Due", Decimal::ONE, BillingFrequency::Monthly, march(15)),
        Subscription::new(
            "Later",
            Decimal::ONE,
            BillingFrequency::Monthly,
            from + Duration::days(31),
        ),
    ];
    let bills = SubscriptionService::upcoming_bills(&ledger, from, 30);
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].name, "Due");
    assert_eq!(bills[0].days_until, 5);
}

#[test]
fn daily_counts_sum_to_the_month_count() {
    let mut ledger = Ledger::new();
    ledger.transactions = vec![
        spend(3, "Food", march(1)),
        earn(100, march(7)),
        spend(3, "Food", march(31)),
        spend(3, "Food", date(2024, 4, 1)),
        spend(3, "Food", date(2024, 2, 29)),
    ];
    let month = YearMonth::new(2024, 3).unwrap();
    let daily = SummaryService::daily_series(&ledger, &month.day_windows());
    assert_eq!(daily.len(), 31);
    let total: usize = daily.iter().map(|d| d.transaction_count).sum();
    let in_month = ledger
        .transactions
        .iter()
        .filter(|t| month.window().contains(t.date))
        .count();
    assert_eq!(total, in_month);
    assert_eq!(total, 3);
}

#[test]
fn breakdown_is_non_increasing_and_never_lists_income() {
    let mut ledger = Ledger::new();
    let rows = [
        (5, "A"),
        (50, "B"),
        (20, INCOME_CATEGORY),
        (12, "C"),
        (50, "D"),
        (1, "A"),
    ];
    for (amount, category) in rows {
        ledger.transactions.push(spend(amount, category, march(4)));
    }
    let breakdown = SummaryService::category_breakdown(
        &ledger,
        YearMonth::new(2024, 3).unwrap().window(),
        &BreakdownOptions::default(),
    );
    assert!(breakdown.windows(2).all(|pair| pair[0].total >= pair[1].total));
    assert!(breakdown.iter().all(|c| c.category != INCOME_CATEGORY));
    let names: Vec<_> = breakdown.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, ["B", "D", "C", "A"]);
}

#[test]
fn month_over_month_with_zero_baseline_is_zero() {
    let window = YearMonth::new(2024, 3).unwrap().window();
    let point = |income: i64| TrendPoint {
        window,
        income: Decimal::from(income),
        expense: Decimal::ZERO,
        savings: Decimal::ZERO,
        savings_rate_pct: Decimal::ZERO,
        budget_spent: Decimal::ZERO,
        budget_limit: Decimal::ZERO,
    };
    let change =
        SummaryService::month_over_month_change(&point(100), &point(0), TrendField::Income);
    assert_eq!(change, Decimal::ZERO);
}

#[test]
fn net_worth_subtracts_card_debt() {
    let mut ledger = Ledger::new();
    ledger.accounts = vec![
        Account::new("Checking", AccountKind::Checking).with_balance(Decimal::new(100_050, 2)),
        Account::new("Card", AccountKind::CreditCard).with_balance(Decimal::new(-25_025, 2)),
    ];
    assert_eq!(SummaryService::net_worth(&ledger), Decimal::new(75_025, 2));
}

#[test]
fn trend_series_is_oldest_first_and_spans_the_range() {
    let mut ledger = Ledger::new();
    ledger.transactions = vec![
        earn(1000, date(2023, 12, 7)),
        earn(2000, march(7)),
    ];
    let target = YearMonth::new(2024, 3).unwrap();
    let windows = moneywatch_domain::span_windows(6, target);
    let trend = SummaryService::trend_series(&ledger, &windows);
    let months: Vec<_> = trend.iter().map(|p| p.month().to_string()).collect();
    assert_eq!(months, ["2023-10", "2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]);
    assert_eq!(trend[2].income, Decimal::from(1000));
    assert_eq!(trend[5].income, Decimal::from(2000));
    assert_eq!(BudgetService::overview(&[]).budget_count, 0);
}
