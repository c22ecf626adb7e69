//! Default data set and the synthetic transaction generator used when a
//! collection has never been persisted.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use uuid::Uuid;

use moneywatch_domain::{
    Account, AccountKind, BillingFrequency, Budget, BudgetPeriod, CategorySet, EntityId, Ledger,
    Subscription, SubscriptionStatus, Transaction, TransactionKind, YearMonth, INCOME_CATEGORY,
};

/// Months of history the generator covers, ending with the current month.
pub const GENERATED_MONTHS: i32 = 12;

pub fn default_accounts(now: DateTime<Utc>) -> Vec<Account> {
    [
        ("Chase Checking", AccountKind::Checking, Decimal::new(542_367, 2)),
        ("Chase Savings", AccountKind::Savings, Decimal::new(1_523_045, 2)),
        ("Credit Card", AccountKind::CreditCard, Decimal::new(-123_456, 2)),
    ]
    .into_iter()
    .map(|(name, kind, balance)| {
        let mut account = Account::new(name, kind)
            .with_balance(balance)
            .with_institution("Chase");
        account.last_updated = now;
        account
    })
    .collect()
}

pub fn default_budgets() -> Vec<Budget> {
    [
        ("Food & Dining", 800, "#3B82F6"),
        ("Transportation", 400, "#10B981"),
        ("Entertainment", 200, "#F59E0B"),
        ("Shopping", 500, "#EF4444"),
        ("Utilities", 300, "#8B5CF6"),
        ("Healthcare", 400, "#06B6D4"),
        ("Housing", 2500, "#EC4899"),
        ("Health & Fitness", 100, "#6366F1"),
    ]
    .into_iter()
    .map(|(category, limit, color)| {
        Budget::new(category, Decimal::from(limit), BudgetPeriod::Monthly).with_color(color)
    })
    .collect()
}

/// Default subscriptions with billing dates placed relative to `today`.
pub fn default_subscriptions(today: NaiveDate) -> Vec<Subscription> {
    use BillingFrequency::{Monthly, Yearly};

    let stock = [
        ("Netflix", 1599, Monthly, 14, "Entertainment", "🎬"),
        ("Spotify Premium", 999, Monthly, 7, "Entertainment", "🎵"),
        ("Amazon Prime", 13900, Yearly, 200, "Shopping", "📦"),
        ("Adobe Creative Cloud", 5299, Monthly, 11, "Software", "🎨"),
        ("Gym Membership", 2999, Monthly, 19, "Health & Fitness", "💪"),
        ("Disney+", 799, Monthly, -7, "Entertainment", "🏰"),
    ];
    stock
        .into_iter()
        .map(|(name, cents, frequency, due_in, category, icon)| {
            let due = today + Duration::days(due_in);
            let subscription = Subscription::new(name, Decimal::new(cents, 2), frequency, due)
                .with_category(category)
                .with_icon(icon);
            if name == "Disney+" {
                subscription.with_status(SubscriptionStatus::Cancelled)
            } else {
                subscription
            }
        })
        .collect()
}

pub fn default_categories() -> CategorySet {
    CategorySet::defaults()
}

/// Seed used when none is configured: one value per calendar day, so regenerating
/// on the same day yields the same ledger.
pub fn seed_for(today: NaiveDate) -> u64 {
    u64::try_from(today.num_days_from_ce()).unwrap_or_default()
}

/// A complete default ledger: fixed accounts, budgets, subscriptions and
/// categories plus a generated year of transactions.
pub fn seed_ledger(now: DateTime<Utc>, seed: u64) -> Ledger {
    let today = now.date_naive();
    let accounts = default_accounts(now);
    let transactions = SeedGenerator::new(seed).generate(today, &accounts);
    Ledger {
        accounts,
        transactions,
        budgets: default_budgets(),
        subscriptions: default_subscriptions(today),
        categories: default_categories(),
    }
}

const FIXED_BILLS: [(&str, i64, i64, &str); 7] = [
    ("Rent Payment", 240_000, 0, "Housing"),
    ("Electric Bill", 8_500, 4_000, "Utilities"),
    ("Internet Service", 7_999, 0, "Utilities"),
    ("Phone Bill", 6_500, 1_500, "Utilities"),
    ("Car Insurance", 14_200, 0, "Transportation"),
    ("Health Insurance", 32_000, 0, "Healthcare"),
    ("Gym Membership", 2_999, 0, "Health & Fitness"),
];

const STREAMING: [(&str, i64, u32); 5] = [
    ("Netflix", 1_599, 8),
    ("Spotify Premium", 999, 12),
    ("Adobe Creative Cloud", 5_299, 15),
    ("iCloud Storage", 299, 20),
    ("Disney+", 799, 25),
];

const GROCERS: [&str; 4] = ["Whole Foods", "Trader Joes", "Safeway", "Target Grocery"];
const CAFES: [&str; 4] = ["Starbucks", "Blue Bottle Coffee", "Local Cafe", "Peets Coffee"];
const RESTAURANTS: [&str; 6] = [
    "Italian Restaurant",
    "Sushi Bar",
    "Mexican Food",
    "Pizza Place",
    "Burger Joint",
    "Thai Restaurant",
];
const FUEL: [&str; 4] = ["Shell Gas Station", "Chevron", "76 Gas", "Costco Gas"];
const SHOPS: [&str; 6] = ["Amazon Purchase", "Target", "Best Buy", "Macys", "REI", "Apple Store"];
const BIG_TICKET: [&str; 6] = [
    "New Laptop",
    "iPhone",
    "Winter Coat",
    "Furniture",
    "TV",
    "Kitchen Appliance",
];
const CARE: [&str; 5] = ["Doctor Visit", "Dentist", "Pharmacy", "Eye Exam", "Physical Therapy"];
const OUTINGS: [&str; 5] = ["Movie Theater", "Concert Tickets", "Sports Game", "Museum", "Bowling"];
const TRIPS: [&str; 5] = ["Flight Booking", "Hotel Stay", "Airbnb", "Rental Car", "Trip Expenses"];

/// Deterministic, seed-parameterised generator of a plausible transaction history.
pub struct SeedGenerator {
    rng: StdRng,
}

struct Payers {
    checking: EntityId,
    card: EntityId,
}

impl SeedGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates the months ending with the month of `today`, newest first.
    /// Nothing is dated after `today`.
    pub fn generate(&mut self, today: NaiveDate, accounts: &[Account]) -> Vec<Transaction> {
        let payers = Payers {
            checking: account_of(accounts, AccountKind::Checking),
            card: account_of(accounts, AccountKind::CreditCard),
        };
        let current = YearMonth::from_date(today);
        let mut out = Vec::new();
        for back in (0..GENERATED_MONTHS).rev() {
            self.month(current.offset(-back), &payers, &mut out);
        }
        out.retain(|txn| txn.date <= today);
        out.sort_by(|a, b| b.date.cmp(&a.date));
        tracing::debug!(count = out.len(), %today, "generated transactions");
        out
    }

    fn month(&mut self, month: YearMonth, payers: &Payers, out: &mut Vec<Transaction>) {
        let checking = &payers.checking;

        for day in [7, 21] {
            let amount = self.cents(320_000, 350_000);
            let salary = income(checking, amount, month, day, "Salary Deposit - Tech Corp");
            out.push(salary.recurring());
        }
        if self.rng.gen_bool(0.7) {
            let amount = self.cents(40_000, 160_000);
            let day = self.any_day();
            out.push(income(checking, amount, month, day, "Freelance Project Payment"));
        }

        for (description, base, spread, category) in FIXED_BILLS {
            let amount = self.cents(base, base + spread);
            let day = self.rng.gen_range(1..=5);
            out.push(expense(checking, amount, category, month, day, description).recurring());
        }

        for (name, cents, day) in STREAMING {
            let amount = Decimal::new(cents, 2);
            out.push(expense(&payers.card, amount, "Entertainment", month, day, name).recurring());
        }

        for week in 0..4u32 {
            let payer = self.payer(payers, 0.5);
            let amount = self.cents(8_000, 20_000);
            let day = week * 7 + self.rng.gen_range(1..=3);
            let store = self.pick(&GROCERS);
            out.push(expense(payer, amount, "Food & Dining", month, day, store));

            for _ in 0..2 {
                let amount = self.cents(300, 1_100);
                let day = week * 7 + self.rng.gen_range(1..=7);
                let cafe = self.pick(&CAFES);
                out.push(expense(&payers.card, amount, "Food & Dining", month, day, cafe));
            }

            if self.rng.gen_bool(0.7) {
                let payer = self.payer(payers, 0.4);
                let amount = self.cents(2_500, 10_000);
                let day = week * 7 + self.rng.gen_range(1..=7);
                let place = self.pick(&RESTAURANTS);
                out.push(expense(payer, amount, "Food & Dining", month, day, place));
            }
        }

        for _ in 0..3 {
            self.maybe(0.8, payers, 0.3, (3_500, 8_000), "Transportation", &FUEL, month, out);
        }
        for _ in 0..2 {
            self.maybe(0.6, payers, 0.5, (2_000, 22_000), "Shopping", &SHOPS, month, out);
        }
        self.maybe(0.15, payers, 1.0, (30_000, 150_000), "Shopping", &BIG_TICKET, month, out);
        self.maybe(0.3, payers, 0.5, (2_500, 22_500), "Healthcare", &CARE, month, out);
        self.maybe(0.5, payers, 0.6, (1_500, 10_000), "Entertainment", &OUTINGS, month, out);
        self.maybe(0.1, payers, 1.0, (20_000, 100_000), "Travel", &TRIPS, month, out);
    }

    /// With probability `chance`, one expense on a random day of the month.
    #[allow(clippy::too_many_arguments)]
    fn maybe(
        &mut self,
        chance: f64,
        payers: &Payers,
        card_share: f64,
        (low, high): (i64, i64),
        category: &str,
        names: &[&str],
        month: YearMonth,
        out: &mut Vec<Transaction>,
    ) {
        if !self.rng.gen_bool(chance) {
            return;
        }
        let payer = self.payer(payers, card_share);
        let amount = self.cents(low, high);
        let day = self.any_day();
        let name = self.pick(names);
        out.push(expense(payer, amount, category, month, day, name));
    }

    fn cents(&mut self, low: i64, high: i64) -> Decimal {
        Decimal::new(self.rng.gen_range(low..=high), 2)
    }

    fn any_day(&mut self) -> u32 {
        self.rng.gen_range(1..=28)
    }

    fn payer<'p>(&mut self, payers: &'p Payers, card_share: f64) -> &'p EntityId {
        if self.rng.gen_bool(card_share) {
            &payers.card
        } else {
            &payers.checking
        }
    }

    fn pick<'a>(&mut self, names: &[&'a str]) -> &'a str {
        names[self.rng.gen_range(0..names.len())]
    }
}

fn account_of(accounts: &[Account], kind: AccountKind) -> EntityId {
    accounts
        .iter()
        .find(|account| account.kind == kind)
        .or_else(|| accounts.first())
        .map_or_else(|| EntityId::from(Uuid::nil()), |account| account.id.clone())
}

fn day_of(month: YearMonth, day: u32) -> NaiveDate {
    let first = month.first_day();
    first
        .with_day(day.min(month.days_in_month()))
        .unwrap_or(first)
}

fn income(
    account: &EntityId,
    amount: Decimal,
    month: YearMonth,
    day: u32,
    description: &str,
) -> Transaction {
    let date = day_of(month, day);
    Transaction::new(account.clone(), TransactionKind::Income, amount, INCOME_CATEGORY, date)
        .with_description(description)
}

fn expense(
    account: &EntityId,
    amount: Decimal,
    category: &str,
    month: YearMonth,
    day: u32,
    description: &str,
) -> Transaction {
    let date = day_of(month, day);
    Transaction::new(account.clone(), TransactionKind::Expense, amount, category, date)
        .with_description(description)
        .with_merchant(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(
            NaiveDate::from_ymd_opt(2024, 6, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            Utc,
        )
    }

    #[test]
    fn generated_history_is_consistent() {
        let today = now().date_naive();
        let accounts = default_accounts(now());
        let txns = SeedGenerator::new(7).generate(today, &accounts);
        assert!(txns.len() > 250);
        assert!(txns.iter().all(|t| t.date <= today));
        assert!(txns.iter().all(|t| t.is_sign_consistent() && !t.amount.is_zero()));
        assert!(txns.iter().all(|t| t.amount.scale() <= 2));
        assert!(txns.windows(2).all(|pair| pair[0].date >= pair[1].date));
        let oldest = txns.last().unwrap().date;
        assert!(oldest >= NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        let account_ids: HashSet<_> = accounts.iter().map(|a| &a.id).collect();
        assert!(txns.iter().all(|t| account_ids.contains(&t.account_id)));
    }

    #[test]
    fn income_is_only_booked_under_income() {
        let today = now().date_naive();
        let txns = SeedGenerator::new(1).generate(today, &default_accounts(now()));
        for txn in &txns {
            assert_eq!(txn.is_income(), txn.category == INCOME_CATEGORY, "{txn:?}");
        }
    }

    #[test]
    fn same_seed_same_history() {
        let today = now().date_naive();
        let accounts = default_accounts(now());
        let strip = |txns: Vec<Transaction>| -> Vec<_> {
            txns.into_iter()
                .map(|t| (t.date, t.amount, t.description))
                .collect()
        };
        let a = strip(SeedGenerator::new(42).generate(today, &accounts));
        let b = strip(SeedGenerator::new(42).generate(today, &accounts));
        assert_eq!(a, b);
    }

    #[test]
    fn defaults_match_the_stock_data_set() {
        let ledger = seed_ledger(now(), 3);
        assert_eq!(ledger.accounts.len(), 3);
        assert_eq!(ledger.budgets.len(), 8);
        assert_eq!(ledger.subscriptions.len(), 6);
        assert_eq!(ledger.categories.len(), 13);
        let cancelled: Vec<_> = ledger
            .subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Cancelled)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(cancelled, ["Disney+"]);
        assert!(ledger.accounts.iter().all(|a| a.last_updated == now()));
    }
}
