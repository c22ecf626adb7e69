//! Subscription cost normalisation and billing look-ahead.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use moneywatch_domain::{Ledger, Subscription, SubscriptionStatus, UpcomingBill};

/// Default look-ahead for [`SubscriptionService::upcoming_bills`].
pub const DEFAULT_UPCOMING_HORIZON_DAYS: u32 = 30;

pub struct SubscriptionService;

impl SubscriptionService {
    pub fn monthly_equivalent(subscription: &Subscription) -> Decimal {
        subscription.monthly_equivalent()
    }

    /// Monthly-equivalent cost summed over active subscriptions only.
    pub fn total_monthly_cost(ledger: &Ledger) -> Decimal {
        Self::active(ledger)
            .map(Subscription::monthly_equivalent)
            .sum()
    }

    pub fn yearly_cost(ledger: &Ledger) -> Decimal {
        Self::total_monthly_cost(ledger) * Decimal::from(12)
    }

    pub fn active(ledger: &Ledger) -> impl Iterator<Item = &Subscription> {
        ledger.subscriptions.iter().filter(|sub| sub.is_active())
    }

    /// `None` selects every subscription.
    pub fn filter_by_status(
        ledger: &Ledger,
        status: Option<SubscriptionStatus>,
    ) -> Vec<&Subscription> {
        ledger
            .subscriptions
            .iter()
            .filter(|sub| status.map_or(true, |wanted| sub.status == wanted))
            .collect()
    }

    /// Signed number of days from `today` to the next billing date.
    pub fn days_until_billing(subscription: &Subscription, today: NaiveDate) -> i64 {
        (subscription.next_billing - today).num_days()
    }

    /// Active subscriptions billing in `[from, from + horizon_days]`, soonest first.
    pub fn upcoming_bills(
        ledger: &Ledger,
        from: NaiveDate,
        horizon_days: u32,
    ) -> Vec<UpcomingBill> {
        let until = from + Duration::days(i64::from(horizon_days));
        let mut due: Vec<&Subscription> = Self::active(ledger)
            .filter(|sub| sub.next_billing >= from && sub.next_billing <= until)
            .collect();
        due.sort_by_key(|sub| sub.next_billing);
        due.into_iter()
            .map(|sub| UpcomingBill {
                subscription_id: sub.id.clone(),
                name: sub.name.clone(),
                amount: sub.amount,
                next_billing: sub.next_billing,
                days_until: Self::days_until_billing(sub, from),
                monthly_equivalent: sub.monthly_equivalent(),
            })
            .collect()
    }
}
