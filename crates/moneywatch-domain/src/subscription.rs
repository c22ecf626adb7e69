use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{common::*, serde_date};

/// A recurring charge tracked for cost normalisation and billing reminders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: EntityId,
    pub name: String,
    pub amount: Decimal,
    pub frequency: BillingFrequency,
    #[serde(with = "serde_date::date")]
    pub next_billing: NaiveDate,
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub category: String,
    #[serde(default)]
    pub icon: String,
}

impl Subscription {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        frequency: BillingFrequency,
        next_billing: NaiveDate,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            amount,
            frequency,
            next_billing,
            status: SubscriptionStatus::Active,
            category: "Other".into(),
            icon: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Billing amount normalised to a per-month figure.
    pub fn monthly_equivalent(&self) -> Decimal {
        self.frequency.monthly_equivalent(self.amount)
    }
}

impl Identifiable for Subscription {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl NamedEntity for Subscription {
    fn name(&self) -> &str {
        &self.name
    }
}

impl BelongsToCategory for Subscription {
    fn category(&self) -> &str {
        &self.category
    }
}

impl Displayable for Subscription {
    fn display_label(&self) -> String {
        format!("{} {}/{}", self.name, self.amount, self.frequency.unit_label())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BillingFrequency {
    Weekly,
    Monthly,
    Yearly,
}

impl BillingFrequency {
    /// Average weeks per month used for weekly normalisation.
    pub fn weeks_per_month() -> Decimal {
        Decimal::new(433, 2)
    }

    pub fn monthly_equivalent(self, amount: Decimal) -> Decimal {
        match self {
            BillingFrequency::Weekly => amount * Self::weeks_per_month(),
            BillingFrequency::Monthly => amount,
            BillingFrequency::Yearly => amount / Decimal::from(12),
        }
    }

    pub fn unit_label(self) -> &'static str {
        match self {
            BillingFrequency::Weekly => "week",
            BillingFrequency::Monthly => "month",
            BillingFrequency::Yearly => "year",
        }
    }
}

impl fmt::Display for BillingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillingFrequency::Weekly => "weekly",
            BillingFrequency::Monthly => "monthly",
            BillingFrequency::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

/// Lifecycle state of a subscription.
///
/// Transitions are caller-driven and unrestricted: any status may move to any
/// other, including reactivating a cancelled subscription.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Paused,
    Cancelled,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}
