use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{common::*, serde_date};

/// Represents a financial account tracked within the ledger.
///
/// `balance` is a user-entered figure. It is never derived from, or reconciled
/// against, the transactions that reference the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: Decimal,
    pub currency: String,
    #[serde(default)]
    pub institution: String,
    #[serde(with = "serde_date::timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Account {
    /// Creates a new zero-balance USD account of the provided kind.
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            kind,
            balance: Decimal::ZERO,
            currency: "USD".into(),
            institution: String::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self
    }

    /// Liability accounts carry their balance as a negative figure.
    pub fn is_liability(&self) -> bool {
        matches!(self.kind, AccountKind::CreditCard)
    }
}

impl Identifiable for Account {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        if self.institution.is_empty() {
            format!("{} ({})", self.name, self.kind)
        } else {
            format!("{} ({}, {})", self.name, self.kind, self.institution)
        }
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Investment,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::CreditCard => "Credit Card",
            AccountKind::Investment => "Investment",
        };
        f.write_str(label)
    }
}
