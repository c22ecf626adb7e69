use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{common::*, serde_date};

/// A single dated money movement.
///
/// Positive amounts are income, negative amounts are expenses, and `kind` always
/// agrees with that sign. `account_id` may reference an account that no longer
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: EntityId,
    pub account_id: EntityId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(with = "serde_date::date")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring: bool,
}

impl Transaction {
    /// Creates a transaction whose amount sign is taken from `kind`.
    pub fn new(
        account_id: impl Into<EntityId>,
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            account_id: account_id.into(),
            amount: kind.signed(amount),
            description: String::new(),
            category: category.into(),
            date,
            kind,
            merchant: None,
            is_recurring: false,
        }
    }

    pub fn income(
        account_id: impl Into<EntityId>,
        amount: Decimal,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(account_id, TransactionKind::Income, amount, category, date)
    }

    pub fn expense(
        account_id: impl Into<EntityId>,
        amount: Decimal,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(account_id, TransactionKind::Expense, amount, category, date)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// True when `kind` agrees with the sign of `amount`.
    pub fn is_sign_consistent(&self) -> bool {
        self.is_income() == (self.kind == TransactionKind::Income)
    }

    /// Re-derives `kind` from the sign of `amount`.
    pub fn align_kind_to_amount(&mut self) {
        self.kind = TransactionKind::from_amount(self.amount);
    }

    /// Re-signs `amount` to match `kind`.
    pub fn align_amount_to_kind(&mut self) {
        self.amount = self.kind.signed(self.amount);
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl BelongsToCategory for Transaction {
    fn category(&self) -> &str {
        &self.category
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        let label = if self.description.is_empty() {
            &self.category
        } else {
            &self.description
        };
        format!("{} {} {}", self.date, label, self.amount)
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Zero and negative amounts are expenses.
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    }

    /// Applies this kind's sign to the magnitude of `amount`.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount.abs(),
            TransactionKind::Expense => -amount.abs(),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        f.write_str(label)
    }
}
