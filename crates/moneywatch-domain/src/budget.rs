use std::fmt;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    common::*,
    window::{week_window, DateWindow, YearMonth},
};

pub const DEFAULT_BUDGET_COLOR: &str = "#3B82F6";

/// A spending limit for one category over a recurring period.
///
/// Only user-authored fields live here. The amount spent is always derived from
/// the transaction set and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: EntityId,
    pub category: String,
    pub limit: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
    #[serde(default = "Budget::default_color")]
    pub color: String,
}

impl Budget {
    pub fn new(category: impl Into<String>, limit: Decimal, period: BudgetPeriod) -> Self {
        Self {
            id: EntityId::generate(),
            category: category.into(),
            limit,
            period,
            color: Self::default_color(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn default_color() -> String {
        DEFAULT_BUDGET_COLOR.into()
    }

    /// The instance of this budget's period that contains `today`.
    pub fn current_window(&self, today: NaiveDate, week_start: Weekday) -> DateWindow {
        self.period.window_containing(today, week_start)
    }
}

impl Identifiable for Budget {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl BelongsToCategory for Budget {
    fn category(&self) -> &str {
        &self.category
    }
}

impl Displayable for Budget {
    fn display_label(&self) -> String {
        format!("{} ({} {})", self.category, self.limit, self.period)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
/// Budgeting cadences.
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Weekly,
}

impl BudgetPeriod {
    pub fn window_containing(self, date: NaiveDate, week_start: Weekday) -> DateWindow {
        match self {
            BudgetPeriod::Monthly => YearMonth::from_date(date).window(),
            BudgetPeriod::Weekly => week_window(date, week_start),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Weekly => "weekly",
        };
        f.write_str(label)
    }
}
