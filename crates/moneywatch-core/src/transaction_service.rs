//! Read-side transaction queries: filtering, display ordering, totals.

use moneywatch_domain::{DateWindow, IncomeExpense, Ledger, Transaction};

use crate::SummaryService;

/// Search-box and category-dropdown state of a transaction list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Case-insensitive substring matched against description and category.
    pub search: Option<String>,
    /// Exact category; `None` means all categories.
    pub category: Option<String>,
}

impl TransactionFilter {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let needle = term.to_lowercase();
                txn.description.to_lowercase().contains(&needle)
                    || txn.category.to_lowercase().contains(&needle)
            }
        };
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |category| txn.category == category);
        search_ok && category_ok
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Transactions matching `filter`, in ledger order.
    pub fn filter<'a>(ledger: &'a Ledger, filter: &TransactionFilter) -> Vec<&'a Transaction> {
        ledger
            .transactions
            .iter()
            .filter(|txn| filter.matches(txn))
            .collect()
    }

    /// Newest date first; equal dates keep ledger order.
    pub fn display_order<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Vec<&'a Transaction> {
        let mut ordered: Vec<_> = transactions.into_iter().collect();
        ordered.sort_by(|a, b| b.date.cmp(&a.date));
        ordered
    }

    pub fn in_window(ledger: &Ledger, window: DateWindow) -> Vec<&Transaction> {
        SummaryService::in_window(ledger, window).collect()
    }

    pub fn totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> IncomeExpense {
        SummaryService::totals(transactions)
    }

    /// The `count` most recent transactions in display order.
    pub fn recent(ledger: &Ledger, count: usize) -> Vec<&Transaction> {
        let mut ordered = Self::display_order(&ledger.transactions);
        ordered.truncate(count);
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.transactions = vec![
            Transaction::expense("checking", Decimal::from(4), "Food & Dining", date(2))
                .with_description("Blue Bottle Coffee"),
            Transaction::expense("checking", Decimal::from(60), "Transportation", date(9))
                .with_description("Shell"),
            Transaction::income("checking", Decimal::from(3000), "Income", date(7))
                .with_description("Salary"),
            Transaction::expense("checking", Decimal::from(12), "Food & Dining", date(9))
                .with_description("Lunch"),
        ];
        ledger
    }

    #[test]
    fn search_is_case_insensitive_over_description_and_category() {
        let ledger = ledger();
        let by_description = TransactionFilter::default().search("COFFEE");
        assert_eq!(TransactionService::filter(&ledger, &by_description).len(), 1);
        let by_category = TransactionFilter::default().search("dining");
        assert_eq!(TransactionService::filter(&ledger, &by_category).len(), 2);
        let blank = TransactionFilter::default().search("  ");
        assert_eq!(TransactionService::filter(&ledger, &blank).len(), 4);
    }

    #[test]
    fn category_filter_combines_with_search() {
        let ledger = ledger();
        let filter = TransactionFilter::default()
            .category("Food & Dining")
            .search("lunch");
        let found = TransactionService::filter(&ledger, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Lunch");
    }

    #[test]
    fn display_order_is_date_descending_with_stable_ties() {
        let ledger = ledger();
        let ordered = TransactionService::display_order(&ledger.transactions);
        let labels: Vec<_> = ordered.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(labels, ["Shell", "Lunch", "Salary", "Blue Bottle Coffee"]);
        assert_eq!(TransactionService::recent(&ledger, 1)[0].description, "Shell");
    }

    #[test]
    fn totals_split_income_and_expense() {
        let ledger = ledger();
        let totals = TransactionService::totals(&ledger.transactions);
        assert_eq!(totals.income, Decimal::from(3000));
        assert_eq!(totals.expenses, Decimal::from(76));
        assert_eq!(totals.net(), Decimal::from(2924));
    }
}
