use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Category list seeded into a fresh expense blob.
pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Travel",
    "Education",
    "Groceries",
    "Gas",
    "Insurance",
    "Other",
];

/// Category assigned by the cleanup pass to expenses referencing an unknown one.
pub const FALLBACK_CATEGORY: &str = "Other";

/// A single logged expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: u64,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
}

/// Caller-supplied fields for adding or replacing an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
}

impl ExpenseInput {
    pub fn into_expense(self, id: u64) -> Expense {
        Expense {
            id,
            amount: self.amount,
            description: self.description,
            category: self.category,
            date: self.date,
        }
    }
}

/// Root record persisted under the expense storage key.
///
/// Expenses are partitioned into month buckets keyed by [`month_key`]; the
/// map is ordered so key iteration is chronological.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseData {
    #[serde(default)]
    pub expenses: BTreeMap<String, Vec<Expense>>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub last_expense_id: u64,
}

impl Default for ExpenseData {
    fn default() -> Self {
        Self {
            expenses: BTreeMap::new(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            last_expense_id: 0,
        }
    }
}

/// Month bucket key in zero-padded `YYYY-MM` form.
///
/// Lexicographic order on keys matches chronological order, which the recent
/// months listing relies on.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// The bucket key for the month containing `date`.
pub fn month_key_for(date: NaiveDate) -> String {
    month_key(date.year(), date.month())
}

pub(crate) fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.split_once('-')?;
    Some((year.parse().ok()?, month.parse().ok()?))
}

/// Count and summed amount for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub count: usize,
    pub amount: f64,
}

/// Aggregated figures for a single month bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_amount: f64,
    pub total_transactions: usize,
    pub unique_categories: usize,
    pub category_breakdown: BTreeMap<String, CategoryTotals>,
    pub expenses: Vec<Expense>,
}

impl MonthlyStats {
    /// Aggregates a month bucket; the expense list is carried through as-is.
    pub fn from_expenses(expenses: Vec<Expense>) -> Self {
        let total_amount = expenses.iter().map(|e| e.amount).sum();
        let mut category_breakdown: BTreeMap<String, CategoryTotals> = BTreeMap::new();
        for expense in &expenses {
            let entry = category_breakdown
                .entry(expense.category.clone())
                .or_default();
            entry.count += 1;
            entry.amount += expense.amount;
        }
        Self {
            total_amount,
            total_transactions: expenses.len(),
            unique_categories: category_breakdown.len(),
            category_breakdown,
            expenses,
        }
    }
}

/// Per-category totals across every month, for the reports page.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: usize,
    pub amount: f64,
}

/// A non-empty month bucket together with its aggregated stats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub month_key: String,
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub stats: MonthlyStats,
}

/// Read-only summary of category references that fell out of the valid list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidCategoriesReport {
    pub invalid_categories: Vec<String>,
    pub total_invalid_expenses: usize,
    pub valid_categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(id: u64, amount: f64, category: &str, date: &str) -> Expense {
        Expense {
            id,
            amount,
            description: format!("expense {id}"),
            category: category.into(),
            date: date.parse().unwrap(),
        }
    }

    #[test]
    fn month_key_zero_pads() {
        assert_eq!(month_key(2024, 3), "2024-03");
        assert_eq!(month_key(2024, 12), "2024-12");
    }

    #[test]
    fn month_keys_sort_chronologically() {
        let mut keys = vec![month_key(2024, 10), month_key(2023, 12), month_key(2024, 2)];
        keys.sort();
        assert_eq!(keys, vec!["2023-12", "2024-02", "2024-10"]);
    }

    #[test]
    fn parse_month_key_roundtrips() {
        assert_eq!(parse_month_key("2024-03"), Some((2024, 3)));
        assert_eq!(parse_month_key("garbage"), None);
    }

    #[test]
    fn stats_aggregate_per_category() {
        let stats = MonthlyStats::from_expenses(vec![
            expense(1, 50.0, "Groceries", "2024-03-15"),
            expense(2, 25.0, "Groceries", "2024-03-16"),
            expense(3, 10.0, "Gas", "2024-03-17"),
        ]);
        assert_eq!(stats.total_amount, 85.0);
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.unique_categories, 2);
        assert_eq!(stats.category_breakdown["Groceries"].count, 2);
        assert_eq!(stats.category_breakdown["Groceries"].amount, 75.0);
    }

    #[test]
    fn root_blob_keeps_camel_case_keys() {
        let json = serde_json::to_string(&ExpenseData::default()).unwrap();
        assert!(json.contains("\"lastExpenseId\""));
        assert!(json.contains("\"categories\""));
    }
}
