//! Persistence and business rules for logged expenses.
//!
//! Every operation is a full read-modify-write of the blob under
//! [`EXPENSE_STORAGE_KEY`]; there is no partial update. Buckets are re-sorted
//! date-descending after each mutating call, which is O(n log n) per bucket
//! write and fine at personal-expense volumes.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::expense::{
    month_key, month_key_for, parse_month_key, CategoryStat, CategoryTotals, Expense, ExpenseData,
    ExpenseInput, InvalidCategoriesReport, MonthSummary, MonthlyStats, FALLBACK_CATEGORY,
};
use crate::errors::{Result, TrackerError};
use crate::storage::KeyValueBackend;

/// Key the expense root blob is stored under.
pub const EXPENSE_STORAGE_KEY: &str = "expenseTracker_data";

/// Blob-backed store for expenses, their category list, and derived stats.
pub struct ExpenseStore {
    backend: Box<dyn KeyValueBackend>,
}

impl ExpenseStore {
    /// Opens the store and seeds the default blob when none exists.
    pub fn open(backend: Box<dyn KeyValueBackend>) -> Result<Self> {
        let store = Self { backend };
        store.initialize()?;
        Ok(store)
    }

    /// Seeds the default root record if the blob is missing.
    ///
    /// Idempotent; safe to call on every construction.
    pub fn initialize(&self) -> Result<()> {
        if self.backend.read(EXPENSE_STORAGE_KEY)?.is_none() {
            self.save(&ExpenseData::default())?;
        }
        Ok(())
    }

    fn load(&self) -> Result<ExpenseData> {
        match self.backend.read(EXPENSE_STORAGE_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(data) => Ok(data),
                Err(err) => {
                    tracing::warn!("discarding corrupt expense blob: {err}");
                    let data = ExpenseData::default();
                    self.save(&data)?;
                    Ok(data)
                }
            },
            None => {
                let data = ExpenseData::default();
                self.save(&data)?;
                Ok(data)
            }
        }
    }

    fn save(&self, data: &ExpenseData) -> Result<()> {
        let json = serde_json::to_string(data)?;
        self.backend.write(EXPENSE_STORAGE_KEY, &json)
    }

    /// Expenses recorded in the given month, in stored (newest-first) order.
    pub fn expenses_by_month(&self, year: i32, month: u32) -> Result<Vec<Expense>> {
        let data = self.load()?;
        Ok(data
            .expenses
            .get(&month_key(year, month))
            .cloned()
            .unwrap_or_default())
    }

    /// Every expense across all months, newest first.
    ///
    /// The sort is stable, so same-day expenses keep their stored order.
    pub fn all_expenses(&self) -> Result<Vec<Expense>> {
        let data = self.load()?;
        let mut all: Vec<Expense> = data.expenses.into_values().flatten().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }

    /// Validates and persists a new expense, returning it with its assigned id.
    ///
    /// Ids come from a counter in the blob and are never reused, even after
    /// deletes.
    pub fn add_expense(&self, input: ExpenseInput) -> Result<Expense> {
        let mut data = self.load()?;
        ensure_valid_category(&data, &input.category)?;

        data.last_expense_id += 1;
        let expense = input.into_expense(data.last_expense_id);
        let bucket = data
            .expenses
            .entry(month_key_for(expense.date))
            .or_default();
        bucket.push(expense.clone());
        bucket.sort_by(|a, b| b.date.cmp(&a.date));

        self.save(&data)?;
        Ok(expense)
    }

    /// Replaces the expense with `id`, moving it between month buckets when
    /// the date changes. Returns whether a matching expense existed.
    pub fn update_expense(&self, id: u64, input: ExpenseInput) -> Result<bool> {
        let mut data = self.load()?;
        ensure_valid_category(&data, &input.category)?;

        let Some(old_key) = bucket_containing(&data, id) else {
            return Ok(false);
        };
        if let Some(bucket) = data.expenses.get_mut(&old_key) {
            bucket.retain(|expense| expense.id != id);
        }
        let updated = input.into_expense(id);
        let bucket = data
            .expenses
            .entry(month_key_for(updated.date))
            .or_default();
        bucket.push(updated);
        bucket.sort_by(|a, b| b.date.cmp(&a.date));

        self.save(&data)?;
        Ok(true)
    }

    /// Deletes the expense with `id`, reporting whether a removal occurred.
    pub fn delete_expense(&self, id: u64) -> Result<bool> {
        let mut data = self.load()?;
        let Some(key) = bucket_containing(&data, id) else {
            return Ok(false);
        };
        if let Some(bucket) = data.expenses.get_mut(&key) {
            bucket.retain(|expense| expense.id != id);
        }
        self.save(&data)?;
        Ok(true)
    }

    /// Aggregated figures for one month.
    pub fn monthly_stats(&self, year: i32, month: u32) -> Result<MonthlyStats> {
        let data = self.load()?;
        Ok(stats_for(&data, year, month))
    }

    /// Stats for all twelve months of `year`, keyed by month number.
    ///
    /// Months without data get zeroed stats, so the map always has 12 entries.
    pub fn yearly_stats(&self, year: i32) -> Result<BTreeMap<u32, MonthlyStats>> {
        let data = self.load()?;
        Ok((1..=12)
            .map(|month| (month, stats_for(&data, year, month)))
            .collect())
    }

    /// The most recent `limit` months containing at least one expense, newest
    /// first, each with its aggregated stats.
    pub fn recent_months_with_data(&self, limit: usize) -> Result<Vec<MonthSummary>> {
        let data = self.load()?;
        let mut summaries = Vec::new();
        for (key, bucket) in data.expenses.iter().rev() {
            if summaries.len() == limit {
                break;
            }
            if bucket.is_empty() {
                continue;
            }
            let Some((year, month)) = parse_month_key(key) else {
                continue;
            };
            summaries.push(MonthSummary {
                month_key: key.clone(),
                year,
                month,
                stats: MonthlyStats::from_expenses(bucket.clone()),
            });
        }
        Ok(summaries)
    }

    /// Count and total per category across every month, largest total first.
    pub fn category_stats(&self) -> Result<Vec<CategoryStat>> {
        let all = self.all_expenses()?;
        let mut totals: BTreeMap<String, CategoryTotals> = BTreeMap::new();
        for expense in &all {
            let entry = totals.entry(expense.category.clone()).or_default();
            entry.count += 1;
            entry.amount += expense.amount;
        }
        let mut stats: Vec<CategoryStat> = totals
            .into_iter()
            .map(|(category, totals)| CategoryStat {
                category,
                count: totals.count,
                amount: totals.amount,
            })
            .collect();
        stats.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        Ok(stats)
    }

    /// The category list seeded at initialization.
    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(self.load()?.categories)
    }

    /// Whether `category` belongs to the current category list.
    pub fn is_valid_category(&self, category: &str) -> Result<bool> {
        Ok(self.load()?.categories.iter().any(|c| c == category))
    }

    /// Rewrites expenses referencing unknown categories to the fallback one.
    ///
    /// Persists only when something changed and returns whether it did; a
    /// second pass right after a first is always a no-op.
    pub fn cleanup_invalid_categories(&self) -> Result<bool> {
        let mut data = self.load()?;
        let valid = data.categories.clone();
        let mut changed = false;
        for bucket in data.expenses.values_mut() {
            for expense in bucket.iter_mut() {
                if !valid.iter().any(|c| c == &expense.category) {
                    tracing::warn!(
                        expense_id = expense.id,
                        category = %expense.category,
                        "rewriting invalid category to {FALLBACK_CATEGORY:?}"
                    );
                    expense.category = FALLBACK_CATEGORY.to_string();
                    changed = true;
                }
            }
        }
        if changed {
            self.save(&data)?;
            tracing::info!("invalid categories cleaned up");
        }
        Ok(changed)
    }

    /// Read-only report of invalid category references.
    pub fn invalid_categories_report(&self) -> Result<InvalidCategoriesReport> {
        let data = self.load()?;
        let mut invalid = BTreeSet::new();
        let mut total = 0;
        for bucket in data.expenses.values() {
            for expense in bucket {
                if !data.categories.iter().any(|c| c == &expense.category) {
                    invalid.insert(expense.category.clone());
                    total += 1;
                }
            }
        }
        Ok(InvalidCategoriesReport {
            invalid_categories: invalid.into_iter().collect(),
            total_invalid_expenses: total,
            valid_categories: data.categories,
        })
    }

    /// Resets the blob to the freshly initialized empty state.
    pub fn clear_all(&self) -> Result<()> {
        self.backend.remove(EXPENSE_STORAGE_KEY)?;
        self.initialize()
    }
}

fn stats_for(data: &ExpenseData, year: i32, month: u32) -> MonthlyStats {
    let expenses = data
        .expenses
        .get(&month_key(year, month))
        .cloned()
        .unwrap_or_default();
    MonthlyStats::from_expenses(expenses)
}

fn ensure_valid_category(data: &ExpenseData, category: &str) -> Result<()> {
    if data.categories.iter().any(|c| c == category) {
        Ok(())
    } else {
        Err(TrackerError::Validation(format!(
            "Invalid category \"{category}\". Please select a valid category."
        )))
    }
}

fn bucket_containing(data: &ExpenseData, id: u64) -> Option<String> {
    data.expenses
        .iter()
        .find(|(_, bucket)| bucket.iter().any(|expense| expense.id == id))
        .map(|(key, _)| key.clone())
}
