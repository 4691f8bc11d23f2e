//! Persistence and business rules for budget savings goals.

use chrono::Utc;
use rand::seq::SliceRandom;

use crate::domain::budget::{
    Budget, BudgetData, BudgetInput, BudgetPatch, BudgetStats, Priority, BUDGET_CATEGORIES,
    DEFAULT_COLORS,
};
use crate::errors::{Result, TrackerError};
use crate::storage::KeyValueBackend;

/// Key the budget root blob is stored under.
pub const BUDGET_STORAGE_KEY: &str = "expenseTracker_budgets";

const DEFAULT_CATEGORY: &str = "General";

/// Blob-backed store for budget goals and their aggregate statistics.
pub struct BudgetStore {
    backend: Box<dyn KeyValueBackend>,
}

impl BudgetStore {
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
        if self.backend.read(BUDGET_STORAGE_KEY)?.is_none() {
            self.save(&BudgetData::default())?;
        }
        Ok(())
    }

    fn load(&self) -> Result<BudgetData> {
        match self.backend.read(BUDGET_STORAGE_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(data) => Ok(data),
                Err(err) => {
                    tracing::warn!("discarding corrupt budget blob: {err}");
                    let data = BudgetData::default();
                    self.save(&data)?;
                    Ok(data)
                }
            },
            None => {
                let data = BudgetData::default();
                self.save(&data)?;
                Ok(data)
            }
        }
    }

    fn save(&self, data: &BudgetData) -> Result<()> {
        let json = serde_json::to_string(data)?;
        self.backend.write(BUDGET_STORAGE_KEY, &json)
    }

    /// Every goal: unachieved first, newest created first within each group.
    pub fn all_budgets(&self) -> Result<Vec<Budget>> {
        let mut budgets = self.load()?.budgets;
        budgets.sort_by(|a, b| {
            let a_achieved = a.saved >= a.goal;
            let b_achieved = b.saved >= b.goal;
            a_achieved
                .cmp(&b_achieved)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(budgets)
    }

    /// Goals still being saved toward.
    pub fn active_budgets(&self) -> Result<Vec<Budget>> {
        let budgets = self.load()?.budgets;
        Ok(budgets.into_iter().filter(|b| b.saved < b.goal).collect())
    }

    /// Goals whose target has been reached.
    pub fn achieved_budgets(&self) -> Result<Vec<Budget>> {
        let budgets = self.load()?.budgets;
        Ok(budgets.into_iter().filter(|b| b.saved >= b.goal).collect())
    }

    /// Validates and persists a new goal, returning it with its assigned id.
    ///
    /// A starting `saved` beyond `goal` is clamped and the goal is marked
    /// achieved immediately. Missing color/category/priority get defaults,
    /// the color drawn uniformly from the fixed palette.
    pub fn add_budget(&self, input: BudgetInput) -> Result<Budget> {
        let name = input.name.trim().to_string();
        if name.is_empty() || !(input.goal > 0.0) || !input.goal.is_finite() {
            return Err(TrackerError::Validation(
                "Budget name and goal amount are required".into(),
            ));
        }

        let mut data = self.load()?;
        data.last_budget_id += 1;
        let now = Utc::now();
        let mut budget = Budget {
            id: data.last_budget_id,
            name,
            description: input.description.trim().to_string(),
            goal: input.goal,
            saved: input.saved.max(0.0),
            color: input
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(random_color),
            category: input
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            priority: input.priority.unwrap_or_default(),
            target_date: input.target_date,
            is_achieved: false,
            achieved_at: None,
            created_at: now,
            updated_at: now,
        };
        budget.reconcile_achievement();

        data.budgets.push(budget.clone());
        self.save(&data)?;
        Ok(budget)
    }

    /// Merges `patch` over the goal with `id` and re-evaluates achievement.
    pub fn update_budget(&self, id: u64, patch: BudgetPatch) -> Result<Budget> {
        let mut data = self.load()?;
        let budget = data
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| TrackerError::NotFound("Budget not found".into()))?;
        budget.apply_patch(patch);
        budget.updated_at = Utc::now();
        budget.reconcile_achievement();
        let updated = budget.clone();
        self.save(&data)?;
        Ok(updated)
    }

    /// Removes the goal with `id`.
    pub fn delete_budget(&self, id: u64) -> Result<()> {
        let mut data = self.load()?;
        let before = data.budgets.len();
        data.budgets.retain(|b| b.id != id);
        if data.budgets.len() == before {
            return Err(TrackerError::NotFound("Budget not found".into()));
        }
        self.save(&data)?;
        Ok(())
    }

    /// Adds a contribution to a goal, clamped so `saved` never exceeds `goal`.
    ///
    /// The excess of an overshooting contribution is discarded, not tracked.
    /// This is the only additive mutation in the store.
    pub fn add_money(&self, id: u64, amount: f64) -> Result<Budget> {
        let mut data = self.load()?;
        let budget = data
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| TrackerError::NotFound("Budget not found".into()))?;
        if !(amount > 0.0) {
            return Err(TrackerError::Validation(
                "Amount must be greater than zero".into(),
            ));
        }
        budget.saved = (budget.saved + amount).min(budget.goal);
        budget.updated_at = Utc::now();
        budget.reconcile_achievement();
        let updated = budget.clone();
        self.save(&data)?;
        Ok(updated)
    }

    /// Aggregate progress figures across every goal.
    pub fn budget_stats(&self) -> Result<BudgetStats> {
        let budgets = self.load()?.budgets;
        let total_goals: f64 = budgets.iter().map(|b| b.goal).sum();
        let total_saved: f64 = budgets.iter().map(|b| b.saved).sum();
        let active = budgets.iter().filter(|b| b.saved < b.goal).count();
        let achieved = budgets.iter().filter(|b| b.saved >= b.goal).count();
        Ok(BudgetStats {
            total_budgets: budgets.len(),
            active_budgets: active,
            achieved_budgets: achieved,
            total_goals,
            total_saved,
            total_remaining: total_goals - total_saved,
            average_progress: if budgets.is_empty() {
                0.0
            } else {
                total_saved / total_goals * 100.0
            },
        })
    }

    /// Categories offered for budget goals.
    pub fn categories(&self) -> Vec<String> {
        BUDGET_CATEGORIES.iter().map(|c| c.to_string()).collect()
    }

    /// Priority levels offered for budget goals.
    pub fn priorities(&self) -> Vec<Priority> {
        vec![Priority::High, Priority::Medium, Priority::Low]
    }

    /// Resets the blob to the freshly initialized empty state.
    pub fn clear_all(&self) -> Result<()> {
        self.backend.remove(BUDGET_STORAGE_KEY)?;
        self.initialize()
    }
}

fn random_color() -> String {
    let mut rng = rand::thread_rng();
    DEFAULT_COLORS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DEFAULT_COLORS[0])
        .to_string()
}
