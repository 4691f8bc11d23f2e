use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::merge;

/// Palette used when a budget is created without an explicit color.
pub const DEFAULT_COLORS: [&str; 12] = [
    "#22c55e", "#06b6d4", "#f59e0b", "#8b5cf6", "#ef4444", "#f97316", "#eab308", "#ec4899",
    "#14b8a6", "#84cc16", "#6366f1", "#d946ef",
];

/// Categories offered for budget goals.
pub const BUDGET_CATEGORIES: [&str; 12] = [
    "Emergency Fund",
    "Travel",
    "Education",
    "Electronics",
    "Home & Garden",
    "Health",
    "Investment",
    "Vehicle",
    "Entertainment",
    "Shopping",
    "General",
    "Other",
];

/// Priority levels offered for budget goals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// A savings goal with a target amount and running progress.
///
/// Invariants: `0 <= saved <= goal` and `is_achieved` iff `saved >= goal`,
/// re-established by [`Budget::reconcile_achievement`] after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal: f64,
    #[serde(default)]
    pub saved: f64,
    pub color: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_achieved: bool,
    #[serde(default)]
    pub achieved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Clamps `saved` to `goal` and synchronizes the achievement flag.
    ///
    /// The timestamp is stamped at the transition to achieved and cleared if
    /// `saved` later drops below `goal`. Excess contributions are discarded
    /// by the clamp, never tracked.
    pub fn reconcile_achievement(&mut self) {
        if self.saved > self.goal {
            self.saved = self.goal;
        }
        if self.saved >= self.goal && !self.is_achieved {
            self.is_achieved = true;
            self.achieved_at = Some(Utc::now());
        } else if self.saved < self.goal && self.is_achieved {
            self.is_achieved = false;
            self.achieved_at = None;
        }
    }

    /// Merges a patch, keeping existing values wherever the patch is silent.
    ///
    /// Blank name/description/color/category values count as absent so a
    /// cleared form field never wipes stored text.
    pub fn apply_patch(&mut self, patch: BudgetPatch) {
        merge(
            &mut self.name,
            non_blank(patch.name.map(|v| v.trim().to_string())),
        );
        merge(
            &mut self.description,
            non_blank(patch.description.map(|v| v.trim().to_string())),
        );
        merge(&mut self.goal, patch.goal);
        merge(&mut self.saved, patch.saved);
        merge(&mut self.color, non_blank(patch.color));
        merge(&mut self.category, non_blank(patch.category));
        merge(&mut self.priority, patch.priority);
        merge(&mut self.target_date, patch.target_date);
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Caller-supplied fields for creating a budget goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal: f64,
    #[serde(default)]
    pub saved: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

/// Partial update for a budget goal; `None` fields keep the existing value.
#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub goal: Option<f64>,
    pub saved: Option<f64>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the target date; `None` keeps it.
    pub target_date: Option<Option<NaiveDate>>,
}

/// Root record persisted under the budget storage key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetData {
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub last_budget_id: u64,
}

/// Aggregate progress figures across every goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStats {
    pub total_budgets: usize,
    pub active_budgets: usize,
    pub achieved_budgets: usize,
    pub total_goals: f64,
    pub total_saved: f64,
    pub total_remaining: f64,
    pub average_progress: f64,
}
